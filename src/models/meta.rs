// src/models/meta.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::proposta::nao_negativo;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "meta_tipo", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TipoMeta {
    #[default]
    Mensal,
    Trimestral,
    Anual,
}

/// Meta de valor e/ou quantidade para um período.
/// Sem consultor = meta global.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetaProposta {
    pub id: Uuid,
    #[schema(example = "2026-02")]
    pub periodo: String,
    pub tipo: TipoMeta,
    #[schema(example = "50000.00")]
    pub meta_valor: Option<Decimal>,
    #[schema(example = 20)]
    pub meta_quantidade: Option<i32>,
    pub consultor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NovaMeta {
    #[validate(length(min = 1, message = "Período é obrigatório"))]
    pub periodo: String,
    #[serde(default)]
    pub tipo: TipoMeta,
    #[validate(custom(function = "nao_negativo"))]
    pub meta_valor: Option<Decimal>,
    #[validate(range(min = 0, message = "A quantidade não pode ser negativa"))]
    pub meta_quantidade: Option<i32>,
    pub consultor_id: Option<Uuid>,
}

impl NovaMeta {
    pub fn normalizar(self) -> Self {
        Self {
            periodo: self.periodo.trim().to_string(),
            ..self
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AtualizarMeta {
    #[validate(length(min = 1, message = "Período é obrigatório"))]
    pub periodo: Option<String>,
    pub tipo: Option<TipoMeta>,
    #[validate(custom(function = "nao_negativo"))]
    pub meta_valor: Option<Decimal>,
    #[validate(range(min = 0, message = "A quantidade não pode ser negativa"))]
    pub meta_quantidade: Option<i32>,
    pub consultor_id: Option<Uuid>,
}

impl AtualizarMeta {
    pub fn normalizar(self) -> Self {
        Self {
            periodo: self.periodo.map(|s| s.trim().to_string()),
            ..self
        }
    }

    pub fn aplicar_em(self, m: &mut MetaProposta) {
        if let Some(v) = self.periodo {
            m.periodo = v;
        }
        if let Some(v) = self.tipo {
            m.tipo = v;
        }
        if self.meta_valor.is_some() {
            m.meta_valor = self.meta_valor;
        }
        if self.meta_quantidade.is_some() {
            m.meta_quantidade = self.meta_quantidade;
        }
        if self.consultor_id.is_some() {
            m.consultor_id = self.consultor_id;
        }
    }
}
