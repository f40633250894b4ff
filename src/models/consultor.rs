// src/models/consultor.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{common::db_utils::blank_to_none, models::proposta::email_ou_vazio};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Consultor {
    pub id: Uuid,
    #[schema(example = "Maria Souza")]
    pub nome: String,
    // Código externo do consultor (único)
    #[schema(example = "CONS-007")]
    pub id_consultor: String,
    pub email: Option<String>,
    pub whatsapp: Option<String>,
    pub ativo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn ativo_padrao() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NovoConsultor {
    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    pub nome: String,

    #[validate(length(min = 1, message = "ID do consultor é obrigatório"))]
    pub id_consultor: String,

    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    pub whatsapp: Option<String>,

    #[serde(default = "ativo_padrao")]
    pub ativo: bool,
}

impl NovoConsultor {
    pub fn normalizar(self) -> Self {
        Self {
            nome: self.nome.trim().to_string(),
            id_consultor: self.id_consultor.trim().to_string(),
            email: blank_to_none(self.email),
            whatsapp: blank_to_none(self.whatsapp),
            ..self
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AtualizarConsultor {
    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    pub nome: Option<String>,
    #[validate(length(min = 1, message = "ID do consultor é obrigatório"))]
    pub id_consultor: Option<String>,
    // "" limpa o e-mail
    #[validate(custom(function = "email_ou_vazio"))]
    pub email: Option<String>,
    pub whatsapp: Option<String>,
    pub ativo: Option<bool>,
}

impl AtualizarConsultor {
    /// Deve ser chamada antes de `validate()`, senão "   " passa no `min = 1`.
    pub fn normalizar(self) -> Self {
        Self {
            nome: self.nome.map(|s| s.trim().to_string()),
            id_consultor: self.id_consultor.map(|s| s.trim().to_string()),
            email: self.email.map(|s| s.trim().to_string()),
            ..self
        }
    }

    pub fn aplicar_em(self, c: &mut Consultor) {
        if let Some(v) = self.nome {
            c.nome = v;
        }
        if let Some(v) = self.id_consultor {
            c.id_consultor = v;
        }
        if let Some(v) = self.email {
            c.email = blank_to_none(Some(v));
        }
        if let Some(v) = self.whatsapp {
            c.whatsapp = blank_to_none(Some(v));
        }
        if let Some(v) = self.ativo {
            c.ativo = v;
        }
    }
}
