// src/models/envio.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::proposta::MetodoEnvio;

// Mapeia o CREATE TYPE envio_status do banco.
// PENDENTE existe para canais sem confirmação de entrega (ex.: WhatsApp);
// o envio deste núcleo só grava ENVIADO ou FALHOU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "envio_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum EnvioStatus {
    Enviado,
    Falhou,
    Pendente,
}

/// Log imutável de cada tentativa de envio (um registro por canal).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropostaEnvio {
    pub id: Uuid,
    pub proposta_id: Uuid,
    #[schema(example = "EMAIL")]
    pub metodo: MetodoEnvio,
    #[schema(example = "c@x.com")]
    pub destinatario: String,
    pub status: EnvioStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NovoEnvio {
    pub proposta_id: Uuid,
    pub metodo: MetodoEnvio,
    pub destinatario: String,
    pub status: EnvioStatus,
    pub error_message: Option<String>,
}
