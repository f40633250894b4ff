// src/common/error.rs

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::models::proposta::PropostaStatus;

// Tipo de erro único da aplicação. Os handlers devolvem `Result<_, AppError>`
// e o `IntoResponse` abaixo decide o status HTTP.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // O &'static str é o nome da entidade ("Proposta", "Consultor", "Meta")
    #[error("{0} não encontrado(a)")]
    NotFound(&'static str),

    // Violação de unicidade (numero_proposta, id_consultor).
    // O chamador deve repetir a operação inteira.
    #[error("Conflito: {0}")]
    Conflict(String),

    // A transação de criação (numeração + insert) abortou.
    #[error("Falha ao alocar número da proposta: {0}")]
    Allocation(String),

    #[error("Transição de status inválida: {de} -> {para}")]
    InvalidTransition {
        de: PropostaStatus,
        para: PropostaStatus,
    },

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo,
            // incluindo os itens aninhados (ex.: "itens[0].quantidade").
            AppError::ValidationError(errors) => {
                let mut details = BTreeMap::new();
                coletar_detalhes("", &errors, &mut details);
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::NotFound(entity) => (StatusCode::NOT_FOUND, format!("{} não encontrado(a)", entity)),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Allocation(msg) => {
                tracing::error!("Falha na alocação do número da proposta: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Não foi possível numerar a proposta. Tente criá-la novamente.".to_string(),
                )
            }
            AppError::InvalidTransition { de, para } => (
                StatusCode::CONFLICT,
                format!("A proposta não pode passar de {} para {}.", de, para),
            ),

            // DatabaseError e InternalServerError viram 500.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.".to_string())
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

// Chaves seguem o formato do JSON (camelCase), não o nome do campo Rust.
fn camel_case(campo: &str) -> String {
    let mut partes = campo.split('_');
    let mut saida = partes.next().unwrap_or_default().to_string();
    for parte in partes {
        let mut chars = parte.chars();
        if let Some(primeira) = chars.next() {
            saida.extend(primeira.to_uppercase());
            saida.push_str(chars.as_str());
        }
    }
    saida
}

fn mensagem(e: &ValidationError) -> String {
    e.message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| e.code.to_string())
}

fn coletar_detalhes(prefixo: &str, errors: &ValidationErrors, details: &mut BTreeMap<String, Vec<String>>) {
    for (campo, tipo) in errors.errors() {
        let nome = camel_case(campo);
        let caminho = if prefixo.is_empty() { nome } else { format!("{}.{}", prefixo, nome) };
        match tipo {
            ValidationErrorsKind::Field(erros) => {
                details.entry(caminho).or_default().extend(erros.iter().map(mensagem));
            }
            ValidationErrorsKind::Struct(aninhado) => coletar_detalhes(&caminho, aninhado, details),
            ValidationErrorsKind::List(itens) => {
                for (indice, aninhado) in itens {
                    coletar_detalhes(&format!("{}[{}]", caminho, indice), aninhado, details);
                }
            }
        }
    }
}
