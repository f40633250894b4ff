// src/common/db_utils.rs

use crate::common::error::AppError;

// ---
// Helper de erros do Postgres
// ---
/// Converte violação de chave única em `AppError::Conflict` com uma mensagem
/// amigável; qualquer outro erro segue como `DatabaseError`.
pub(crate) fn map_unique_violation<F>(e: sqlx::Error, message: F) -> AppError
where
    F: FnOnce() -> String,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::Conflict(message());
        }
    }
    e.into()
}

/// Como `map_unique_violation`, mas também converte violação de chave
/// estrangeira em `NotFound` da entidade referenciada (ex.: consultor inexistente).
pub(crate) fn map_write_error<F>(e: sqlx::Error, referenciada: &'static str, message: F) -> AppError
where
    F: FnOnce() -> String,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_foreign_key_violation() {
            return AppError::NotFound(referenciada);
        }
    }
    map_unique_violation(e, message)
}

/// Trata strings vazias (ou só com espaços) como ausentes.
/// O formulário manda "" quando o usuário apaga um campo opcional.
pub(crate) fn blank_to_none(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
    })
}
