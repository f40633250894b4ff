// src/handlers/propostas.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        envio::PropostaEnvio,
        proposta::{
            AtualizarProposta, EnviarPropostaPayload, NovaProposta, Proposta, PropostaFilters,
            RegistrarStatusPayload,
        },
    },
};

// GET /api/propostas
#[utoipa::path(
    get,
    path = "/api/propostas",
    tag = "Propostas",
    params(PropostaFilters),
    responses(
        (status = 200, description = "Propostas, mais recentes primeiro", body = Vec<Proposta>)
    )
)]
pub async fn list_propostas(
    State(app_state): State<AppState>,
    Query(filtros): Query<PropostaFilters>,
) -> Result<impl IntoResponse, AppError> {
    let propostas = app_state.proposta_service.list(&filtros).await?;
    Ok((StatusCode::OK, Json(propostas)))
}

// GET /api/propostas/{id}
#[utoipa::path(
    get,
    path = "/api/propostas/{id}",
    tag = "Propostas",
    params(("id" = Uuid, Path, description = "ID da proposta")),
    responses(
        (status = 200, body = Proposta),
        (status = 404, description = "Proposta não encontrada")
    )
)]
pub async fn get_proposta(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let proposta = app_state.proposta_service.get(id).await?;
    Ok((StatusCode::OK, Json(proposta)))
}

// POST /api/propostas
#[utoipa::path(
    post,
    path = "/api/propostas",
    tag = "Propostas",
    request_body = NovaProposta,
    responses(
        (status = 201, description = "Proposta criada em RASCUNHO com número alocado", body = Proposta),
        (status = 400, description = "Payload inválido"),
        (status = 409, description = "Número já em uso, repita a criação"),
        (status = 503, description = "Falha na numeração, repita a criação")
    )
)]
pub async fn create_proposta(
    State(app_state): State<AppState>,
    Json(payload): Json<NovaProposta>,
) -> Result<impl IntoResponse, AppError> {
    let proposta = app_state.proposta_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(proposta)))
}

// PUT /api/propostas/{id}
#[utoipa::path(
    put,
    path = "/api/propostas/{id}",
    tag = "Propostas",
    params(("id" = Uuid, Path, description = "ID da proposta")),
    request_body = AtualizarProposta,
    responses(
        (status = 200, body = Proposta),
        (status = 400, description = "Payload inválido"),
        (status = 404, description = "Proposta não encontrada")
    )
)]
pub async fn update_proposta(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AtualizarProposta>,
) -> Result<impl IntoResponse, AppError> {
    let proposta = app_state.proposta_service.update(id, payload).await?;
    Ok((StatusCode::OK, Json(proposta)))
}

// DELETE /api/propostas/{id}
#[utoipa::path(
    delete,
    path = "/api/propostas/{id}",
    tag = "Propostas",
    params(("id" = Uuid, Path, description = "ID da proposta")),
    responses(
        (status = 200, description = "Proposta removida junto com o histórico de envios"),
        (status = 404, description = "Proposta não encontrada")
    )
)]
pub async fn delete_proposta(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.proposta_service.delete(id).await?;
    Ok((StatusCode::OK, Json(json!({ "message": "Proposta removida" }))))
}

// POST /api/propostas/{id}/enviar
#[utoipa::path(
    post,
    path = "/api/propostas/{id}/enviar",
    tag = "Propostas",
    params(("id" = Uuid, Path, description = "ID da proposta")),
    request_body = EnviarPropostaPayload,
    responses(
        (status = 200, description = "Proposta enviada (falhas de canal ficam no histórico de envios)", body = Proposta),
        (status = 404, description = "Proposta não encontrada"),
        (status = 409, description = "Reenvio bloqueado pela configuração")
    )
)]
pub async fn enviar_proposta(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EnviarPropostaPayload>,
) -> Result<impl IntoResponse, AppError> {
    let proposta = app_state.envio_service.enviar(id, payload.metodo).await?;
    Ok((StatusCode::OK, Json(proposta)))
}

// PATCH /api/propostas/{id}/status
#[utoipa::path(
    patch,
    path = "/api/propostas/{id}/status",
    tag = "Propostas",
    params(("id" = Uuid, Path, description = "ID da proposta")),
    request_body = RegistrarStatusPayload,
    responses(
        (status = 200, body = Proposta),
        (status = 404, description = "Proposta não encontrada"),
        (status = 409, description = "Transição de status não permitida")
    )
)]
pub async fn registrar_status(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RegistrarStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let proposta = app_state.envio_service.registrar_status(id, payload.status).await?;
    Ok((StatusCode::OK, Json(proposta)))
}

// GET /api/propostas/{id}/envios
#[utoipa::path(
    get,
    path = "/api/propostas/{id}/envios",
    tag = "Propostas",
    params(("id" = Uuid, Path, description = "ID da proposta")),
    responses(
        (status = 200, description = "Tentativas de envio em ordem cronológica", body = Vec<PropostaEnvio>),
        (status = 404, description = "Proposta não encontrada")
    )
)]
pub async fn list_envios(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let envios = app_state.envio_service.list_envios(id).await?;
    Ok((StatusCode::OK, Json(envios)))
}
