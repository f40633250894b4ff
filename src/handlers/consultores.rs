// src/handlers/consultores.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::consultor::{AtualizarConsultor, Consultor, NovoConsultor},
};

// GET /api/consultores
#[utoipa::path(
    get,
    path = "/api/consultores",
    tag = "Consultores",
    responses((status = 200, body = Vec<Consultor>))
)]
pub async fn list_consultores(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let consultores = app_state.consultor_service.list().await?;
    Ok((StatusCode::OK, Json(consultores)))
}

// GET /api/consultores/{id}
#[utoipa::path(
    get,
    path = "/api/consultores/{id}",
    tag = "Consultores",
    params(("id" = Uuid, Path, description = "ID do consultor")),
    responses(
        (status = 200, body = Consultor),
        (status = 404, description = "Consultor não encontrado")
    )
)]
pub async fn get_consultor(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let consultor = app_state.consultor_service.get(id).await?;
    Ok((StatusCode::OK, Json(consultor)))
}

// POST /api/consultores
#[utoipa::path(
    post,
    path = "/api/consultores",
    tag = "Consultores",
    request_body = NovoConsultor,
    responses(
        (status = 201, body = Consultor),
        (status = 400, description = "Payload inválido"),
        (status = 409, description = "ID de consultor já em uso")
    )
)]
pub async fn create_consultor(
    State(app_state): State<AppState>,
    Json(payload): Json<NovoConsultor>,
) -> Result<impl IntoResponse, AppError> {
    let consultor = app_state.consultor_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(consultor)))
}

// PUT /api/consultores/{id}
#[utoipa::path(
    put,
    path = "/api/consultores/{id}",
    tag = "Consultores",
    params(("id" = Uuid, Path, description = "ID do consultor")),
    request_body = AtualizarConsultor,
    responses(
        (status = 200, body = Consultor),
        (status = 404, description = "Consultor não encontrado"),
        (status = 409, description = "ID de consultor já em uso")
    )
)]
pub async fn update_consultor(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AtualizarConsultor>,
) -> Result<impl IntoResponse, AppError> {
    let consultor = app_state.consultor_service.update(id, payload).await?;
    Ok((StatusCode::OK, Json(consultor)))
}

// DELETE /api/consultores/{id}
#[utoipa::path(
    delete,
    path = "/api/consultores/{id}",
    tag = "Consultores",
    params(("id" = Uuid, Path, description = "ID do consultor")),
    responses(
        (status = 200, description = "Consultor removido; suas propostas ficam sem consultor"),
        (status = 404, description = "Consultor não encontrado")
    )
)]
pub async fn delete_consultor(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.consultor_service.delete(id).await?;
    Ok((StatusCode::OK, Json(json!({ "message": "Consultor removido" }))))
}
