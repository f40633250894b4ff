// src/handlers/metas.rs

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
    models::meta::{AtualizarMeta, MetaProposta, NovaMeta},
};

// GET /api/metas
#[utoipa::path(
    get,
    path = "/api/metas",
    tag = "Metas",
    responses((status = 200, body = Vec<MetaProposta>))
)]
pub async fn list_metas(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let metas = app_state.meta_service.list().await?;
    Ok((StatusCode::OK, Json(metas)))
}

// GET /api/metas/{id}
#[utoipa::path(
    get,
    path = "/api/metas/{id}",
    tag = "Metas",
    params(("id" = Uuid, Path, description = "ID da meta")),
    responses(
        (status = 200, body = MetaProposta),
        (status = 404, description = "Meta não encontrada")
    )
)]
pub async fn get_meta(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let meta = app_state.meta_service.get(id).await?;
    Ok((StatusCode::OK, Json(meta)))
}

// POST /api/metas
#[utoipa::path(
    post,
    path = "/api/metas",
    tag = "Metas",
    request_body = NovaMeta,
    responses(
        (status = 201, body = MetaProposta),
        (status = 400, description = "Payload inválido"),
        (status = 404, description = "Consultor não encontrado")
    )
)]
pub async fn create_meta(
    State(app_state): State<AppState>,
    Json(payload): Json<NovaMeta>,
) -> Result<impl IntoResponse, AppError> {
    let meta = app_state.meta_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(meta)))
}

// PUT /api/metas/{id}
#[utoipa::path(
    put,
    path = "/api/metas/{id}",
    tag = "Metas",
    params(("id" = Uuid, Path, description = "ID da meta")),
    request_body = AtualizarMeta,
    responses(
        (status = 200, body = MetaProposta),
        (status = 404, description = "Meta não encontrada")
    )
)]
pub async fn update_meta(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AtualizarMeta>,
) -> Result<impl IntoResponse, AppError> {
    let meta = app_state.meta_service.update(id, payload).await?;
    Ok((StatusCode::OK, Json(meta)))
}

// DELETE /api/metas/{id}
#[utoipa::path(
    delete,
    path = "/api/metas/{id}",
    tag = "Metas",
    params(("id" = Uuid, Path, description = "ID da meta")),
    responses(
        (status = 200, description = "Meta removida"),
        (status = 404, description = "Meta não encontrada")
    )
)]
pub async fn delete_meta(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.meta_service.delete(id).await?;
    Ok((StatusCode::OK, Json(json!({ "message": "Meta removida" }))))
}
