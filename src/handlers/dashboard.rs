// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{common::error::AppError, config::AppState, models::dashboard::DashboardMetrics};

// GET /api/propostas/dashboard
#[utoipa::path(
    get,
    path = "/api/propostas/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Indicadores agregados de todas as propostas", body = DashboardMetrics),
        (status = 500, description = "Erro ao ler as propostas")
    )
)]
pub async fn get_dashboard(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let metrics = app_state.dashboard_service.get_metrics().await?;
    Ok((StatusCode::OK, Json(metrics)))
}
