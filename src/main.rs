//src/main.rs

use axum::{
    routing::{get, patch, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::docs::ApiDoc;

pub fn build_router(app_state: AppState) -> Router {
    let proposta_routes = Router::new()
        .route(
            "/",
            post(handlers::propostas::create_proposta).get(handlers::propostas::list_propostas),
        )
        // Rota estática tem prioridade sobre /{id}
        .route("/dashboard", get(handlers::dashboard::get_dashboard))
        .route(
            "/{id}",
            get(handlers::propostas::get_proposta)
                .put(handlers::propostas::update_proposta)
                .delete(handlers::propostas::delete_proposta),
        )
        .route("/{id}/enviar", post(handlers::propostas::enviar_proposta))
        .route("/{id}/status", patch(handlers::propostas::registrar_status))
        .route("/{id}/envios", get(handlers::propostas::list_envios));

    let consultor_routes = Router::new()
        .route(
            "/",
            post(handlers::consultores::create_consultor).get(handlers::consultores::list_consultores),
        )
        .route(
            "/{id}",
            get(handlers::consultores::get_consultor)
                .put(handlers::consultores::update_consultor)
                .delete(handlers::consultores::delete_consultor),
        );

    let meta_routes = Router::new()
        .route("/", post(handlers::metas::create_meta).get(handlers::metas::list_metas))
        .route(
            "/{id}",
            get(handlers::metas::get_meta)
                .put(handlers::metas::update_meta)
                .delete(handlers::metas::delete_meta),
        );

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest("/api/propostas", proposta_routes)
        .nest("/api/consultores", consultor_routes)
        .nest("/api/metas", meta_routes)
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;
    let app = build_router(app_state);

    let listener = TcpListener::bind(config.bind_address).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
