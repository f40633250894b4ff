// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Propostas ---
        handlers::propostas::list_propostas,
        handlers::propostas::get_proposta,
        handlers::propostas::create_proposta,
        handlers::propostas::update_proposta,
        handlers::propostas::delete_proposta,
        handlers::propostas::enviar_proposta,
        handlers::propostas::registrar_status,
        handlers::propostas::list_envios,

        // --- Dashboard ---
        handlers::dashboard::get_dashboard,

        // --- Consultores ---
        handlers::consultores::list_consultores,
        handlers::consultores::get_consultor,
        handlers::consultores::create_consultor,
        handlers::consultores::update_consultor,
        handlers::consultores::delete_consultor,

        // --- Metas ---
        handlers::metas::list_metas,
        handlers::metas::get_meta,
        handlers::metas::create_meta,
        handlers::metas::update_meta,
        handlers::metas::delete_meta,
    ),
    components(
        schemas(
            // --- Propostas ---
            models::proposta::PropostaStatus,
            models::proposta::MetodoEnvio,
            models::proposta::PropostaItem,
            models::proposta::Proposta,
            models::proposta::NovaProposta,
            models::proposta::AtualizarProposta,
            models::proposta::EnviarPropostaPayload,
            models::proposta::RegistrarStatusPayload,

            // --- Envios ---
            models::envio::EnvioStatus,
            models::envio::PropostaEnvio,

            // --- Consultores ---
            models::consultor::Consultor,
            models::consultor::NovoConsultor,
            models::consultor::AtualizarConsultor,

            // --- Metas ---
            models::meta::TipoMeta,
            models::meta::MetaProposta,
            models::meta::NovaMeta,
            models::meta::AtualizarMeta,

            // --- Dashboard ---
            models::dashboard::DashboardMetrics,
            models::dashboard::EstadoEntry,
            models::dashboard::MesEntry,
            models::dashboard::StatusEntry,
            models::dashboard::ConsultorRankingEntry,
            models::dashboard::ValorAcumuladoEntry,
            models::dashboard::FunilEntry,
            models::dashboard::HeatmapEntry,
            models::dashboard::FaixaValorEntry,
        )
    ),
    tags(
        (name = "Propostas", description = "Cadastro, numeração, envio e status das propostas"),
        (name = "Dashboard", description = "Indicadores de conversão das propostas"),
        (name = "Consultores", description = "Consultores responsáveis pelas propostas"),
        (name = "Metas", description = "Metas de valor e quantidade por período")
    ),
    modifiers(&VersaoAddon)
)]
pub struct ApiDoc;

// Mantém a versão do documento igual à do pacote
struct VersaoAddon;

impl utoipa::Modify for VersaoAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = "Propostas API".to_string();
        openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let caminhos: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for esperado in [
            "/api/propostas",
            "/api/propostas/{id}",
            "/api/propostas/{id}/enviar",
            "/api/propostas/{id}/status",
            "/api/propostas/{id}/envios",
            "/api/propostas/dashboard",
            "/api/consultores",
            "/api/consultores/{id}",
            "/api/metas",
            "/api/metas/{id}",
        ] {
            assert!(caminhos.contains(&esperado), "faltando {esperado}");
        }
        assert_eq!(doc.info.title, "Propostas API");
    }
}
