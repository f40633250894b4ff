// src/config.rs

use std::{net::SocketAddr, sync::Arc, time::Duration};

use sqlx::postgres::PgPoolOptions;

use crate::{
    db::{MemoryPropostaRepository, PgPropostaRepository, PropostaRepository},
    services::{
        consultor_service::ConsultorService,
        dashboard_service::DashboardService,
        envio_service::EnvioService,
        meta_service::MetaService,
        notificacao::{Canais, LogNotificador, ResendNotificador, REMETENTE_PADRAO},
        proposta_service::PropostaService,
    },
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Valor inválido para a variável {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    // Sem DATABASE_URL o servidor sobe com armazenamento em memória
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    // Sem chave o e-mail só é logado
    pub resend_api_key: Option<String>,
    pub email_remetente: String,
    pub notificacao_timeout: Duration,
    pub permitir_reenvio: bool,
}

fn parse_var<T>(nome: &str, valor: Option<String>, padrao: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match valor {
        None => Ok(padrao),
        Some(v) => v
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(nome.to_string(), format!("'{}': {}", v, e))),
    }
}

impl Config {
    /// Lê a configuração das variáveis de ambiente (com `.env` em desenvolvimento).
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_vars(|nome| std::env::var(nome).ok())
    }

    /// Mesmo que `from_env`, mas com a origem das variáveis injetada.
    /// Valores vazios contam como ausentes.
    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |nome: &str| get(nome).filter(|v| !v.trim().is_empty());

        let bind_address = parse_var(
            "BIND_ADDRESS",
            var("BIND_ADDRESS"),
            SocketAddr::from(([0, 0, 0, 0], 3000)),
        )?;
        let db_max_connections = parse_var("DB_MAX_CONNECTIONS", var("DB_MAX_CONNECTIONS"), 5u32)?;
        let timeout_secs = parse_var("NOTIFICACAO_TIMEOUT_SECS", var("NOTIFICACAO_TIMEOUT_SECS"), 10u64)?;
        let permitir_reenvio = parse_var("PROPOSTAS_PERMITIR_REENVIO", var("PROPOSTAS_PERMITIR_REENVIO"), true)?;

        Ok(Self {
            bind_address,
            database_url: var("DATABASE_URL"),
            db_max_connections,
            resend_api_key: var("RESEND_API_KEY"),
            email_remetente: var("EMAIL_REMETENTE").unwrap_or_else(|| REMETENTE_PADRAO.to_string()),
            notificacao_timeout: Duration::from_secs(timeout_secs),
            permitir_reenvio,
        })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub proposta_service: PropostaService,
    pub envio_service: EnvioService,
    pub dashboard_service: DashboardService,
    pub consultor_service: ConsultorService,
    pub meta_service: MetaService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let repo: Arc<dyn PropostaRepository> = match &config.database_url {
            Some(database_url) => {
                let db_pool = PgPoolOptions::new()
                    .max_connections(config.db_max_connections)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await?;
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!().run(&db_pool).await?;
                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

                Arc::new(PgPropostaRepository::new(db_pool))
            }
            None => {
                tracing::warn!("DATABASE_URL não definida: usando armazenamento em memória (dados não persistem)");
                Arc::new(MemoryPropostaRepository::new())
            }
        };

        let canais = match &config.resend_api_key {
            Some(api_key) => {
                let email = ResendNotificador::new(
                    api_key.clone(),
                    config.email_remetente.clone(),
                    config.notificacao_timeout,
                )?;
                Canais::new(Arc::new(email), Arc::new(LogNotificador::new("WHATSAPP")))
            }
            None => {
                tracing::warn!("RESEND_API_KEY não definida: e-mails serão apenas logados");
                Canais::somente_log()
            }
        };

        Ok(Self::with_repo(repo, canais, config.permitir_reenvio))
    }

    /// Monta o gráfico de dependências sobre um repositório já construído.
    pub fn with_repo(repo: Arc<dyn PropostaRepository>, canais: Canais, permitir_reenvio: bool) -> Self {
        Self {
            proposta_service: PropostaService::new(repo.clone()),
            envio_service: EnvioService::new(repo.clone(), canais, permitir_reenvio),
            dashboard_service: DashboardService::new(repo.clone()),
            consultor_service: ConsultorService::new(repo.clone()),
            meta_service: MetaService::new(repo),
        }
    }
}
