// src/services/notificacao.rs
//
// Despachantes de notificação usados no envio da proposta.
// E-mail vai pela API HTTP do Resend quando há RESEND_API_KEY; sem chave
// (e sempre para WhatsApp, que ainda não tem integração) a mensagem só é logada.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::models::proposta::{MetodoEnvio, Proposta};

pub const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";
pub const REMETENTE_PADRAO: &str = "WOW+ <nao-responda@wowmais.com.br>";

/// Falha de um canal. Não é um `AppError`: o envio registra a tentativa como FALHOU e segue.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct DispatchFailure(pub String);

#[async_trait]
pub trait Notificador: Send + Sync {
    async fn dispatch(&self, destino: &str, assunto: &str, corpo: &str) -> Result<(), DispatchFailure>;
}

// =============================================================================
//  RESEND (e-mail)
// =============================================================================

#[derive(Serialize)]
struct EmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

pub struct ResendNotificador {
    client: reqwest::Client,
    api_key: String,
    remetente: String,
    endpoint: String,
}

impl ResendNotificador {
    pub fn new(api_key: String, remetente: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            remetente,
            endpoint: RESEND_ENDPOINT.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl Notificador for ResendNotificador {
    async fn dispatch(&self, destino: &str, assunto: &str, corpo: &str) -> Result<(), DispatchFailure> {
        let body = EmailRequest {
            from: &self.remetente,
            to: [destino],
            subject: assunto,
            html: corpo,
        };

        let resposta = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DispatchFailure(format!("Falha ao chamar o Resend: {}", e)))?;

        let status = resposta.status();
        if !status.is_success() {
            let detalhe = resposta.text().await.unwrap_or_default();
            return Err(DispatchFailure(format!("Resend respondeu {}: {}", status, detalhe)));
        }

        tracing::debug!(destino, "E-mail aceito pelo Resend");
        Ok(())
    }
}

// =============================================================================
//  LOG (modo sem provedor)
// =============================================================================

pub struct LogNotificador {
    canal: &'static str,
}

impl LogNotificador {
    pub fn new(canal: &'static str) -> Self {
        Self { canal }
    }
}

#[async_trait]
impl Notificador for LogNotificador {
    async fn dispatch(&self, destino: &str, assunto: &str, corpo: &str) -> Result<(), DispatchFailure> {
        tracing::info!(
            canal = self.canal,
            destino,
            assunto,
            tamanho = corpo.len(),
            "[Mock] Mensagem registrada sem envio real"
        );
        Ok(())
    }
}

// =============================================================================
//  ROTEAMENTO POR CANAL
// =============================================================================

#[derive(Clone)]
pub struct Canais {
    email: Arc<dyn Notificador>,
    whatsapp: Arc<dyn Notificador>,
}

impl Canais {
    pub fn new(email: Arc<dyn Notificador>, whatsapp: Arc<dyn Notificador>) -> Self {
        Self { email, whatsapp }
    }

    /// Nenhum provedor: os dois canais só logam.
    pub fn somente_log() -> Self {
        Self::new(
            Arc::new(LogNotificador::new("EMAIL")),
            Arc::new(LogNotificador::new("WHATSAPP")),
        )
    }

    // AMBOS nunca chega aqui: o envio expande o método em canais antes.
    pub fn para(&self, canal: MetodoEnvio) -> &dyn Notificador {
        match canal {
            MetodoEnvio::Whatsapp => self.whatsapp.as_ref(),
            MetodoEnvio::Email | MetodoEnvio::Ambos => self.email.as_ref(),
        }
    }
}

// =============================================================================
//  MENSAGEM
// =============================================================================

pub struct Mensagem {
    pub assunto: String,
    pub corpo: String,
}

fn escapar_html(texto: &str) -> String {
    let mut saida = String::with_capacity(texto.len());
    for c in texto.chars() {
        match c {
            '&' => saida.push_str("&amp;"),
            '<' => saida.push_str("&lt;"),
            '>' => saida.push_str("&gt;"),
            '"' => saida.push_str("&quot;"),
            '\'' => saida.push_str("&#39;"),
            _ => saida.push(c),
        }
    }
    saida
}

impl Mensagem {
    pub fn da_proposta(canal: MetodoEnvio, p: &Proposta) -> Self {
        let assunto = format!("Proposta {} - {}", p.numero_proposta, p.titulo);
        let validade = p.validade_efetiva();

        let corpo = match canal {
            MetodoEnvio::Whatsapp => {
                let mut texto = format!(
                    "Olá, {}! Segue a proposta {} ({}), no valor de R$ {}. Válida por {} dias.",
                    p.cliente_nome, p.numero_proposta, p.titulo, p.valor_total, validade
                );
                if let Some(url) = &p.pdf_url {
                    texto.push_str(&format!(" PDF: {}", url));
                }
                texto
            }
            MetodoEnvio::Email | MetodoEnvio::Ambos => {
                let mut html = format!(
                    "<p>Olá, {}!</p><p>Segue a proposta <strong>{}</strong>: {}.</p>\
                     <p>Valor total: R$ {}</p><p>Esta proposta é válida por {} dias.</p>",
                    escapar_html(&p.cliente_nome),
                    escapar_html(&p.numero_proposta),
                    escapar_html(&p.titulo),
                    p.valor_total,
                    validade
                );
                if let Some(url) = &p.pdf_url {
                    html.push_str(&format!("<p><a href=\"{}\">Baixar PDF</a></p>", escapar_html(url)));
                }
                html
            }
        };

        Self { assunto, corpo }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use axum::{
        extract::State,
        http::{HeaderMap, StatusCode},
        routing::post,
        Json, Router,
    };
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::*;
    use crate::models::proposta::tests::nova;

    type Recebidos = Arc<Mutex<Vec<(Option<String>, serde_json::Value)>>>;

    // Sobe um servidor local que responde como o Resend, com o status escolhido.
    async fn resend_falso(status: StatusCode) -> (String, Recebidos) {
        let recebidos: Recebidos = Arc::default();

        let app = Router::new()
            .route(
                "/emails",
                post(
                    move |State(recebidos): State<Recebidos>, headers: HeaderMap, Json(body): Json<serde_json::Value>| async move {
                        let auth = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        recebidos.lock().unwrap().push((auth, body));
                        (status, "{}")
                    },
                ),
            )
            .with_state(recebidos.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/emails", addr), recebidos)
    }

    fn resend(endpoint: &str) -> ResendNotificador {
        ResendNotificador::new("re_teste".into(), REMETENTE_PADRAO.into(), Duration::from_secs(5))
            .unwrap()
            .with_endpoint(endpoint)
    }

    #[tokio::test]
    async fn resend_posts_bearer_authenticated_email() {
        let (endpoint, recebidos) = resend_falso(StatusCode::OK).await;

        resend(&endpoint)
            .dispatch("c@x.com", "Proposta PRP-2026-0001", "<p>oi</p>")
            .await
            .unwrap();

        let recebidos = recebidos.lock().unwrap();
        assert_eq!(recebidos.len(), 1);
        let (auth, body) = &recebidos[0];
        assert_eq!(auth.as_deref(), Some("Bearer re_teste"));
        assert_eq!(body["to"], serde_json::json!(["c@x.com"]));
        assert_eq!(body["from"], REMETENTE_PADRAO);
        assert_eq!(body["subject"], "Proposta PRP-2026-0001");
    }

    #[tokio::test]
    async fn resend_error_status_becomes_dispatch_failure() {
        let (endpoint, _) = resend_falso(StatusCode::UNPROCESSABLE_ENTITY).await;

        let falha = resend(&endpoint).dispatch("c@x.com", "a", "b").await.unwrap_err();
        assert!(falha.0.contains("422"), "mensagem inesperada: {}", falha);
    }

    #[tokio::test]
    async fn log_dispatcher_always_succeeds() {
        let canais = Canais::somente_log();
        assert!(canais.para(MetodoEnvio::Email).dispatch("c@x.com", "a", "b").await.is_ok());
        assert!(canais.para(MetodoEnvio::Whatsapp).dispatch("+55", "a", "b").await.is_ok());
    }

    #[test]
    fn message_escapes_client_text_in_html() {
        let mut payload = nova("<Acme & Filhos>", "Plano");
        payload.valor_total = Decimal::new(30000, 2);
        let p = payload.into_proposta(Uuid::new_v4(), "PRP-2026-0001".into(), Utc::now());

        let email = Mensagem::da_proposta(MetodoEnvio::Email, &p);
        assert_eq!(email.assunto, "Proposta PRP-2026-0001 - Plano");
        assert!(email.corpo.contains("&lt;Acme &amp; Filhos&gt;"));
        assert!(email.corpo.contains("R$ 300.00"));

        let whatsapp = Mensagem::da_proposta(MetodoEnvio::Whatsapp, &p);
        assert!(whatsapp.corpo.contains("<Acme & Filhos>"));
        assert!(whatsapp.corpo.contains("30 dias"));
    }
}
