// src/services/envio_service.rs
//
// Ciclo de vida da proposta: envio pelos canais e transições posteriores.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::PropostaRepository,
    models::{
        envio::{EnvioStatus, NovoEnvio, PropostaEnvio},
        proposta::{MetodoEnvio, Proposta, PropostaStatus},
    },
    services::notificacao::{Canais, Mensagem},
};

#[derive(Clone)]
pub struct EnvioService {
    repo: Arc<dyn PropostaRepository>,
    canais: Canais,
    // false = só RASCUNHO pode ser enviada
    permitir_reenvio: bool,
}

impl EnvioService {
    pub fn new(repo: Arc<dyn PropostaRepository>, canais: Canais, permitir_reenvio: bool) -> Self {
        Self {
            repo,
            canais,
            permitir_reenvio,
        }
    }

    /// Envia a proposta pelos canais do método e a marca como ENVIADA.
    ///
    /// Cada canal com contato preenchido gera exatamente um registro de envio
    /// (ENVIADO ou FALHOU); canal sem contato é pulado sem registro. A falha
    /// de um canal nunca aborta o envio: a proposta passa para ENVIADA mesmo
    /// que todos os canais falhem ou nenhum tenha contato.
    pub async fn enviar(&self, id: Uuid, metodo: MetodoEnvio) -> Result<Proposta, AppError> {
        let proposta = self
            .repo
            .get_proposta(id)
            .await?
            .ok_or(AppError::NotFound("Proposta"))?;

        if !self.permitir_reenvio && !proposta.status.pode_transicionar(PropostaStatus::Enviada) {
            return Err(AppError::InvalidTransition {
                de: proposta.status,
                para: PropostaStatus::Enviada,
            });
        }

        for &canal in metodo.canais() {
            let Some(destino) = proposta.contato(canal) else {
                tracing::debug!(
                    numero = %proposta.numero_proposta,
                    canal = canal.as_str(),
                    "Canal sem contato, pulando"
                );
                continue;
            };

            let mensagem = Mensagem::da_proposta(canal, &proposta);
            let (status, error_message) = match self
                .canais
                .para(canal)
                .dispatch(destino, &mensagem.assunto, &mensagem.corpo)
                .await
            {
                Ok(()) => (EnvioStatus::Enviado, None),
                Err(falha) => {
                    tracing::warn!(
                        numero = %proposta.numero_proposta,
                        canal = canal.as_str(),
                        erro = %falha,
                        "Falha ao enviar proposta"
                    );
                    (EnvioStatus::Falhou, Some(falha.to_string()))
                }
            };

            self.repo
                .create_envio(NovoEnvio {
                    proposta_id: proposta.id,
                    metodo: canal,
                    destinatario: destino.to_string(),
                    status,
                    error_message,
                })
                .await?;
        }

        let atualizada = self
            .repo
            .marcar_enviada(id, metodo, Utc::now())
            .await?
            .ok_or(AppError::NotFound("Proposta"))?;

        tracing::info!(
            numero = %atualizada.numero_proposta,
            metodo = metodo.as_str(),
            de = %proposta.status,
            "Proposta enviada"
        );
        Ok(atualizada)
    }

    /// Transições disparadas fora do envio (visualização, aceite, recusa, expiração).
    /// ENVIADA só é alcançável por `enviar`.
    pub async fn registrar_status(&self, id: Uuid, para: PropostaStatus) -> Result<Proposta, AppError> {
        if para == PropostaStatus::Enviada {
            let atual = self
                .repo
                .get_proposta(id)
                .await?
                .ok_or(AppError::NotFound("Proposta"))?;
            return Err(AppError::InvalidTransition { de: atual.status, para });
        }

        let atualizada = self
            .repo
            .transicionar_status(id, para, Utc::now())
            .await?
            .ok_or(AppError::NotFound("Proposta"))?;

        tracing::info!(numero = %atualizada.numero_proposta, status = %para, "Status da proposta atualizado");
        Ok(atualizada)
    }

    pub async fn list_envios(&self, proposta_id: Uuid) -> Result<Vec<PropostaEnvio>, AppError> {
        if self.repo.get_proposta(proposta_id).await?.is_none() {
            return Err(AppError::NotFound("Proposta"));
        }
        self.repo.list_envios(proposta_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Duration;

    use super::*;
    use crate::{
        db::MemoryPropostaRepository,
        models::proposta::tests::nova,
        services::notificacao::{DispatchFailure, Notificador},
    };

    // Notificador de teste: grava os destinos e falha quando mandado.
    #[derive(Default)]
    struct Roteirizado {
        destinos: Mutex<Vec<String>>,
        falhar: bool,
    }

    impl Roteirizado {
        fn falhando() -> Self {
            Self { falhar: true, ..Default::default() }
        }

        fn chamadas(&self) -> Vec<String> {
            self.destinos.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notificador for Roteirizado {
        async fn dispatch(&self, destino: &str, _assunto: &str, _corpo: &str) -> Result<(), DispatchFailure> {
            self.destinos.lock().unwrap().push(destino.to_string());
            if self.falhar {
                Err(DispatchFailure("provedor fora do ar".into()))
            } else {
                Ok(())
            }
        }
    }

    struct Cenario {
        repo: Arc<MemoryPropostaRepository>,
        email: Arc<Roteirizado>,
        whatsapp: Arc<Roteirizado>,
        service: EnvioService,
    }

    fn cenario_com(email: Roteirizado, permitir_reenvio: bool) -> Cenario {
        let repo = Arc::new(MemoryPropostaRepository::new());
        let email = Arc::new(email);
        let whatsapp = Arc::new(Roteirizado::default());
        let service = EnvioService::new(
            repo.clone(),
            Canais::new(email.clone(), whatsapp.clone()),
            permitir_reenvio,
        );
        Cenario {
            repo,
            email,
            whatsapp,
            service,
        }
    }

    fn cenario() -> Cenario {
        cenario_com(Roteirizado::default(), true)
    }

    async fn criar(c: &Cenario, email: Option<&str>, whatsapp: Option<&str>) -> Proposta {
        let mut payload = nova("Acme", "Plan");
        payload.cliente_email = email.map(str::to_string);
        payload.cliente_whatsapp = whatsapp.map(str::to_string);
        payload.validade_dias = 10;
        c.repo.create_proposta(2026, payload).await.unwrap()
    }

    #[tokio::test]
    async fn email_send_logs_one_attempt_and_stamps_expiry() {
        let c = cenario();
        let p = criar(&c, Some("c@x.com"), None).await;

        let enviada = c.service.enviar(p.id, MetodoEnvio::Email).await.unwrap();

        assert_eq!(enviada.status, PropostaStatus::Enviada);
        assert_eq!(enviada.metodo_envio, Some(MetodoEnvio::Email));
        let data_envio = enviada.data_envio.unwrap();
        assert_eq!(enviada.data_expiracao, Some(data_envio + Duration::days(10)));

        let envios = c.service.list_envios(p.id).await.unwrap();
        assert_eq!(envios.len(), 1);
        assert_eq!(envios[0].metodo, MetodoEnvio::Email);
        assert_eq!(envios[0].destinatario, "c@x.com");
        assert_eq!(envios[0].status, EnvioStatus::Enviado);
        assert_eq!(c.email.chamadas(), vec!["c@x.com".to_string()]);
    }

    #[tokio::test]
    async fn missing_contact_skips_channel_but_still_sends() {
        let c = cenario();
        let p = criar(&c, Some("c@x.com"), None).await;

        let enviada = c.service.enviar(p.id, MetodoEnvio::Whatsapp).await.unwrap();

        assert_eq!(enviada.status, PropostaStatus::Enviada);
        assert!(c.service.list_envios(p.id).await.unwrap().is_empty());
        assert!(c.whatsapp.chamadas().is_empty());
    }

    #[tokio::test]
    async fn ambos_only_uses_channels_with_contact() {
        let c = cenario();
        let p = criar(&c, None, Some("+5511999998888")).await;

        c.service.enviar(p.id, MetodoEnvio::Ambos).await.unwrap();

        let envios = c.service.list_envios(p.id).await.unwrap();
        assert_eq!(envios.len(), 1);
        assert_eq!(envios[0].metodo, MetodoEnvio::Whatsapp);
        assert!(c.email.chamadas().is_empty());

        let p2 = criar(&c, Some("c@x.com"), Some("+55")).await;
        c.service.enviar(p2.id, MetodoEnvio::Ambos).await.unwrap();
        let metodos: Vec<_> = c.service.list_envios(p2.id).await.unwrap().iter().map(|e| e.metodo).collect();
        assert_eq!(metodos, vec![MetodoEnvio::Email, MetodoEnvio::Whatsapp]);
    }

    #[tokio::test]
    async fn dispatch_failure_is_recorded_and_does_not_abort() {
        let c = cenario_com(Roteirizado::falhando(), true);
        let p = criar(&c, Some("c@x.com"), None).await;

        let enviada = c.service.enviar(p.id, MetodoEnvio::Email).await.unwrap();

        assert_eq!(enviada.status, PropostaStatus::Enviada);
        let envios = c.service.list_envios(p.id).await.unwrap();
        assert_eq!(envios.len(), 1);
        assert_eq!(envios[0].status, EnvioStatus::Falhou);
        assert_eq!(envios[0].error_message.as_deref(), Some("provedor fora do ar"));
    }

    #[tokio::test]
    async fn resending_appends_attempts_and_moves_dates() {
        let c = cenario();
        let p = criar(&c, Some("c@x.com"), None).await;

        let primeira = c.service.enviar(p.id, MetodoEnvio::Email).await.unwrap();
        let segunda = c.service.enviar(p.id, MetodoEnvio::Email).await.unwrap();

        assert_eq!(segunda.status, PropostaStatus::Enviada);
        assert!(segunda.data_envio >= primeira.data_envio);
        assert_eq!(c.service.list_envios(p.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn strict_policy_blocks_resend() {
        let c = cenario_com(Roteirizado::default(), false);
        let p = criar(&c, Some("c@x.com"), None).await;

        c.service.enviar(p.id, MetodoEnvio::Email).await.unwrap();
        let err = c.service.enviar(p.id, MetodoEnvio::Email).await.unwrap_err();

        assert!(matches!(
            err,
            AppError::InvalidTransition { de: PropostaStatus::Enviada, para: PropostaStatus::Enviada }
        ));
        assert_eq!(c.service.list_envios(p.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_proposal_is_not_found() {
        let c = cenario();
        let id = Uuid::new_v4();

        assert!(matches!(
            c.service.enviar(id, MetodoEnvio::Email).await,
            Err(AppError::NotFound("Proposta"))
        ));
        assert!(matches!(c.service.list_envios(id).await, Err(AppError::NotFound("Proposta"))));
        assert!(matches!(
            c.service.registrar_status(id, PropostaStatus::Aceita).await,
            Err(AppError::NotFound("Proposta"))
        ));
    }

    #[tokio::test]
    async fn status_registration_follows_the_transition_table() {
        let c = cenario();
        let p = criar(&c, Some("c@x.com"), None).await;

        // Rascunho não pode ser aceita direto
        assert!(matches!(
            c.service.registrar_status(p.id, PropostaStatus::Aceita).await,
            Err(AppError::InvalidTransition { .. })
        ));
        // ENVIADA só pelo envio
        assert!(matches!(
            c.service.registrar_status(p.id, PropostaStatus::Enviada).await,
            Err(AppError::InvalidTransition { de: PropostaStatus::Rascunho, .. })
        ));

        c.service.enviar(p.id, MetodoEnvio::Email).await.unwrap();
        let vista = c.service.registrar_status(p.id, PropostaStatus::Visualizada).await.unwrap();
        assert!(vista.data_visualizacao.is_some());

        let aceita = c.service.registrar_status(p.id, PropostaStatus::Aceita).await.unwrap();
        assert!(aceita.data_resposta.is_some());
        assert!(matches!(
            c.service.registrar_status(p.id, PropostaStatus::Expirada).await,
            Err(AppError::InvalidTransition { de: PropostaStatus::Aceita, .. })
        ));
    }
}
