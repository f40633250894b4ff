// src/db/memory_repo.rs
//
// Armazenamento em memória, usado quando não há DATABASE_URL e nos testes.
// Um único RwLock guarda tudo: a escrita que aloca o número e insere a
// proposta acontece sob o mesmo guard, equivalente à transação do Postgres.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::repository::PropostaRepository,
    models::{
        consultor::{AtualizarConsultor, Consultor, NovoConsultor},
        envio::{NovoEnvio, PropostaEnvio},
        meta::{AtualizarMeta, MetaProposta, NovaMeta},
        proposta::{AtualizarProposta, MetodoEnvio, NovaProposta, Proposta, PropostaFilters, PropostaStatus},
    },
    services::numeracao::NumeroProposta,
};

#[derive(Default)]
struct Estado {
    consultores: HashMap<Uuid, Consultor>,
    propostas: HashMap<Uuid, Proposta>,
    envios: Vec<PropostaEnvio>,
    metas: HashMap<Uuid, MetaProposta>,
    // ano -> última sequência alocada
    sequencias: HashMap<i32, u32>,
}

impl Estado {
    fn id_consultor_em_uso(&self, codigo: &str, exceto: Option<Uuid>) -> bool {
        self.consultores
            .values()
            .any(|c| c.id_consultor == codigo && Some(c.id) != exceto)
    }

    fn exige_consultor(&self, consultor_id: Option<Uuid>) -> Result<(), AppError> {
        match consultor_id {
            Some(id) if !self.consultores.contains_key(&id) => Err(AppError::NotFound("Consultor")),
            _ => Ok(()),
        }
    }

    fn modificar_proposta<F>(&mut self, id: Uuid, altera: F) -> Result<Option<Proposta>, AppError>
    where
        F: FnOnce(&mut Proposta) -> Result<(), AppError>,
    {
        let Some(atual) = self.propostas.get(&id) else {
            return Ok(None);
        };

        // Altera uma cópia: se a regra rejeitar, nada muda.
        let mut proposta = atual.clone();
        altera(&mut proposta)?;
        self.exige_consultor(proposta.consultor_id)?;

        self.propostas.insert(id, proposta.clone());
        Ok(Some(proposta))
    }
}

#[derive(Default)]
pub struct MemoryPropostaRepository {
    estado: RwLock<Estado>,
}

impl MemoryPropostaRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn mais_recentes_primeiro<T>(itens: &mut [T], criado_em: impl Fn(&T) -> DateTime<Utc>) {
    itens.sort_by(|a, b| criado_em(b).cmp(&criado_em(a)));
}

#[async_trait]
impl PropostaRepository for MemoryPropostaRepository {
    // =========================================================================
    //  CONSULTORES
    // =========================================================================

    async fn list_consultores(&self) -> Result<Vec<Consultor>, AppError> {
        let estado = self.estado.read().await;
        let mut consultores: Vec<Consultor> = estado.consultores.values().cloned().collect();
        mais_recentes_primeiro(&mut consultores, |c| c.created_at);
        Ok(consultores)
    }

    async fn get_consultor(&self, id: Uuid) -> Result<Option<Consultor>, AppError> {
        Ok(self.estado.read().await.consultores.get(&id).cloned())
    }

    async fn create_consultor(&self, dados: NovoConsultor) -> Result<Consultor, AppError> {
        let mut estado = self.estado.write().await;
        if estado.id_consultor_em_uso(&dados.id_consultor, None) {
            return Err(AppError::Conflict(format!(
                "O ID de consultor '{}' já está em uso.",
                dados.id_consultor
            )));
        }

        let agora = Utc::now();
        let consultor = Consultor {
            id: Uuid::new_v4(),
            nome: dados.nome,
            id_consultor: dados.id_consultor,
            email: dados.email,
            whatsapp: dados.whatsapp,
            ativo: dados.ativo,
            created_at: agora,
            updated_at: agora,
        };
        estado.consultores.insert(consultor.id, consultor.clone());
        Ok(consultor)
    }

    async fn update_consultor(&self, id: Uuid, dados: AtualizarConsultor) -> Result<Option<Consultor>, AppError> {
        let mut estado = self.estado.write().await;
        let Some(mut consultor) = estado.consultores.get(&id).cloned() else {
            return Ok(None);
        };

        dados.aplicar_em(&mut consultor);
        if estado.id_consultor_em_uso(&consultor.id_consultor, Some(id)) {
            return Err(AppError::Conflict(format!(
                "O ID de consultor '{}' já está em uso.",
                consultor.id_consultor
            )));
        }
        consultor.updated_at = Utc::now();

        estado.consultores.insert(id, consultor.clone());
        Ok(Some(consultor))
    }

    async fn delete_consultor(&self, id: Uuid) -> Result<bool, AppError> {
        let mut estado = self.estado.write().await;
        if estado.consultores.remove(&id).is_none() {
            return Ok(false);
        }

        for proposta in estado.propostas.values_mut() {
            if proposta.consultor_id == Some(id) {
                proposta.consultor_id = None;
            }
        }
        estado.metas.retain(|_, m| m.consultor_id != Some(id));
        Ok(true)
    }

    // =========================================================================
    //  PROPOSTAS
    // =========================================================================

    async fn list_propostas(&self, filtros: &PropostaFilters) -> Result<Vec<Proposta>, AppError> {
        let estado = self.estado.read().await;
        let mut propostas: Vec<Proposta> = estado
            .propostas
            .values()
            .filter(|p| filtros.aceita(p))
            .cloned()
            .collect();
        mais_recentes_primeiro(&mut propostas, |p| p.created_at);
        Ok(propostas)
    }

    async fn get_proposta(&self, id: Uuid) -> Result<Option<Proposta>, AppError> {
        Ok(self.estado.read().await.propostas.get(&id).cloned())
    }

    async fn create_proposta(&self, ano: i32, dados: NovaProposta) -> Result<Proposta, AppError> {
        let mut estado = self.estado.write().await;
        estado.exige_consultor(dados.consultor_id)?;

        let numero = NumeroProposta::proximo(ano, estado.sequencias.get(&ano).copied());
        let numero_proposta = numero.to_string();

        if estado.propostas.values().any(|p| p.numero_proposta == numero_proposta) {
            return Err(AppError::Conflict(format!(
                "O número {} já está em uso. Tente criar a proposta novamente.",
                numero_proposta
            )));
        }

        let proposta = dados.into_proposta(Uuid::new_v4(), numero_proposta, Utc::now());
        estado.sequencias.insert(ano, numero.sequencia());
        estado.propostas.insert(proposta.id, proposta.clone());
        Ok(proposta)
    }

    async fn update_proposta(&self, id: Uuid, dados: AtualizarProposta) -> Result<Option<Proposta>, AppError> {
        self.estado.write().await.modificar_proposta(id, |p| {
            dados.aplicar_em(p);
            p.updated_at = Utc::now();
            Ok(())
        })
    }

    async fn marcar_enviada(
        &self,
        id: Uuid,
        metodo: MetodoEnvio,
        agora: DateTime<Utc>,
    ) -> Result<Option<Proposta>, AppError> {
        self.estado.write().await.modificar_proposta(id, |p| {
            p.marcar_enviada(metodo, agora);
            Ok(())
        })
    }

    async fn transicionar_status(
        &self,
        id: Uuid,
        para: PropostaStatus,
        agora: DateTime<Utc>,
    ) -> Result<Option<Proposta>, AppError> {
        self.estado
            .write()
            .await
            .modificar_proposta(id, |p| p.transicionar(para, agora))
    }

    async fn delete_proposta(&self, id: Uuid) -> Result<bool, AppError> {
        let mut estado = self.estado.write().await;
        if estado.propostas.remove(&id).is_none() {
            return Ok(false);
        }
        estado.envios.retain(|e| e.proposta_id != id);
        Ok(true)
    }

    // =========================================================================
    //  ENVIOS
    // =========================================================================

    async fn create_envio(&self, dados: NovoEnvio) -> Result<PropostaEnvio, AppError> {
        let mut estado = self.estado.write().await;
        if !estado.propostas.contains_key(&dados.proposta_id) {
            return Err(AppError::NotFound("Proposta"));
        }

        let envio = PropostaEnvio {
            id: Uuid::new_v4(),
            proposta_id: dados.proposta_id,
            metodo: dados.metodo,
            destinatario: dados.destinatario,
            status: dados.status,
            error_message: dados.error_message,
            created_at: Utc::now(),
        };
        estado.envios.push(envio.clone());
        Ok(envio)
    }

    async fn list_envios(&self, proposta_id: Uuid) -> Result<Vec<PropostaEnvio>, AppError> {
        let estado = self.estado.read().await;
        Ok(estado
            .envios
            .iter()
            .filter(|e| e.proposta_id == proposta_id)
            .cloned()
            .collect())
    }

    // =========================================================================
    //  METAS
    // =========================================================================

    async fn list_metas(&self) -> Result<Vec<MetaProposta>, AppError> {
        let estado = self.estado.read().await;
        let mut metas: Vec<MetaProposta> = estado.metas.values().cloned().collect();
        mais_recentes_primeiro(&mut metas, |m| m.created_at);
        Ok(metas)
    }

    async fn get_meta(&self, id: Uuid) -> Result<Option<MetaProposta>, AppError> {
        Ok(self.estado.read().await.metas.get(&id).cloned())
    }

    async fn create_meta(&self, dados: NovaMeta) -> Result<MetaProposta, AppError> {
        let mut estado = self.estado.write().await;
        estado.exige_consultor(dados.consultor_id)?;

        let agora = Utc::now();
        let meta = MetaProposta {
            id: Uuid::new_v4(),
            periodo: dados.periodo,
            tipo: dados.tipo,
            meta_valor: dados.meta_valor,
            meta_quantidade: dados.meta_quantidade,
            consultor_id: dados.consultor_id,
            created_at: agora,
            updated_at: agora,
        };
        estado.metas.insert(meta.id, meta.clone());
        Ok(meta)
    }

    async fn update_meta(&self, id: Uuid, dados: AtualizarMeta) -> Result<Option<MetaProposta>, AppError> {
        let mut estado = self.estado.write().await;
        let Some(mut meta) = estado.metas.get(&id).cloned() else {
            return Ok(None);
        };

        dados.aplicar_em(&mut meta);
        estado.exige_consultor(meta.consultor_id)?;
        meta.updated_at = Utc::now();

        estado.metas.insert(id, meta.clone());
        Ok(Some(meta))
    }

    async fn delete_meta(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.estado.write().await.metas.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;
    use crate::models::{envio::EnvioStatus, meta::TipoMeta, proposta::tests::nova};

    fn consultor(codigo: &str) -> NovoConsultor {
        NovoConsultor {
            nome: "Maria".into(),
            id_consultor: codigo.into(),
            email: None,
            whatsapp: None,
            ativo: true,
        }
    }

    #[tokio::test]
    async fn numbers_are_sequential_within_a_year() {
        let repo = MemoryPropostaRepository::new();

        let a = repo.create_proposta(2026, nova("Acme", "A")).await.unwrap();
        let b = repo.create_proposta(2026, nova("Acme", "B")).await.unwrap();

        assert_eq!(a.numero_proposta, "PRP-2026-0001");
        assert_eq!(b.numero_proposta, "PRP-2026-0002");
        assert_eq!(a.status, PropostaStatus::Rascunho);
    }

    #[tokio::test]
    async fn sequence_restarts_for_a_new_year() {
        let repo = MemoryPropostaRepository::new();
        for _ in 0..3 {
            repo.create_proposta(2025, nova("Acme", "Plan")).await.unwrap();
        }

        let primeira = repo.create_proposta(2026, nova("Acme", "Plan")).await.unwrap();
        assert_eq!(primeira.numero_proposta, "PRP-2026-0001");
    }

    #[tokio::test]
    async fn deleted_numbers_are_not_reused() {
        let repo = MemoryPropostaRepository::new();
        let a = repo.create_proposta(2026, nova("Acme", "A")).await.unwrap();
        let b = repo.create_proposta(2026, nova("Acme", "B")).await.unwrap();

        assert!(repo.delete_proposta(b.id).await.unwrap());
        assert!(repo.delete_proposta(a.id).await.unwrap());

        let c = repo.create_proposta(2026, nova("Acme", "C")).await.unwrap();
        assert_eq!(c.numero_proposta, "PRP-2026-0003");
    }

    #[tokio::test]
    async fn concurrent_creations_get_distinct_numbers() {
        let repo = Arc::new(MemoryPropostaRepository::new());

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.create_proposta(2026, nova("Acme", &format!("P{i}"))).await })
            })
            .collect();

        let mut numeros = HashSet::new();
        for handle in handles {
            let proposta = handle.await.unwrap().unwrap();
            assert!(numeros.insert(proposta.numero_proposta));
        }

        assert_eq!(numeros.len(), 50);
        assert!(numeros.contains("PRP-2026-0001"));
        assert!(numeros.contains("PRP-2026-0050"));
    }

    #[tokio::test]
    async fn unknown_consultant_is_rejected_on_create() {
        let repo = MemoryPropostaRepository::new();
        let mut payload = nova("Acme", "Plan");
        payload.consultor_id = Some(Uuid::new_v4());

        let err = repo.create_proposta(2026, payload).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound("Consultor")));

        // A falha não consome número
        let ok = repo.create_proposta(2026, nova("Acme", "Plan")).await.unwrap();
        assert_eq!(ok.numero_proposta, "PRP-2026-0001");
    }

    #[tokio::test]
    async fn list_filters_and_orders_newest_first() {
        let repo = MemoryPropostaRepository::new();
        let mut sp = nova("Acme", "SP");
        sp.cliente_estado = Some("SP".into());
        let primeira = repo.create_proposta(2026, sp).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let segunda = repo.create_proposta(2026, nova("Beta", "Sem estado")).await.unwrap();

        let todas = repo.list_propostas(&PropostaFilters::default()).await.unwrap();
        assert_eq!(todas.iter().map(|p| p.id).collect::<Vec<_>>(), vec![segunda.id, primeira.id]);

        let filtro = PropostaFilters { estado: Some("SP".into()), ..Default::default() };
        let so_sp = repo.list_propostas(&filtro).await.unwrap();
        assert_eq!(so_sp.len(), 1);
        assert_eq!(so_sp[0].id, primeira.id);
    }

    #[tokio::test]
    async fn rejected_transition_leaves_record_untouched() {
        let repo = MemoryPropostaRepository::new();
        let p = repo.create_proposta(2026, nova("Acme", "Plan")).await.unwrap();

        let err = repo
            .transicionar_status(p.id, PropostaStatus::Aceita, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));

        let atual = repo.get_proposta(p.id).await.unwrap().unwrap();
        assert_eq!(atual.status, PropostaStatus::Rascunho);
        assert_eq!(atual.data_resposta, None);
    }

    #[tokio::test]
    async fn deleting_a_proposal_drops_its_send_log() {
        let repo = MemoryPropostaRepository::new();
        let p = repo.create_proposta(2026, nova("Acme", "Plan")).await.unwrap();
        repo.create_envio(NovoEnvio {
            proposta_id: p.id,
            metodo: MetodoEnvio::Email,
            destinatario: "c@x.com".into(),
            status: EnvioStatus::Enviado,
            error_message: None,
        })
        .await
        .unwrap();
        assert_eq!(repo.list_envios(p.id).await.unwrap().len(), 1);

        repo.delete_proposta(p.id).await.unwrap();
        assert!(repo.list_envios(p.id).await.unwrap().is_empty());
        assert!(!repo.delete_proposta(p.id).await.unwrap());
    }

    #[tokio::test]
    async fn deleting_a_consultant_detaches_proposals_and_drops_goals() {
        let repo = MemoryPropostaRepository::new();
        let c = repo.create_consultor(consultor("CONS-1")).await.unwrap();

        let mut payload = nova("Acme", "Plan");
        payload.consultor_id = Some(c.id);
        let p = repo.create_proposta(2026, payload).await.unwrap();
        repo.create_meta(NovaMeta {
            periodo: "2026-02".into(),
            tipo: TipoMeta::Mensal,
            meta_valor: None,
            meta_quantidade: Some(10),
            consultor_id: Some(c.id),
        })
        .await
        .unwrap();

        assert!(repo.delete_consultor(c.id).await.unwrap());

        let p = repo.get_proposta(p.id).await.unwrap().unwrap();
        assert_eq!(p.consultor_id, None);
        assert!(repo.list_metas().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn consultant_code_must_be_unique() {
        let repo = MemoryPropostaRepository::new();
        repo.create_consultor(consultor("CONS-1")).await.unwrap();
        let outro = repo.create_consultor(consultor("CONS-2")).await.unwrap();

        assert!(matches!(
            repo.create_consultor(consultor("CONS-1")).await,
            Err(AppError::Conflict(_))
        ));

        let renomear = AtualizarConsultor { id_consultor: Some("CONS-1".into()), ..Default::default() };
        assert!(matches!(
            repo.update_consultor(outro.id, renomear).await,
            Err(AppError::Conflict(_))
        ));
    }
}
