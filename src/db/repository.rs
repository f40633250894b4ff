// src/db/repository.rs
//
// Contrato do armazenamento. Os serviços recebem um `Arc<dyn PropostaRepository>`
// já construído; há um adaptador Postgres (produção) e um em memória (dev/testes).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        consultor::{AtualizarConsultor, Consultor, NovoConsultor},
        envio::{NovoEnvio, PropostaEnvio},
        meta::{AtualizarMeta, MetaProposta, NovaMeta},
        proposta::{AtualizarProposta, MetodoEnvio, NovaProposta, Proposta, PropostaFilters, PropostaStatus},
    },
};

#[async_trait]
pub trait PropostaRepository: Send + Sync {
    // =========================================================================
    //  CONSULTORES
    // =========================================================================

    async fn list_consultores(&self) -> Result<Vec<Consultor>, AppError>;

    async fn get_consultor(&self, id: Uuid) -> Result<Option<Consultor>, AppError>;

    /// Falha com `Conflict` se o `idConsultor` já existir.
    async fn create_consultor(&self, dados: NovoConsultor) -> Result<Consultor, AppError>;

    async fn update_consultor(&self, id: Uuid, dados: AtualizarConsultor) -> Result<Option<Consultor>, AppError>;

    /// Propostas do consultor ficam sem consultor; metas dele são removidas.
    async fn delete_consultor(&self, id: Uuid) -> Result<bool, AppError>;

    // =========================================================================
    //  PROPOSTAS
    // =========================================================================

    /// Mais recentes primeiro.
    async fn list_propostas(&self, filtros: &PropostaFilters) -> Result<Vec<Proposta>, AppError>;

    async fn get_proposta(&self, id: Uuid) -> Result<Option<Proposta>, AppError>;

    /// Aloca o próximo número do `ano` e insere a proposta em RASCUNHO,
    /// tudo numa única transação. Falha da transação vira `Allocation`;
    /// número duplicado vira `Conflict`. Em ambos os casos o chamador
    /// repete a criação inteira.
    async fn create_proposta(&self, ano: i32, dados: NovaProposta) -> Result<Proposta, AppError>;

    async fn update_proposta(&self, id: Uuid, dados: AtualizarProposta) -> Result<Option<Proposta>, AppError>;

    /// Grava o resultado de um envio: status ENVIADA, método, data de envio
    /// e expiração (calculada com a validade da própria proposta).
    async fn marcar_enviada(
        &self,
        id: Uuid,
        metodo: MetodoEnvio,
        agora: DateTime<Utc>,
    ) -> Result<Option<Proposta>, AppError>;

    /// Aplica uma transição validada pela tabela de status, sob o mesmo
    /// bloqueio da leitura. `InvalidTransition` se não for permitida.
    async fn transicionar_status(
        &self,
        id: Uuid,
        para: PropostaStatus,
        agora: DateTime<Utc>,
    ) -> Result<Option<Proposta>, AppError>;

    /// Remove a proposta e o log de envios dela.
    async fn delete_proposta(&self, id: Uuid) -> Result<bool, AppError>;

    // =========================================================================
    //  ENVIOS (log append-only)
    // =========================================================================

    async fn create_envio(&self, dados: NovoEnvio) -> Result<PropostaEnvio, AppError>;

    /// Em ordem de criação.
    async fn list_envios(&self, proposta_id: Uuid) -> Result<Vec<PropostaEnvio>, AppError>;

    // =========================================================================
    //  METAS
    // =========================================================================

    async fn list_metas(&self) -> Result<Vec<MetaProposta>, AppError>;

    async fn get_meta(&self, id: Uuid) -> Result<Option<MetaProposta>, AppError>;

    async fn create_meta(&self, dados: NovaMeta) -> Result<MetaProposta, AppError>;

    async fn update_meta(&self, id: Uuid, dados: AtualizarMeta) -> Result<Option<MetaProposta>, AppError>;

    async fn delete_meta(&self, id: Uuid) -> Result<bool, AppError>;
}
