// src/services/proposta_service.rs

use std::sync::Arc;

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::PropostaRepository,
    models::proposta::{soma_itens, AtualizarProposta, NovaProposta, Proposta, PropostaFilters, PropostaItem},
};

#[derive(Clone)]
pub struct PropostaService {
    repo: Arc<dyn PropostaRepository>,
}

// O valor total é o informado pelo editor; aqui só avisamos se ele não bate com os itens.
fn avisar_divergencia(numero: &str, itens: &[PropostaItem], valor_total: Decimal) {
    if itens.is_empty() {
        return;
    }
    let soma = soma_itens(itens);
    if soma != valor_total {
        tracing::warn!(
            numero,
            valor_total = %valor_total,
            soma_itens = %soma,
            "Valor total da proposta difere da soma dos itens"
        );
    }
}

impl PropostaService {
    pub fn new(repo: Arc<dyn PropostaRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, filtros: &PropostaFilters) -> Result<Vec<Proposta>, AppError> {
        self.repo.list_propostas(filtros).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Proposta, AppError> {
        self.repo.get_proposta(id).await?.ok_or(AppError::NotFound("Proposta"))
    }

    /// Cria a proposta em RASCUNHO com o próximo número do ano corrente.
    pub async fn create(&self, payload: NovaProposta) -> Result<Proposta, AppError> {
        let payload = payload.normalizar();
        payload.validate()?;

        let ano = Utc::now().year();
        let proposta = self.repo.create_proposta(ano, payload).await?;

        avisar_divergencia(&proposta.numero_proposta, &proposta.itens, proposta.valor_total);
        tracing::info!(numero = %proposta.numero_proposta, id = %proposta.id, "Proposta criada");
        Ok(proposta)
    }

    /// Edição parcial, permitida em qualquer status.
    pub async fn update(&self, id: Uuid, payload: AtualizarProposta) -> Result<Proposta, AppError> {
        let payload = payload.normalizar();
        payload.validate()?;

        let proposta = self
            .repo
            .update_proposta(id, payload)
            .await?
            .ok_or(AppError::NotFound("Proposta"))?;

        avisar_divergencia(&proposta.numero_proposta, &proposta.itens, proposta.valor_total);
        Ok(proposta)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_proposta(id).await? {
            return Err(AppError::NotFound("Proposta"));
        }
        tracing::info!(%id, "Proposta removida");
        Ok(())
    }
}
