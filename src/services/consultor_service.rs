// src/services/consultor_service.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::PropostaRepository,
    models::consultor::{AtualizarConsultor, Consultor, NovoConsultor},
};

#[derive(Clone)]
pub struct ConsultorService {
    repo: Arc<dyn PropostaRepository>,
}

impl ConsultorService {
    pub fn new(repo: Arc<dyn PropostaRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<Consultor>, AppError> {
        self.repo.list_consultores().await
    }

    pub async fn get(&self, id: Uuid) -> Result<Consultor, AppError> {
        self.repo.get_consultor(id).await?.ok_or(AppError::NotFound("Consultor"))
    }

    pub async fn create(&self, payload: NovoConsultor) -> Result<Consultor, AppError> {
        let payload = payload.normalizar();
        payload.validate()?;
        self.repo.create_consultor(payload).await
    }

    pub async fn update(&self, id: Uuid, payload: AtualizarConsultor) -> Result<Consultor, AppError> {
        let payload = payload.normalizar();
        payload.validate()?;
        self.repo
            .update_consultor(id, payload)
            .await?
            .ok_or(AppError::NotFound("Consultor"))
    }

    // As propostas do consultor continuam existindo, só perdem o vínculo.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_consultor(id).await? {
            return Err(AppError::NotFound("Consultor"));
        }
        tracing::info!(%id, "Consultor removido");
        Ok(())
    }
}
