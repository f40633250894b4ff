// src/services/meta_service.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::PropostaRepository,
    models::meta::{AtualizarMeta, MetaProposta, NovaMeta},
};

#[derive(Clone)]
pub struct MetaService {
    repo: Arc<dyn PropostaRepository>,
}

impl MetaService {
    pub fn new(repo: Arc<dyn PropostaRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<MetaProposta>, AppError> {
        self.repo.list_metas().await
    }

    pub async fn get(&self, id: Uuid) -> Result<MetaProposta, AppError> {
        self.repo.get_meta(id).await?.ok_or(AppError::NotFound("Meta"))
    }

    pub async fn create(&self, payload: NovaMeta) -> Result<MetaProposta, AppError> {
        let payload = payload.normalizar();
        payload.validate()?;
        self.repo.create_meta(payload).await
    }

    pub async fn update(&self, id: Uuid, payload: AtualizarMeta) -> Result<MetaProposta, AppError> {
        let payload = payload.normalizar();
        payload.validate()?;
        self.repo.update_meta(id, payload).await?.ok_or(AppError::NotFound("Meta"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_meta(id).await? {
            return Err(AppError::NotFound("Meta"));
        }
        Ok(())
    }
}
