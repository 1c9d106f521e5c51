use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::EmbeddingBatch;

#[derive(Debug, Error)]
pub enum EmbeddingBatchRepositoryError {
    #[error("Embedding batch not found: {0}")]
    NotFound(Uuid),
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[async_trait]
pub trait EmbeddingBatchRepository: Send + Sync {
    async fn save(&self, batch: &EmbeddingBatch) -> Result<(), EmbeddingBatchRepositoryError>;
    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<EmbeddingBatch>, EmbeddingBatchRepositoryError>;
    async fn update(&self, batch: &EmbeddingBatch) -> Result<(), EmbeddingBatchRepositoryError>;
    async fn delete(&self, id: Uuid) -> Result<bool, EmbeddingBatchRepositoryError>;
}
