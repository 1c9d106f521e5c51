use async_trait::async_trait;
use pgvector::Vector;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::DocumentChunk;

#[derive(Debug, Error)]
pub enum ChunkRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Vector error: {0}")]
    VectorError(String),
}

/// A similarity query scoped to one notebook of one user.
#[derive(Debug, Clone)]
pub struct SimilarityQuery {
    pub embedding: Vector,
    pub notebook_id: Uuid,
    pub user_id: Uuid,
    pub document_ids: Option<Vec<Uuid>>,
    pub threshold: f32,
    pub limit: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatch {
    pub chunk_id: Uuid,
    pub document_id: Uuid,
    pub chunk_index: i32,
    pub content: String,
    pub similarity: f32,
}

/// The vector store holding embedded chunks.
#[async_trait]
pub trait ChunkRepository: Send + Sync {
    /// Inserts every chunk or none of them.
    async fn save_batch(&self, chunks: &[DocumentChunk]) -> Result<(), ChunkRepositoryError>;
    async fn find_by_batch_id(
        &self,
        batch_id: Uuid,
    ) -> Result<Vec<DocumentChunk>, ChunkRepositoryError>;
    /// Matches at or above `query.threshold`, most similar first.
    async fn similarity_search(
        &self,
        query: SimilarityQuery,
    ) -> Result<Vec<SimilarityMatch>, ChunkRepositoryError>;
    async fn delete_by_batch_id(&self, batch_id: Uuid) -> Result<i64, ChunkRepositoryError>;
    async fn count_by_batch_id(&self, batch_id: Uuid) -> Result<i64, ChunkRepositoryError>;
}
