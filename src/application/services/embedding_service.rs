use std::sync::Arc;

use pgvector::Vector;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::application::ports::embedding_provider::{
    EmbeddingProvider, EmbeddingProviderError, EmbeddingRequest, EmbeddingTask,
};
use crate::application::services::chunker::WordWindowChunker;
use crate::application::services::retriever::RetrievalError;
use crate::domain::entities::{DocumentChunk, EmbeddingBatch, RetrievalResult};
use crate::domain::repositories::chunk_repository::{ChunkRepositoryError, SimilarityQuery};
use crate::domain::repositories::embedding_batch_repository::EmbeddingBatchRepositoryError;
use crate::domain::repositories::{ChunkRepository, EmbeddingBatchRepository};

const DIMENSION_PROBE_TEXT: &str = "This is a test";

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Embedding provider error: {0}")]
    Provider(#[from] EmbeddingProviderError),
    #[error("Embedding provider returned an empty vector")]
    EmptyVector,
    #[error("Chunk store error: {0}")]
    Store(#[from] ChunkRepositoryError),
    #[error("Embedding batch error: {0}")]
    Batch(#[from] EmbeddingBatchRepositoryError),
    #[error("Embedding batch state error: {0}")]
    BatchState(String),
    #[error("Embedding batch {batch_id} left partially written: {reason}")]
    PartialWrite { batch_id: Uuid, reason: String },
}

/// Turns text into vectors and owns the chunk records of every embedding
/// batch.
pub struct EmbeddingService {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    chunk_repository: Arc<dyn ChunkRepository>,
    batch_repository: Arc<dyn EmbeddingBatchRepository>,
    chunker: WordWindowChunker,
    similarity_threshold: f32,
}

impl EmbeddingService {
    pub fn new(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        chunk_repository: Arc<dyn ChunkRepository>,
        batch_repository: Arc<dyn EmbeddingBatchRepository>,
        chunker: WordWindowChunker,
        similarity_threshold: f32,
    ) -> Self {
        Self {
            embedding_provider,
            chunk_repository,
            batch_repository,
            chunker,
            similarity_threshold,
        }
    }

    pub async fn embed(&self, text: &str, task: EmbeddingTask) -> Result<Vector, EmbeddingError> {
        let response = self
            .embedding_provider
            .generate_embedding(EmbeddingRequest {
                text: text.to_string(),
                task,
            })
            .await?;

        Ok(response.embedding)
    }

    /// Chunks and embeds `content` as one batch.
    ///
    /// Every vector is generated before anything is written, and the chunk
    /// records are inserted in a single atomic call. If any step fails the
    /// batch is marked failed and whatever was written is removed again.
    #[instrument(skip(self, content), fields(content_chars = content.len()))]
    pub async fn create_embeddings(
        &self,
        document_id: Uuid,
        content: &str,
    ) -> Result<EmbeddingBatch, EmbeddingError> {
        let batch = EmbeddingBatch::new(document_id);
        self.batch_repository.save(&batch).await?;

        let finished = match self.write_chunks(&batch, content).await {
            Ok(chunk_count) => self.finish_batch(&batch, chunk_count).await,
            Err(error) => Err(error),
        };

        match finished {
            Ok(completed) => {
                info!(
                    batch_id = %completed.id(),
                    chunk_count = completed.chunk_count(),
                    "embedding batch complete"
                );
                Ok(completed)
            }
            Err(error) => Err(self.abandon_batch(batch, error).await),
        }
    }

    /// Persists the complete state. The pending `batch` is left untouched so
    /// a failure here can still be abandoned.
    async fn finish_batch(
        &self,
        batch: &EmbeddingBatch,
        chunk_count: i32,
    ) -> Result<EmbeddingBatch, EmbeddingError> {
        let mut completed = batch.clone();
        completed
            .complete(chunk_count)
            .map_err(EmbeddingError::BatchState)?;
        self.batch_repository.update(&completed).await?;
        Ok(completed)
    }

    async fn write_chunks(
        &self,
        batch: &EmbeddingBatch,
        content: &str,
    ) -> Result<i32, EmbeddingError> {
        let texts = self.chunker.split(content);
        debug!(batch_id = %batch.id(), chunk_count = texts.len(), "split document into chunks");

        let mut chunks = Vec::with_capacity(texts.len());
        for (index, text) in texts.into_iter().enumerate() {
            let embedding = self.embed(&text, EmbeddingTask::RetrievalDocument).await?;
            if embedding.as_slice().is_empty() {
                return Err(EmbeddingError::EmptyVector);
            }

            chunks.push(DocumentChunk::new(
                batch.id(),
                batch.document_id(),
                index as i32,
                text,
                embedding,
            ));
        }

        if !chunks.is_empty() {
            self.chunk_repository.save_batch(&chunks).await?;
        }

        Ok(chunks.len() as i32)
    }

    async fn abandon_batch(&self, mut batch: EmbeddingBatch, error: EmbeddingError) -> EmbeddingError {
        warn!(batch_id = %batch.id(), error = %error, "embedding batch failed, cleaning up");

        let cleanup = self.chunk_repository.delete_by_batch_id(batch.id()).await;

        if let Err(state_error) = batch.fail(error.to_string()) {
            warn!(batch_id = %batch.id(), error = %state_error, "could not mark batch failed");
        } else if let Err(update_error) = self.batch_repository.update(&batch).await {
            warn!(batch_id = %batch.id(), error = %update_error, "could not persist failed batch");
        }

        match cleanup {
            Ok(_) => error,
            Err(cleanup_error) => EmbeddingError::PartialWrite {
                batch_id: batch.id(),
                reason: format!("{}; cleanup failed: {}", error, cleanup_error),
            },
        }
    }

    /// Vector search over one user's notebook, most similar first, as
    /// ordered by the store.
    #[instrument(skip(self, query, selected_document_ids))]
    pub async fn search_similar(
        &self,
        query: &str,
        notebook_id: Uuid,
        user_id: Uuid,
        limit: i64,
        selected_document_ids: Option<&[Uuid]>,
    ) -> Result<Vec<RetrievalResult>, RetrievalError> {
        let embedding = self
            .embed(query, EmbeddingTask::RetrievalQuery)
            .await
            .map_err(RetrievalError::Embedding)?;

        let matches = self
            .chunk_repository
            .similarity_search(SimilarityQuery {
                embedding,
                notebook_id,
                user_id,
                document_ids: selected_document_ids.map(<[Uuid]>::to_vec),
                threshold: self.similarity_threshold,
                limit,
            })
            .await
            .map_err(RetrievalError::Store)?;

        debug!(hits = matches.len(), "vector search finished");

        Ok(matches
            .into_iter()
            .map(|hit| RetrievalResult::from_vector_search(hit.document_id, hit.content, hit.similarity))
            .collect())
    }

    /// Removes a batch and all of its chunks. Unknown batches are not an error.
    #[instrument(skip(self))]
    pub async fn delete_embeddings(&self, embedding_batch_id: Uuid) -> Result<i64, EmbeddingError> {
        let removed = self
            .chunk_repository
            .delete_by_batch_id(embedding_batch_id)
            .await?;
        self.batch_repository.delete(embedding_batch_id).await?;

        debug!(removed, "deleted embedding batch");
        Ok(removed)
    }

    /// Embeds a fixed probe string and reports the dimension actually returned.
    pub async fn embedding_dimension_probe(&self) -> Result<usize, EmbeddingError> {
        let embedding = self
            .embed(DIMENSION_PROBE_TEXT, EmbeddingTask::RetrievalDocument)
            .await?;

        match embedding.as_slice().len() {
            0 => Err(EmbeddingError::EmptyVector),
            dimension => Ok(dimension),
        }
    }

    pub fn model_name(&self) -> &str {
        self.embedding_provider.model_name()
    }

    pub fn embedding_dimension(&self) -> usize {
        self.embedding_provider.embedding_dimension()
    }
}
