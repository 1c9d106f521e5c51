use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::application::services::embedding_service::{EmbeddingError, EmbeddingService};
use crate::config::RagSettings;
use crate::domain::entities::RetrievalResult;
use crate::domain::repositories::DocumentRepository;
use crate::domain::repositories::chunk_repository::ChunkRepositoryError;
use crate::domain::repositories::document_repository::DocumentRepositoryError;

/// An empty result set is not an error; these are.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Query embedding failed: {0}")]
    Embedding(EmbeddingError),
    #[error("Vector search failed: {0}")]
    Store(ChunkRepositoryError),
    #[error("Document fallback failed: {0}")]
    Documents(DocumentRepositoryError),
}

/// How raw documents stand in for vector hits when vector search finds
/// nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackPolicy {
    pub min_content_chars: usize,
    pub max_chars: usize,
    pub similarity: f32,
}

impl FallbackPolicy {
    pub fn from_settings(settings: &RagSettings) -> Self {
        Self {
            min_content_chars: settings.fallback_min_content_chars,
            max_chars: settings.fallback_max_chars,
            similarity: settings.fallback_similarity,
        }
    }
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self::from_settings(&RagSettings::default())
    }
}

pub struct Retriever {
    embedding_service: Arc<EmbeddingService>,
    document_repository: Arc<dyn DocumentRepository>,
    limit: i64,
    fallback: FallbackPolicy,
}

impl Retriever {
    pub fn new(
        embedding_service: Arc<EmbeddingService>,
        document_repository: Arc<dyn DocumentRepository>,
        limit: i64,
        fallback: FallbackPolicy,
    ) -> Self {
        Self {
            embedding_service,
            document_repository,
            limit,
            fallback,
        }
    }

    #[instrument(skip(self, question, selected_document_ids))]
    pub async fn retrieve(
        &self,
        question: &str,
        notebook_id: Uuid,
        user_id: Uuid,
        selected_document_ids: Option<&[Uuid]>,
    ) -> Result<Vec<RetrievalResult>, RetrievalError> {
        let results = self
            .embedding_service
            .search_similar(
                question,
                notebook_id,
                user_id,
                self.limit,
                selected_document_ids,
            )
            .await?;

        if !results.is_empty() {
            info!(hits = results.len(), "retrieved chunks by vector search");
            return Ok(results);
        }

        let fallback = self
            .document_fallback(notebook_id, user_id, selected_document_ids)
            .await?;
        info!(
            documents = fallback.len(),
            "vector search returned nothing, using raw document content"
        );
        Ok(fallback)
    }

    /// One pseudo-chunk per document with enough content: its leading
    /// characters at a fixed score. Scoped to the same owner as the vector
    /// search.
    pub async fn document_fallback(
        &self,
        notebook_id: Uuid,
        user_id: Uuid,
        selected_document_ids: Option<&[Uuid]>,
    ) -> Result<Vec<RetrievalResult>, RetrievalError> {
        let documents = self
            .document_repository
            .list_by_notebook(notebook_id, user_id, selected_document_ids)
            .await
            .map_err(RetrievalError::Documents)?;

        Ok(documents
            .iter()
            .filter(|document| document.has_substantial_content(self.fallback.min_content_chars))
            .map(|document| {
                RetrievalResult::from_fallback(
                    document.id(),
                    document.content_preview(self.fallback.max_chars),
                    self.fallback.similarity,
                )
            })
            .collect())
    }
}
