use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::application::services::EmbeddingService;
use crate::application::services::embedding_service::EmbeddingError;
use crate::domain::repositories::DocumentRepository;
use crate::domain::repositories::document_repository::DocumentRepositoryError;

#[derive(Debug, Error)]
pub enum DeleteDocumentError {
    #[error("Document not found: {0}")]
    DocumentNotFound(Uuid),
    #[error("Repository error: {0}")]
    RepositoryError(String),
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),
}

impl From<DocumentRepositoryError> for DeleteDocumentError {
    fn from(error: DocumentRepositoryError) -> Self {
        match error {
            DocumentRepositoryError::NotFound(id) => DeleteDocumentError::DocumentNotFound(id),
            _ => DeleteDocumentError::RepositoryError(error.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeleteDocumentRequest {
    pub document_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct DeleteDocumentResponse {
    pub document_id: Uuid,
    pub chunks_removed: i64,
}

pub struct DeleteDocumentUseCase {
    document_repository: Arc<dyn DocumentRepository>,
    embedding_service: Arc<EmbeddingService>,
}

impl DeleteDocumentUseCase {
    pub fn new(
        document_repository: Arc<dyn DocumentRepository>,
        embedding_service: Arc<EmbeddingService>,
    ) -> Self {
        Self {
            document_repository,
            embedding_service,
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self,
        request: DeleteDocumentRequest,
    ) -> Result<DeleteDocumentResponse, DeleteDocumentError> {
        let document = self
            .document_repository
            .find_by_id(request.document_id)
            .await?
            .ok_or(DeleteDocumentError::DocumentNotFound(request.document_id))?;

        let chunks_removed = match document.embedding_batch_id() {
            Some(batch_id) => self.embedding_service.delete_embeddings(batch_id).await?,
            None => 0,
        };

        self.document_repository.delete(document.id()).await?;
        info!(document_id = %document.id(), chunks_removed, "document deleted");

        Ok(DeleteDocumentResponse {
            document_id: document.id(),
            chunks_removed,
        })
    }
}
