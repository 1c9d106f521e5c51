use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::application::services::EmbeddingService;
use crate::application::services::embedding_service::EmbeddingError;
use crate::domain::entities::Document;
use crate::domain::repositories::DocumentRepository;
use crate::domain::repositories::document_repository::DocumentRepositoryError;

#[derive(Debug, Error)]
pub enum IngestDocumentError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Repository error: {0}")]
    Repository(#[from] DocumentRepositoryError),
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),
}

#[derive(Debug, Clone)]
pub struct IngestDocumentRequest {
    pub notebook_id: Uuid,
    pub filename: String,
    pub file_type: String,
    /// Text already extracted from the uploaded file.
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct IngestDocumentResponse {
    pub document_id: Uuid,
    pub embedding_batch_id: Uuid,
    pub chunk_count: i32,
}

pub struct IngestDocumentUseCase {
    document_repository: Arc<dyn DocumentRepository>,
    embedding_service: Arc<EmbeddingService>,
}

impl IngestDocumentUseCase {
    pub fn new(
        document_repository: Arc<dyn DocumentRepository>,
        embedding_service: Arc<EmbeddingService>,
    ) -> Self {
        Self {
            document_repository,
            embedding_service,
        }
    }

    /// Stores the document, embeds it, then links the batch to it. If
    /// embedding fails the document is kept without a batch and the
    /// retrieval fallback still covers it.
    #[instrument(skip(self, request), fields(notebook_id = %request.notebook_id, filename = %request.filename))]
    pub async fn execute(
        &self,
        request: IngestDocumentRequest,
    ) -> Result<IngestDocumentResponse, IngestDocumentError> {
        if request.filename.trim().is_empty() {
            return Err(IngestDocumentError::ValidationError(
                "Filename cannot be empty".to_string(),
            ));
        }

        let mut document = Document::new(
            request.notebook_id,
            request.filename,
            request.file_type,
            request.content,
        );
        self.document_repository.save(&document).await?;

        let batch = match self
            .embedding_service
            .create_embeddings(document.id(), document.content())
            .await
        {
            Ok(batch) => batch,
            Err(error) => {
                warn!(document_id = %document.id(), error = %error, "document stored without embeddings");
                return Err(error.into());
            }
        };

        document.attach_embedding_batch(batch.id());
        self.document_repository
            .set_embedding_batch(document.id(), Some(batch.id()))
            .await?;

        info!(
            document_id = %document.id(),
            batch_id = %batch.id(),
            chunk_count = batch.chunk_count(),
            "document ingested"
        );

        Ok(IngestDocumentResponse {
            document_id: document.id(),
            embedding_batch_id: batch.id(),
            chunk_count: batch.chunk_count(),
        })
    }
}
