use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::Document;
use crate::domain::value_objects::DocumentLabel;

#[derive(Debug, Error)]
pub enum DocumentRepositoryError {
    #[error("Document not found: {0}")]
    NotFound(Uuid),
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn save(&self, document: &Document) -> Result<(), DocumentRepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Document>, DocumentRepositoryError>;
    /// Documents of a notebook owned by `user_id`, optionally restricted to
    /// `id_filter`. A notebook the user does not own yields nothing.
    async fn list_by_notebook(
        &self,
        notebook_id: Uuid,
        user_id: Uuid,
        id_filter: Option<&[Uuid]>,
    ) -> Result<Vec<Document>, DocumentRepositoryError>;
    /// Display metadata for every document of a notebook, keyed by id.
    async fn labels_by_notebook(
        &self,
        notebook_id: Uuid,
    ) -> Result<HashMap<Uuid, DocumentLabel>, DocumentRepositoryError>;
    async fn set_embedding_batch(
        &self,
        document_id: Uuid,
        batch_id: Option<Uuid>,
    ) -> Result<(), DocumentRepositoryError>;
    async fn delete(&self, id: Uuid) -> Result<bool, DocumentRepositoryError>;
}
