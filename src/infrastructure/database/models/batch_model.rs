use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::entities::EmbeddingBatch;
use crate::domain::value_objects::BatchStatus;
use crate::infrastructure::database::schema::embedding_batches;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = embedding_batches)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EmbeddingBatchModel {
    pub id: Uuid,
    pub document_id: Uuid,
    pub status: String,
    pub chunk_count: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = embedding_batches)]
pub struct NewEmbeddingBatchModel {
    pub id: Uuid,
    pub document_id: Uuid,
    pub status: String,
    pub chunk_count: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = embedding_batches)]
pub struct UpdateEmbeddingBatchModel {
    pub status: String,
    pub chunk_count: i32,
    pub error_message: Option<Option<String>>,
    pub completed_at: Option<Option<DateTime<Utc>>>,
}

impl From<&EmbeddingBatch> for NewEmbeddingBatchModel {
    fn from(batch: &EmbeddingBatch) -> Self {
        Self {
            id: batch.id(),
            document_id: batch.document_id(),
            status: batch.status().as_str().to_string(),
            chunk_count: batch.chunk_count(),
            error_message: batch.error_message().map(str::to_string),
            created_at: batch.created_at(),
            completed_at: batch.completed_at(),
        }
    }
}

impl From<&EmbeddingBatch> for UpdateEmbeddingBatchModel {
    fn from(batch: &EmbeddingBatch) -> Self {
        Self {
            status: batch.status().as_str().to_string(),
            chunk_count: batch.chunk_count(),
            error_message: Some(batch.error_message().map(str::to_string)),
            completed_at: Some(batch.completed_at()),
        }
    }
}

impl TryFrom<EmbeddingBatchModel> for EmbeddingBatch {
    type Error = String;

    fn try_from(model: EmbeddingBatchModel) -> Result<Self, Self::Error> {
        let status = BatchStatus::from_string(&model.status)?;

        Ok(EmbeddingBatch::restore(
            model.id,
            model.document_id,
            status,
            model.chunk_count,
            model.error_message,
            model.created_at,
            model.completed_at,
        ))
    }
}
