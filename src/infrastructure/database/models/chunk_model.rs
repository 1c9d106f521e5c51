use chrono::{DateTime, Utc};
use diesel::prelude::*;
use pgvector::Vector;
use uuid::Uuid;

use crate::domain::entities::DocumentChunk as DomainChunk;
use crate::infrastructure::database::schema::document_chunks;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(belongs_to(super::DocumentModel, foreign_key = document_id))]
#[diesel(table_name = document_chunks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DocumentChunkModel {
    pub id: Uuid,
    pub embedding_batch_id: Uuid,
    pub document_id: Uuid,
    pub chunk_index: i32,
    pub content: String,
    pub embedding: Option<Vector>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = document_chunks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewDocumentChunkModel {
    pub id: Uuid,
    pub embedding_batch_id: Uuid,
    pub document_id: Uuid,
    pub chunk_index: i32,
    pub content: String,
    pub embedding: Option<Vector>,
    pub created_at: DateTime<Utc>,
}

impl From<&DomainChunk> for NewDocumentChunkModel {
    fn from(chunk: &DomainChunk) -> Self {
        Self {
            id: chunk.id(),
            embedding_batch_id: chunk.embedding_batch_id(),
            document_id: chunk.document_id(),
            chunk_index: chunk.chunk_index(),
            content: chunk.content().to_string(),
            embedding: Some(chunk.embedding().clone()),
            created_at: chunk.created_at(),
        }
    }
}

impl TryFrom<DocumentChunkModel> for DomainChunk {
    type Error = String;

    fn try_from(model: DocumentChunkModel) -> Result<Self, Self::Error> {
        let embedding = model
            .embedding
            .ok_or_else(|| format!("Chunk {} has no embedding", model.id))?;

        Ok(DomainChunk::restore(
            model.id,
            model.embedding_batch_id,
            model.document_id,
            model.chunk_index,
            model.content,
            embedding,
            model.created_at,
        ))
    }
}
