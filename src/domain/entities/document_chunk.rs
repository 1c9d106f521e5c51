use chrono::{DateTime, Utc};
use pgvector::Vector;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One embedded word-window of a document. Chunks are immutable once
/// written; they only ever disappear together with their batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    id: Uuid,
    embedding_batch_id: Uuid,
    document_id: Uuid,
    chunk_index: i32,
    content: String,
    embedding: Vector,
    created_at: DateTime<Utc>,
}

impl DocumentChunk {
    pub fn new(
        embedding_batch_id: Uuid,
        document_id: Uuid,
        chunk_index: i32,
        content: String,
        embedding: Vector,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            embedding_batch_id,
            document_id,
            chunk_index,
            content,
            embedding,
            created_at: Utc::now(),
        }
    }

    pub fn restore(
        id: Uuid,
        embedding_batch_id: Uuid,
        document_id: Uuid,
        chunk_index: i32,
        content: String,
        embedding: Vector,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            embedding_batch_id,
            document_id,
            chunk_index,
            content,
            embedding,
            created_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn embedding_batch_id(&self) -> Uuid {
        self.embedding_batch_id
    }

    pub fn document_id(&self) -> Uuid {
        self.document_id
    }

    pub fn chunk_index(&self) -> i32 {
        self.chunk_index
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn embedding(&self) -> &Vector {
        &self.embedding
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn dimension(&self) -> usize {
        self.embedding.as_slice().len()
    }

    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }

    /// Cosine similarity against `query`, or `None` when the dimensions
    /// differ or either vector has zero magnitude.
    pub fn cosine_similarity(&self, query: &Vector) -> Option<f32> {
        let a = self.embedding.as_slice();
        let b = query.as_slice();

        if a.len() != b.len() || a.is_empty() {
            return None;
        }

        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return None;
        }

        Some(dot_product / (norm_a * norm_b))
    }
}
