use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::DocumentLabel;

/// An uploaded document with its fully extracted text. The embedding batch
/// id is attached once chunking and embedding have finished, so a freshly
/// saved document briefly has none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    id: Uuid,
    notebook_id: Uuid,
    filename: String,
    file_type: String,
    content: String,
    embedding_batch_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl Document {
    pub fn new(notebook_id: Uuid, filename: String, file_type: String, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            notebook_id,
            filename,
            file_type,
            content,
            embedding_batch_id: None,
            created_at: Utc::now(),
        }
    }

    /// Rebuilds a document that was already persisted.
    pub fn restore(
        id: Uuid,
        notebook_id: Uuid,
        filename: String,
        file_type: String,
        content: String,
        embedding_batch_id: Option<Uuid>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            notebook_id,
            filename,
            file_type,
            content,
            embedding_batch_id,
            created_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn notebook_id(&self) -> Uuid {
        self.notebook_id
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn file_type(&self) -> &str {
        &self.file_type
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn embedding_batch_id(&self) -> Option<Uuid> {
        self.embedding_batch_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn label(&self) -> DocumentLabel {
        DocumentLabel::new(self.filename.clone(), self.file_type.clone())
    }

    pub fn attach_embedding_batch(&mut self, batch_id: Uuid) {
        self.embedding_batch_id = Some(batch_id);
    }

    pub fn detach_embedding_batch(&mut self) -> Option<Uuid> {
        self.embedding_batch_id.take()
    }

    pub fn is_embedded(&self) -> bool {
        self.embedding_batch_id.is_some()
    }

    pub fn character_count(&self) -> usize {
        self.content.chars().count()
    }

    /// True when the content is longer than `min_chars` characters.
    pub fn has_substantial_content(&self, min_chars: usize) -> bool {
        self.content.chars().nth(min_chars).is_some()
    }

    /// The first `max_chars` characters of the content.
    pub fn content_preview(&self, max_chars: usize) -> String {
        self.content.chars().take(max_chars).collect()
    }
}
