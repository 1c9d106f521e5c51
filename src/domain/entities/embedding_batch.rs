use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::BatchStatus;

/// The set of chunks produced by one document-processing run. All chunks of
/// the run share this batch's id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingBatch {
    id: Uuid,
    document_id: Uuid,
    status: BatchStatus,
    chunk_count: i32,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl EmbeddingBatch {
    pub fn new(document_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            status: BatchStatus::Pending,
            chunk_count: 0,
            error_message: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn restore(
        id: Uuid,
        document_id: Uuid,
        status: BatchStatus,
        chunk_count: i32,
        error_message: Option<String>,
        created_at: DateTime<Utc>,
        completed_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            document_id,
            status,
            chunk_count,
            error_message,
            created_at,
            completed_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn document_id(&self) -> Uuid {
        self.document_id
    }

    pub fn status(&self) -> BatchStatus {
        self.status
    }

    pub fn chunk_count(&self) -> i32 {
        self.chunk_count
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn complete(&mut self, chunk_count: i32) -> Result<(), String> {
        if !self.status.can_transition_to(&BatchStatus::Complete) {
            return Err(format!("Batch {} is already {}", self.id, self.status));
        }

        self.status = BatchStatus::Complete;
        self.chunk_count = chunk_count;
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    pub fn fail(&mut self, error: String) -> Result<(), String> {
        if !self.status.can_transition_to(&BatchStatus::Failed) {
            return Err(format!("Batch {} is already {}", self.id, self.status));
        }

        self.status = BatchStatus::Failed;
        self.error_message = Some(error);
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.status.is_complete()
    }

    pub fn processing_time_ms(&self) -> Option<i64> {
        self.completed_at
            .map(|completed| (completed - self.created_at).num_milliseconds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_creation() {
        let document_id = Uuid::new_v4();
        let batch = EmbeddingBatch::new(document_id);

        assert_eq!(batch.document_id(), document_id);
        assert_eq!(batch.status(), BatchStatus::Pending);
        assert_eq!(batch.chunk_count(), 0);
        assert!(batch.completed_at().is_none());
    }

    #[test]
    fn test_completion() {
        let mut batch = EmbeddingBatch::new(Uuid::new_v4());

        assert!(batch.complete(4).is_ok());
        assert!(batch.is_complete());
        assert_eq!(batch.chunk_count(), 4);
        assert!(batch.processing_time_ms().is_some());

        assert!(batch.fail("late failure".to_string()).is_err());
    }

    #[test]
    fn test_failure() {
        let mut batch = EmbeddingBatch::new(Uuid::new_v4());

        assert!(batch.fail("quota exceeded".to_string()).is_ok());
        assert_eq!(batch.status(), BatchStatus::Failed);
        assert_eq!(batch.error_message(), Some("quota exceeded"));

        assert!(batch.complete(1).is_err());
    }
}
