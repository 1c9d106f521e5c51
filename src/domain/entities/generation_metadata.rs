use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::{Citation, RetrievalResult};

/// What a caller learns about how an answer was produced. Stored alongside
/// chat history as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    pub citations: Vec<Citation>,
    pub retrieved_chunks: usize,
    pub documents_referenced: Vec<Uuid>,
    pub model_used: String,
}

impl GenerationMetadata {
    pub fn new(citations: Vec<Citation>, chunks: &[RetrievalResult], model_used: String) -> Self {
        Self {
            citations,
            retrieved_chunks: chunks.len(),
            documents_referenced: referenced_documents(chunks),
            model_used,
        }
    }
}

/// Distinct document ids among `chunks`, in first-seen order.
pub fn referenced_documents(chunks: &[RetrievalResult]) -> Vec<Uuid> {
    let mut documents: Vec<Uuid> = Vec::new();
    for chunk in chunks {
        if !documents.contains(&chunk.document_id) {
            documents.push(chunk.document_id);
        }
    }
    documents
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referenced_documents_are_deduplicated_in_order() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let chunks = vec![
            RetrievalResult::from_vector_search(second, "b".to_string(), 0.9),
            RetrievalResult::from_vector_search(first, "a".to_string(), 0.8),
            RetrievalResult::from_vector_search(second, "c".to_string(), 0.7),
        ];

        let metadata = GenerationMetadata::new(Vec::new(), &chunks, "model-a".to_string());

        assert_eq!(metadata.retrieved_chunks, 3);
        assert_eq!(metadata.documents_referenced, vec![second, first]);
    }
}
