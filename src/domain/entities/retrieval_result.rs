use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a retrieval result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalSource {
    VectorSearch,
    DocumentFallback,
}

/// A passage handed to the context assembler. Produced per request, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub document_id: Uuid,
    pub content: String,
    /// Normalized to `0.0..=1.0`, higher is more similar.
    pub similarity: f32,
    pub source: RetrievalSource,
}

impl RetrievalResult {
    pub fn from_vector_search(document_id: Uuid, content: String, similarity: f32) -> Self {
        Self {
            document_id,
            content,
            similarity: similarity.clamp(0.0, 1.0),
            source: RetrievalSource::VectorSearch,
        }
    }

    pub fn from_fallback(document_id: Uuid, content: String, similarity: f32) -> Self {
        Self {
            document_id,
            content,
            similarity: similarity.clamp(0.0, 1.0),
            source: RetrievalSource::DocumentFallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == RetrievalSource::DocumentFallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scores_stay_normalized() {
        let id = Uuid::new_v4();

        assert_eq!(RetrievalResult::from_fallback(id, String::new(), 1.7).similarity, 1.0);
        assert_eq!(RetrievalResult::from_fallback(id, String::new(), -0.2).similarity, 0.0);
        assert_eq!(RetrievalResult::from_vector_search(id, String::new(), 1.2).similarity, 1.0);
        assert!((RetrievalResult::from_fallback(id, String::new(), 0.5).similarity - 0.5).abs() < f32::EPSILON);
    }
}
