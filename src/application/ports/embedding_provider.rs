use async_trait::async_trait;
use pgvector::Vector;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum EmbeddingProviderError {
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Rate limit exceeded")]
    RateLimitExceeded,
    #[error("Service unavailable")]
    ServiceUnavailable,
}

impl EmbeddingProviderError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            EmbeddingProviderError::NetworkError(_)
                | EmbeddingProviderError::RateLimitExceeded
                | EmbeddingProviderError::ServiceUnavailable
        )
    }
}

/// What the vector will be used for; providers may embed documents and
/// queries differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingTask {
    RetrievalDocument,
    RetrievalQuery,
}

impl EmbeddingTask {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingTask::RetrievalDocument => "RETRIEVAL_DOCUMENT",
            EmbeddingTask::RetrievalQuery => "RETRIEVAL_QUERY",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmbeddingRequest {
    pub text: String,
    pub task: EmbeddingTask,
}

#[derive(Debug, Clone)]
pub struct EmbeddingResponse {
    pub embedding: Vector,
    pub model_name: String,
}

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn generate_embedding(
        &self,
        request: EmbeddingRequest,
    ) -> Result<EmbeddingResponse, EmbeddingProviderError>;

    fn model_name(&self) -> &str;

    /// Dimension the configured model is expected to produce.
    fn embedding_dimension(&self) -> usize;
}
