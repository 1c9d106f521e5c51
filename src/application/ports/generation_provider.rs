use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Failure of a single generation call, tagged by class so callers can
/// tell a failing model apart from a request no model will accept.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationProviderError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Rate limit or quota exceeded: {0}")]
    RateLimited(String),
    #[error("Service unavailable: {0}")]
    Unavailable(String),
    #[error("Model not found: {0}")]
    ModelNotFound(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Response blocked: {0}")]
    Blocked(String),
}

impl GenerationProviderError {
    /// Transient failures are specific to one model or one moment; another
    /// candidate model may still answer.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GenerationProviderError::Timeout(_)
                | GenerationProviderError::RateLimited(_)
                | GenerationProviderError::Unavailable(_)
                | GenerationProviderError::ModelNotFound(_)
                | GenerationProviderError::Network(_)
        )
    }

    pub fn class(&self) -> &'static str {
        match self {
            GenerationProviderError::Timeout(_) => "timeout",
            GenerationProviderError::RateLimited(_) => "rate_limited",
            GenerationProviderError::Unavailable(_) => "unavailable",
            GenerationProviderError::ModelNotFound(_) => "model_not_found",
            GenerationProviderError::Network(_) => "network",
            GenerationProviderError::InvalidRequest(_) => "invalid_request",
            GenerationProviderError::Unauthorized(_) => "unauthorized",
            GenerationProviderError::Blocked(_) => "blocked",
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub model: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone)]
pub struct GenerationResponse {
    pub text: String,
    pub model: String,
}

#[async_trait]
pub trait GenerationProvider: Send + Sync {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, GenerationProviderError>;
}
