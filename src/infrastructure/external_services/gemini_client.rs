use async_trait::async_trait;
use pgvector::Vector;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::application::ports::embedding_provider::{
    EmbeddingProvider, EmbeddingProviderError, EmbeddingRequest, EmbeddingResponse,
};
use crate::application::ports::generation_provider::{
    GenerationProvider, GenerationProviderError, GenerationRequest, GenerationResponse,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_EMBEDDING_MODEL: &str = "models/text-embedding-004";
const DEFAULT_EMBEDDING_DIMENSION: usize = 768;

#[derive(Debug, Clone)]
pub struct GeminiClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub backoff_factor: f64,
}

impl Default for GeminiClientConfig {
    fn default() -> Self {
        dotenv::dotenv().ok();

        let embedding_dimension = env::var("EMBEDDING_DIMENSION")
            .ok()
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(DEFAULT_EMBEDDING_DIMENSION);

        Self {
            api_key: env::var("GOOGLE_API_KEY").unwrap_or_default(),
            base_url: env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            embedding_model: env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string()),
            embedding_dimension,
            timeout_secs: 90,
            max_retries: 3,
            initial_backoff_ms: 1000,
            backoff_factor: 1.5,
        }
    }
}

#[derive(Debug, Error)]
pub enum GeminiClientError {
    #[error("GOOGLE_API_KEY not set")]
    MissingApiKey,
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest<'a> {
    model: &'a str,
    content: Content<'a>,
    task_type: &'a str,
}

#[derive(Deserialize)]
struct EmbedContentResponse {
    embedding: Option<ContentEmbedding>,
}

#[derive(Deserialize)]
struct ContentEmbedding {
    #[serde(default)]
    values: Vec<f32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Client for the Gemini REST API, serving both embeddings and text
/// generation.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    config: GeminiClientConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiClientConfig) -> Result<Self, GeminiClientError> {
        if config.api_key.trim().is_empty() {
            return Err(GeminiClientError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self, GeminiClientError> {
        Self::new(GeminiClientConfig::default())
    }

    fn url(&self, resource: &str) -> String {
        format!(
            "{}/v1beta/{}",
            self.config.base_url.trim_end_matches('/'),
            resource
        )
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let factor = self.config.backoff_factor.powi(attempt as i32 - 1);
        Duration::from_millis((factor * self.config.initial_backoff_ms as f64) as u64)
    }

    async fn embed_once(&self, request: &EmbeddingRequest) -> Result<Vec<f32>, EmbeddingProviderError> {
        let body = EmbedContentRequest {
            model: &self.config.embedding_model,
            content: Content {
                parts: vec![Part { text: &request.text }],
            },
            task_type: request.task.as_str(),
        };

        let response = self
            .client
            .post(self.url(&format!("{}:embedContent", self.config.embedding_model)))
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmbeddingProviderError::NetworkError(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response).await;
            return Err(classify_embedding_status(status, message));
        }

        let parsed = response
            .json::<EmbedContentResponse>()
            .await
            .map_err(|e| EmbeddingProviderError::ApiError(e.to_string()))?;

        Ok(parsed.embedding.map(|e| e.values).unwrap_or_default())
    }
}

async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    match response.text().await {
        Ok(text) => serde_json::from_str::<ApiErrorBody>(&text)
            .map(|body| body.error.message)
            .unwrap_or(text),
        Err(_) => status.to_string(),
    }
}

fn classify_embedding_status(status: StatusCode, message: String) -> EmbeddingProviderError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => EmbeddingProviderError::RateLimitExceeded,
        s if s.is_server_error() => EmbeddingProviderError::ServiceUnavailable,
        StatusCode::BAD_REQUEST => EmbeddingProviderError::InvalidInput(message),
        _ => EmbeddingProviderError::ApiError(format!("{}: {}", status, message)),
    }
}

fn classify_generation_status(status: StatusCode, message: String) -> GenerationProviderError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => GenerationProviderError::RateLimited(message),
        StatusCode::NOT_FOUND => GenerationProviderError::ModelNotFound(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            GenerationProviderError::Unauthorized(message)
        }
        s if s.is_server_error() => GenerationProviderError::Unavailable(message),
        _ => GenerationProviderError::InvalidRequest(format!("{}: {}", status, message)),
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiClient {
    async fn generate_embedding(
        &self,
        request: EmbeddingRequest,
    ) -> Result<EmbeddingResponse, EmbeddingProviderError> {
        let mut attempts = 0;

        let values = loop {
            attempts += 1;

            match self.embed_once(&request).await {
                Ok(values) => break values,
                Err(e) if e.is_transient() && attempts <= self.config.max_retries => {
                    let delay = self.backoff(attempts);
                    warn!(attempt = attempts, error = %e, delay_ms = delay.as_millis() as u64, "embedding request failed, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        };

        if values.is_empty() {
            return Err(EmbeddingProviderError::ApiError(
                "No embedding values returned".to_string(),
            ));
        }

        Ok(EmbeddingResponse {
            embedding: Vector::from(values),
            model_name: self.config.embedding_model.clone(),
        })
    }

    fn model_name(&self) -> &str {
        &self.config.embedding_model
    }

    fn embedding_dimension(&self) -> usize {
        self.config.embedding_dimension
    }
}

#[async_trait]
impl GenerationProvider for GeminiClient {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, GenerationProviderError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: request.max_output_tokens,
                temperature: request.temperature,
            },
        };

        let response = self
            .client
            .post(self.url(&format!("models/{}:generateContent", request.model)))
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationProviderError::Timeout(Duration::from_secs(self.config.timeout_secs))
                } else {
                    GenerationProviderError::Network(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response).await;
            return Err(classify_generation_status(status, message));
        }

        let parsed = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| GenerationProviderError::Unavailable(format!("Malformed response: {}", e)))?;

        if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(GenerationProviderError::Blocked(reason));
        }

        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| GenerationProviderError::Blocked("No candidates returned".to_string()))?;

        let text: String = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "EMPTY".to_string());
            return Err(GenerationProviderError::Blocked(format!(
                "Empty response (finish reason {})",
                reason
            )));
        }

        debug!(model = %request.model, chars = text.len(), "generation response received");
        Ok(GenerationResponse {
            text,
            model: request.model,
        })
    }
}
