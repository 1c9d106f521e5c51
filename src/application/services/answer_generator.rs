use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::application::ports::generation_provider::{
    GenerationProvider, GenerationProviderError, GenerationRequest,
};
use crate::config::RagSettings;
use crate::domain::entities::Citation;

static CITATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[Document: ([^\]]+)\]").expect("citation pattern is a valid regex")
});

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("No candidate models configured")]
    NoCandidates,
    #[error("Model {model} rejected the request: {source}")]
    Permanent {
        model: String,
        source: GenerationProviderError,
    },
    #[error("All {attempts} candidate models failed; last error from {last_model}: {last_error}")]
    AllModelsFailed {
        attempts: usize,
        last_model: String,
        last_error: GenerationProviderError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub candidate_models: Vec<String>,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub attempt_timeout: Duration,
}

impl GenerationSettings {
    pub fn from_settings(settings: &RagSettings) -> Self {
        Self {
            candidate_models: settings.candidate_models(),
            max_output_tokens: settings.max_output_tokens,
            temperature: settings.temperature,
            attempt_timeout: settings.generation_timeout,
        }
    }
}

/// The outcome of one successful generation, including which model
/// produced it. Returned per call; nothing about it is kept on the
/// generator.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedAnswer {
    pub text: String,
    pub citations: Vec<Citation>,
    pub model_used: String,
    pub attempts: usize,
}

pub struct AnswerGenerator {
    provider: Arc<dyn GenerationProvider>,
    settings: GenerationSettings,
}

impl AnswerGenerator {
    pub fn new(provider: Arc<dyn GenerationProvider>, settings: GenerationSettings) -> Self {
        Self { provider, settings }
    }

    pub fn candidate_models(&self) -> &[String] {
        &self.settings.candidate_models
    }

    /// Tries each candidate model in order until one answers.
    ///
    /// Transient failures (timeouts, quota, unavailable or unknown models,
    /// network) move on to the next model. Anything else is returned at once.
    #[instrument(skip_all, fields(candidates = self.settings.candidate_models.len()))]
    pub async fn generate(
        &self,
        question: &str,
        context: &str,
    ) -> Result<GeneratedAnswer, GenerationError> {
        let prompt = build_prompt(question, context);
        let mut last_failure: Option<(String, GenerationProviderError)> = None;

        for (index, model) in self.settings.candidate_models.iter().enumerate() {
            let attempt = index + 1;
            debug!(model = %model, attempt, "trying generation model");

            match self.attempt(model, &prompt).await {
                Ok(text) => {
                    info!(model = %model, attempt, "generation succeeded");
                    return Ok(GeneratedAnswer {
                        citations: extract_citations(&text),
                        text,
                        model_used: model.clone(),
                        attempts: attempt,
                    });
                }
                Err(failure) if failure.is_transient() => {
                    warn!(
                        model = %model,
                        attempt,
                        class = failure.class(),
                        error = %failure,
                        "generation attempt failed, trying next model"
                    );
                    last_failure = Some((model.clone(), failure));
                }
                Err(failure) => {
                    error!(
                        model = %model,
                        class = failure.class(),
                        error = %failure,
                        "generation request rejected"
                    );
                    return Err(GenerationError::Permanent {
                        model: model.clone(),
                        source: failure,
                    });
                }
            }
        }

        match last_failure {
            Some((last_model, last_error)) => {
                error!(attempts = self.settings.candidate_models.len(), "all generation models failed");
                Err(GenerationError::AllModelsFailed {
                    attempts: self.settings.candidate_models.len(),
                    last_model,
                    last_error,
                })
            }
            None => Err(GenerationError::NoCandidates),
        }
    }

    async fn attempt(&self, model: &str, prompt: &str) -> Result<String, GenerationProviderError> {
        let request = GenerationRequest {
            prompt: prompt.to_string(),
            model: model.to_string(),
            max_output_tokens: self.settings.max_output_tokens,
            temperature: self.settings.temperature,
        };

        match tokio::time::timeout(self.settings.attempt_timeout, self.provider.generate(request)).await {
            Ok(result) => result.map(|response| response.text),
            Err(_) => Err(GenerationProviderError::Timeout(self.settings.attempt_timeout)),
        }
    }
}

pub fn build_prompt(question: &str, context: &str) -> String {
    format!(
        "You are an AI assistant helping users understand and analyze their documents. \
Based on the provided context from the user's documents, answer the following question.

IMPORTANT INSTRUCTIONS:
1. Only use information from the provided context
2. If you cannot answer based on the context, say so clearly
3. Include citations in your response using this format: [Document: filename]
4. Be accurate and concise
5. If referencing specific information, cite the source document

CONTEXT:
{context}

QUESTION: {question}

RESPONSE:"
    )
}

/// Every `[Document: <name>]` in `text`, in order of appearance.
pub fn extract_citations(text: &str) -> Vec<Citation> {
    CITATION_PATTERN
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .map(|reference| Citation::document(reference.as_str().trim()))
        .collect()
}
