//! Read-only tunables shared by every request.
//!
//! Values come from the environment (a `.env` file is honoured) and fall back
//! to the defaults below.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RagSettings {
    /// Target words per chunk.
    pub chunk_size: usize,
    /// Words shared by consecutive chunks; always below `chunk_size`.
    pub chunk_overlap: usize,
    /// Minimum similarity for a vector-search hit. Lower favours recall.
    pub similarity_threshold: f32,
    pub retrieval_limit: i64,
    pub search_limit: i64,
    /// Documents at or below this many characters are skipped by the
    /// retrieval fallback.
    pub fallback_min_content_chars: usize,
    pub fallback_max_chars: usize,
    pub fallback_similarity: f32,
    pub llm_model: String,
    pub llm_fallback_models: Vec<String>,
    pub max_output_tokens: u32,
    pub temperature: f32,
    /// Upper bound for one model attempt.
    pub generation_timeout: Duration,
    pub snippet_max_chars: usize,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            chunk_overlap: 50,
            similarity_threshold: 0.5,
            retrieval_limit: 5,
            search_limit: 10,
            fallback_min_content_chars: 100,
            fallback_max_chars: 2000,
            fallback_similarity: 0.5,
            llm_model: "gemini-2.0-flash-exp".to_string(),
            llm_fallback_models: vec![
                "gemini-1.5-flash".to_string(),
                "gemini-1.5-flash-8b".to_string(),
                "gemini-1.5-pro".to_string(),
            ],
            max_output_tokens: 8192,
            temperature: 0.7,
            generation_timeout: Duration::from_secs(60),
            snippet_max_chars: 500,
        }
    }
}

impl RagSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any key/value source, applying defaults for
    /// missing keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let llm_fallback_models = match lookup("LLM_FALLBACK_MODELS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|model| !model.is_empty())
                .map(str::to_string)
                .collect(),
            None => defaults.llm_fallback_models,
        };

        let settings = Self {
            chunk_size: parse_or(&lookup, "CHUNK_SIZE", defaults.chunk_size)?,
            chunk_overlap: parse_or(&lookup, "CHUNK_OVERLAP", defaults.chunk_overlap)?,
            similarity_threshold: parse_or(
                &lookup,
                "SIMILARITY_THRESHOLD",
                defaults.similarity_threshold,
            )?,
            retrieval_limit: parse_or(&lookup, "RETRIEVAL_LIMIT", defaults.retrieval_limit)?,
            search_limit: parse_or(&lookup, "SEARCH_LIMIT", defaults.search_limit)?,
            fallback_min_content_chars: parse_or(
                &lookup,
                "FALLBACK_MIN_CONTENT_CHARS",
                defaults.fallback_min_content_chars,
            )?,
            fallback_max_chars: parse_or(&lookup, "FALLBACK_MAX_CHARS", defaults.fallback_max_chars)?,
            fallback_similarity: parse_or(
                &lookup,
                "FALLBACK_SIMILARITY",
                defaults.fallback_similarity,
            )?,
            llm_model: lookup("LLM_MODEL")
                .map(|model| model.trim().to_string())
                .unwrap_or(defaults.llm_model),
            llm_fallback_models,
            max_output_tokens: parse_or(&lookup, "MAX_OUTPUT_TOKENS", defaults.max_output_tokens)?,
            temperature: parse_or(&lookup, "TEMPERATURE", defaults.temperature)?,
            generation_timeout: Duration::from_secs(parse_or(
                &lookup,
                "GENERATION_TIMEOUT_SECS",
                defaults.generation_timeout.as_secs(),
            )?),
            snippet_max_chars: parse_or(&lookup, "SNIPPET_MAX_CHARS", defaults.snippet_max_chars)?,
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid("chunk_size must be positive".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(ConfigError::Invalid(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ConfigError::Invalid(format!(
                "similarity_threshold must be within [0, 1], got {}",
                self.similarity_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.fallback_similarity) {
            return Err(ConfigError::Invalid(format!(
                "fallback_similarity must be within [0, 1], got {}",
                self.fallback_similarity
            )));
        }
        if self.fallback_max_chars == 0 || self.snippet_max_chars == 0 {
            return Err(ConfigError::Invalid(
                "fallback and snippet character caps must be positive".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Invalid(format!(
                "temperature must be within [0, 2], got {}",
                self.temperature
            )));
        }
        if self.max_output_tokens == 0 {
            return Err(ConfigError::Invalid(
                "max_output_tokens must be positive".to_string(),
            ));
        }
        if self.retrieval_limit <= 0 || self.search_limit <= 0 {
            return Err(ConfigError::Invalid(
                "retrieval and search limits must be positive".to_string(),
            ));
        }
        if self.candidate_models().is_empty() {
            return Err(ConfigError::Invalid(
                "at least one generation model is required".to_string(),
            ));
        }
        if self.generation_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "generation timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Primary model first, then the fallbacks, without duplicates.
    pub fn candidate_models(&self) -> Vec<String> {
        let mut models: Vec<String> = Vec::new();
        for model in std::iter::once(&self.llm_model).chain(self.llm_fallback_models.iter()) {
            if !model.is_empty() && !models.contains(model) {
                models.push(model.clone());
            }
        }
        models
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue {
                key,
                value: raw.clone(),
                reason: e.to_string(),
            }),
        None => Ok(default),
    }
}
