//! Text Generation Abstraction Layer
//!
//! Every debate participant talks to its model through the [`TextGenerator`]
//! trait: one prompt string in, one completion string out. Backends are
//! selected by name from `[model]` in config.toml via [`build_generator`].
//!
//! Supported backends:
//! - `ollama`: a local Ollama server (`/api/generate`)
//! - `openai`: any OpenAI-compatible chat completions endpoint

use async_trait::async_trait;
use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::ModelConfig;

pub mod ollama;
pub mod openai;

pub use ollama::OllamaGenerator;
pub use openai::OpenAICompatGenerator;

/// Result type for generation calls
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur while generating text
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Timeout")]
    Timeout,

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<LLMError> for EngineError {
    fn from(err: LLMError) -> Self {
        match err {
            LLMError::Timeout => EngineError::LLMTimeout,
            other => EngineError::LLMProvider(other.to_string()),
        }
    }
}

/// A single completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Fully rendered prompt
    pub prompt: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            temperature,
            max_tokens,
        }
    }
}

/// Trait that all text-generation backends implement
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the backend name (e.g. "ollama")
    fn name(&self) -> &str;

    /// Generate a completion for the request
    ///
    /// # Returns
    /// * `Ok(String)` - The raw completion text
    /// * `Err(LLMError)` - If the backend fails
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;

    /// Check if the backend is reachable
    /// Default implementation returns true.
    async fn check_health(&self) -> bool {
        true
    }
}

/// Build the generator named by `[model].backend`
///
/// # Errors
///
/// Returns `EngineError::Config` for an unknown backend or when the HTTP
/// client cannot be constructed.
pub fn build_generator(config: &ModelConfig) -> std::result::Result<Arc<dyn TextGenerator>, EngineError> {
    let base_url = config.resolved_base_url();

    match config.backend.as_str() {
        "ollama" => {
            let generator = OllamaGenerator::new(base_url, &config.model_name, config.timeout_secs)
                .map_err(|e| EngineError::Config(e.to_string()))?;
            Ok(Arc::new(generator))
        }
        "openai" => {
            let api_key = std::env::var("OPENAI_API_KEY").ok();
            let generator = OpenAICompatGenerator::new(
                base_url,
                &config.model_name,
                api_key,
                config.timeout_secs,
            )
            .map_err(|e| EngineError::Config(e.to_string()))?;
            Ok(Arc::new(generator))
        }
        other => Err(EngineError::Config(format!(
            "Unsupported model backend: {}",
            other
        ))),
    }
}

/// Map a reqwest transport error onto an [`LLMError`]
pub(crate) fn map_transport_error(err: reqwest::Error, backend: &str, base_url: &str) -> LLMError {
    if err.is_timeout() {
        LLMError::Timeout
    } else if err.is_connect() {
        LLMError::ProviderUnavailable(format!(
            "Cannot connect to {} at {}. Is it running?",
            backend, base_url
        ))
    } else {
        LLMError::NetworkError(err.to_string())
    }
}
