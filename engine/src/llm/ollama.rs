//! Ollama Text Generator
//!
//! This module implements the TextGenerator trait for Ollama, a local LLM server.
//! Ollama runs models on the user's machine, typically at http://localhost:11434.
//!
//! Key features:
//! - Local execution (no API keys required)
//! - Non-streaming `/api/generate` completions
//! - Temperature and token budget passed through `options`
//! - Health check via `/api/tags`

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{map_transport_error, GenerationRequest, LLMError, Result, TextGenerator};

/// Ollama generator configuration
#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    /// Base URL for Ollama API (typically http://localhost:11434)
    base_url: String,

    /// Model name to use (e.g., "llama3.1:8b")
    model: String,

    /// HTTP client for API requests
    client: Client,
}

impl OllamaGenerator {
    /// Create a new Ollama generator
    ///
    /// # Arguments
    /// * `base_url` - Base URL for Ollama API (e.g., "http://localhost:11434")
    /// * `model` - Model name to use (e.g., "llama3.1:8b")
    /// * `timeout_secs` - Per-request timeout
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LLMError::InvalidRequest(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
        })
    }

    /// Model this generator targets
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        tracing::debug!(
            "Ollama request: model={}, prompt_chars={}, temperature={}, max_tokens={}",
            self.model,
            request.prompt.len(),
            request.temperature,
            request.max_tokens
        );

        let body = OllamaRequest {
            model: &self.model,
            prompt: &request.prompt,
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };

        let url = format!("{}/api/generate", self.base_url);
        let start = std::time::Instant::now();
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_transport_error(e, "Ollama", &self.base_url))?;

        tracing::debug!(
            "Ollama response received in {:.1}s",
            start.elapsed().as_secs_f64()
        );

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LLMError::ProviderUnavailable(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let ollama_response: OllamaResponse = response
            .json()
            .await
            .map_err(|e| LLMError::ParseError(format!("Failed to parse Ollama response: {}", e)))?;

        Ok(ollama_response.response)
    }

    async fn check_health(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Ollama health check failed: {}", e);
                false
            }
        }
    }
}

/// Ollama API request format
#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

/// Sampling options
#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

/// Ollama API response format
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
}
