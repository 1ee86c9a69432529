//! OpenAI-compatible Text Generator
//!
//! Talks to any server exposing `POST {base_url}/chat/completions`
//! (OpenAI itself, vLLM, llama.cpp server, LM Studio). The prompt is sent
//! as a single user message.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

use super::{map_transport_error, GenerationRequest, LLMError, Result, TextGenerator};

pub struct OpenAICompatGenerator {
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: Client,
}

impl OpenAICompatGenerator {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LLMError::InvalidRequest(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
            client,
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAICompatGenerator {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let payload = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": request.prompt }],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });

        let mut builder = self.client.post(&url).json(&payload);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| map_transport_error(e, "OpenAI-compatible server", &self.base_url))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(LLMError::AuthenticationFailed(text));
            } else if status.as_u16() == 429 {
                return Err(LLMError::RateLimitExceeded);
            } else {
                return Err(LLMError::InvalidRequest(text));
            }
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LLMError::ParseError(e.to_string()))?;

        let choice = data
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .ok_or_else(|| LLMError::ParseError("No choices in response".to_string()))?;

        choice
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(str::to_string)
            .ok_or_else(|| LLMError::ParseError("Empty content".to_string()))
    }

    async fn check_health(&self) -> bool {
        let url = format!("{}/models", self.base_url);
        let mut builder = self.client.get(&url);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        matches!(builder.send().await, Ok(r) if r.status().is_success())
    }
}
