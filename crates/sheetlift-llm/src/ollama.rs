//! Ollama Provider Implementation
//!
//! Provides integration with Ollama's local chat API, a drop-in substitute
//! for the hosted provider when documents must not leave the machine.
//!
//! # Features
//!
//! - Configurable endpoint, model comes from each request
//! - Request timeout
//! - Maps `max_tokens` to Ollama's `num_predict`
//!
//! # Examples
//!
//! ```no_run
//! use sheetlift_llm::OllamaProvider;
//!
//! // Create an Ollama provider
//! let provider = OllamaProvider::default_endpoint().unwrap();
//! ```

use crate::{blocking_runtime, LlmError};
use serde::{Deserialize, Serialize};
use sheetlift_domain::{CompletionProvider, CompletionRequest, Message, RawResponse};
use std::time::Duration;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for LLM requests; local models on large prompts are slow
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Ollama API provider for local LLM inference
pub struct OllamaProvider {
    endpoint: String,
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

/// Request body for Ollama chat API
#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

/// Response from Ollama chat API
#[derive(Deserialize)]
struct OllamaChatResponse {
    message: Message,
    #[allow(dead_code)]
    #[serde(default)]
    done: bool,
}

#[derive(Deserialize)]
struct OllamaErrorBody {
    error: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `timeout`: per-request timeout
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            client,
            runtime: blocking_runtime()?,
        })
    }

    /// Create a new Ollama provider on `http://localhost:11434`
    pub fn default_endpoint() -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    async fn chat(&self, request: &CompletionRequest) -> Result<RawResponse, LlmError> {
        let url = format!("{}/api/chat", self.endpoint);

        let body = OllamaChatRequest {
            model: &request.model,
            messages: &request.messages,
            stream: false,
            options: OllamaOptions {
                temperature: request.params.temperature,
                num_predict: request.params.max_tokens,
            },
        };

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();

        if status.is_success() {
            let chat = response.json::<OllamaChatResponse>().await.map_err(|e| {
                LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
            })?;
            return Ok(RawResponse::success(chat.message.content));
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = serde_json::from_str::<OllamaErrorBody>(&error_text)
            .map(|body| body.error)
            .unwrap_or(error_text);

        Ok(RawResponse::failure(status.as_u16(), message))
    }
}

impl CompletionProvider for OllamaProvider {
    type Error = LlmError;

    fn complete(&self, request: &CompletionRequest) -> Result<RawResponse, Self::Error> {
        self.runtime.block_on(self.chat(request))
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetlift_domain::SamplingParams;

    #[test]
    fn test_ollama_provider_creation() {
        let provider =
            OllamaProvider::new("http://localhost:11434/", Duration::from_secs(5)).unwrap();
        assert_eq!(provider.endpoint, "http://localhost:11434");
    }

    #[test]
    fn test_ollama_provider_default_endpoint() {
        let provider = OllamaProvider::default_endpoint().unwrap();
        assert_eq!(provider.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_chat_body_maps_sampling_params() {
        let request = CompletionRequest::single_turn("llama3", "hello", SamplingParams::AGGREGATE);
        let body = OllamaChatRequest {
            model: &request.model,
            messages: &request.messages,
            stream: false,
            options: OllamaOptions {
                temperature: request.params.temperature,
                num_predict: request.params.max_tokens,
            },
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "llama3");
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 8192);
        assert_eq!(json["messages"][0]["content"], "hello");
    }

    #[test]
    fn test_ollama_error_handling() {
        // Nothing listens on the discard port
        let provider = OllamaProvider::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let request = CompletionRequest::single_turn("llama3", "test", SamplingParams::DOCUMENT);

        match provider.complete(&request) {
            Err(LlmError::Communication(_)) => {} // Expected
            other => panic!("Expected Communication error, got {:?}", other),
        }
    }

    // Integration tests (requires running Ollama)
    #[test]
    #[ignore] // Only run when Ollama is available
    fn test_ollama_chat_integration() {
        let provider = OllamaProvider::default_endpoint().unwrap();
        let request = CompletionRequest::single_turn(
            "llama3",
            "Say 'hello' and nothing else",
            SamplingParams::DOCUMENT,
        );

        let response = provider.complete(&request).unwrap();
        assert!(response.is_success());
    }
}
