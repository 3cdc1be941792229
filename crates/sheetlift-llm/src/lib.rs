//! Sheetlift LLM Provider Layer
//!
//! Implementations of the `CompletionProvider` trait from `sheetlift-domain`.
//!
//! # Providers
//!
//! - `DashScopeProvider`: DashScope text-generation API (qwen models)
//! - `OllamaProvider`: Local Ollama chat API
//! - `MockProvider`: Deterministic mock for testing
//!
//! HTTP providers expose a blocking `complete` and drive the async `reqwest`
//! client on a private current-thread runtime. Do not call them from inside
//! another tokio runtime.
//!
//! # Examples
//!
//! ```
//! use sheetlift_domain::{CompletionProvider, CompletionRequest, RawResponse, SamplingParams};
//! use sheetlift_llm::MockProvider;
//!
//! let provider = MockProvider::new(r#"{"type": "resistor"}"#);
//! let request = CompletionRequest::single_turn("qwen-max", "prompt", SamplingParams::DOCUMENT);
//! let response = provider.complete(&request).unwrap();
//! assert_eq!(response, RawResponse::success(r#"{"type": "resistor"}"#));
//! ```

#![warn(missing_docs)]

pub mod dashscope;
pub mod ollama;

use sheetlift_domain::{CompletionProvider, CompletionRequest, RawResponse};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

pub use dashscope::DashScopeProvider;
pub use ollama::OllamaProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// The provider answered, but not in a shape we understand
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Provider could not be constructed
    #[error("Provider setup error: {0}")]
    Setup(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            LlmError::InvalidResponse(e.to_string())
        } else if e.is_builder() {
            LlmError::Setup(e.to_string())
        } else {
            LlmError::Communication(e.to_string())
        }
    }
}

/// Build the single-threaded runtime an HTTP provider blocks on
pub(crate) fn blocking_runtime() -> Result<tokio::runtime::Runtime, LlmError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| LlmError::Setup(format!("Failed to start runtime: {}", e)))
}

#[derive(Debug, Clone)]
enum MockReply {
    Respond(RawResponse),
    Error,
}

/// Mock completion provider for deterministic testing
///
/// Returns pre-configured responses without making any network calls and
/// records every request it receives.
///
/// # Examples
///
/// ```
/// use sheetlift_domain::{CompletionProvider, CompletionRequest, RawResponse, SamplingParams};
/// use sheetlift_llm::MockProvider;
///
/// let mut provider = MockProvider::new("[]");
/// provider.add_response_containing("bad.md", RawResponse::success("not json"));
///
/// let request = CompletionRequest::single_turn("m", "doc: bad.md", SamplingParams::DOCUMENT);
/// assert_eq!(provider.complete(&request).unwrap(), RawResponse::success("not json"));
/// assert_eq!(provider.call_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_reply: MockReply,
    exact: Arc<Mutex<HashMap<String, MockReply>>>,
    containing: Arc<Mutex<Vec<(String, MockReply)>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockProvider {
    /// Create a new MockProvider that answers every prompt with `text`
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_default(MockReply::Respond(RawResponse::success(text)))
    }

    /// Create a MockProvider that answers every prompt with a non-success status
    pub fn failing(status: u16, message: impl Into<String>) -> Self {
        Self::with_default(MockReply::Respond(RawResponse::failure(status, message)))
    }

    fn with_default(default_reply: MockReply) -> Self {
        Self {
            default_reply,
            exact: Arc::new(Mutex::new(HashMap::new())),
            containing: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a specific response for an exact prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: RawResponse) {
        guard(&self.exact).insert(prompt.into(), MockReply::Respond(response));
    }

    /// Add a response for any prompt containing `fragment`
    ///
    /// Rules are checked in insertion order after exact matches.
    pub fn add_response_containing(&mut self, fragment: impl Into<String>, response: RawResponse) {
        guard(&self.containing).push((fragment.into(), MockReply::Respond(response)));
    }

    /// Configure a transport error for any prompt containing `fragment`
    pub fn add_error_containing(&mut self, fragment: impl Into<String>) {
        guard(&self.containing).push((fragment.into(), MockReply::Error));
    }

    /// Get the number of times complete was called
    pub fn call_count(&self) -> usize {
        guard(&self.requests).len()
    }

    /// Every request received so far, oldest first
    pub fn requests(&self) -> Vec<CompletionRequest> {
        guard(&self.requests).clone()
    }

    /// The most recent request, if any
    pub fn last_request(&self) -> Option<CompletionRequest> {
        guard(&self.requests).last().cloned()
    }

    fn reply_for(&self, prompt: &str) -> MockReply {
        if let Some(reply) = guard(&self.exact).get(prompt) {
            return reply.clone();
        }
        guard(&self.containing)
            .iter()
            .find(|(fragment, _)| prompt.contains(fragment.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| self.default_reply.clone())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("{}")
    }
}

impl CompletionProvider for MockProvider {
    type Error = LlmError;

    fn complete(&self, request: &CompletionRequest) -> Result<RawResponse, Self::Error> {
        guard(&self.requests).push(request.clone());

        match self.reply_for(request.prompt().unwrap_or_default()) {
            MockReply::Respond(response) => Ok(response),
            MockReply::Error => Err(LlmError::Communication("Mock transport error".to_string())),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
