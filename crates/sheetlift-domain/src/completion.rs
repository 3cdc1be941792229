//! Completion request and response types
//!
//! A request is always single-turn: one user message carrying the resolved
//! prompt. The response keeps the provider's text untouched; cleanup happens
//! later in the extraction pipeline.

use serde::{Deserialize, Serialize};

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions
    System,
    /// End-user content (the prompt)
    User,
    /// Model output
    Assistant,
}

impl Role {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message author
    pub role: Role,
    /// Text content
    pub content: String,
}

impl Message {
    /// Create a user-role message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Shape the provider should answer in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultFormat {
    /// Plain text in a single `text` field
    #[default]
    Text,
    /// Chat-style `message` objects
    Message,
}

impl ResultFormat {
    /// Wire name of the format
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultFormat::Text => "text",
            ResultFormat::Message => "message",
        }
    }
}

/// Output bound and randomness for one call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    /// Maximum number of output tokens
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl SamplingParams {
    /// Parameters for extracting from a single document
    pub const DOCUMENT: SamplingParams = SamplingParams {
        max_tokens: 2048,
        temperature: 0.7,
    };

    /// Parameters for the aggregation pass, which merges many prior results
    pub const AGGREGATE: SamplingParams = SamplingParams {
        max_tokens: 8192,
        temperature: 0.6,
    };
}

/// A single-turn completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model identifier, e.g. `qwen-max`
    pub model: String,
    /// Conversation; always exactly one user message in this system
    pub messages: Vec<Message>,
    /// Desired result format
    pub result_format: ResultFormat,
    /// Output bound and temperature
    pub params: SamplingParams,
}

impl CompletionRequest {
    /// Build a request carrying `prompt` as the only user message
    pub fn single_turn(
        model: impl Into<String>,
        prompt: impl Into<String>,
        params: SamplingParams,
    ) -> Self {
        Self {
            model: model.into(),
            messages: vec![Message::user(prompt)],
            result_format: ResultFormat::Text,
            params,
        }
    }

    /// Text of the first user message, if any
    pub fn prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// Verbatim provider answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawResponse {
    /// The provider produced output text
    Success {
        /// Unmodified output text
        text: String,
    },
    /// The provider answered with a non-success status
    Failure {
        /// Status code reported by the provider (HTTP status for HTTP providers)
        status: u16,
        /// Provider message explaining the failure
        message: String,
    },
}

impl RawResponse {
    /// Successful response with `text`
    pub fn success(text: impl Into<String>) -> Self {
        RawResponse::Success { text: text.into() }
    }

    /// Failed response with `status` and `message`
    pub fn failure(status: u16, message: impl Into<String>) -> Self {
        RawResponse::Failure {
            status,
            message: message.into(),
        }
    }

    /// Whether the provider reported success
    pub fn is_success(&self) -> bool {
        matches!(self, RawResponse::Success { .. })
    }
}
