//! DashScope Provider Implementation
//!
//! Calls the DashScope text-generation endpoint used for the qwen model
//! family. The API key is passed in explicitly; this module never reads the
//! process environment.
//!
//! # Examples
//!
//! ```no_run
//! use sheetlift_domain::{CompletionProvider, CompletionRequest, SamplingParams};
//! use sheetlift_llm::DashScopeProvider;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = DashScopeProvider::new("sk-...")?;
//! let request = CompletionRequest::single_turn("qwen-max", "Say hi", SamplingParams::DOCUMENT);
//! let response = provider.complete(&request)?;
//! # Ok(())
//! # }
//! ```

use crate::{blocking_runtime, LlmError};
use serde::{Deserialize, Serialize};
use sheetlift_domain::{CompletionProvider, CompletionRequest, Message, RawResponse};
use std::time::Duration;
use tracing::debug;

/// Default DashScope API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://dashscope.aliyuncs.com";

/// Default timeout for a generation request (120 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

const GENERATION_PATH: &str = "/api/v1/services/aigc/text-generation/generation";

/// DashScope text-generation provider
pub struct DashScopeProvider {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

/// Request body for the generation API
#[derive(Serialize)]
struct GenerationRequest<'a> {
    model: &'a str,
    input: GenerationInput<'a>,
    parameters: GenerationParameters,
}

#[derive(Serialize)]
struct GenerationInput<'a> {
    messages: &'a [Message],
}

#[derive(Serialize)]
struct GenerationParameters {
    result_format: &'static str,
    max_tokens: u32,
    temperature: f32,
}

impl<'a> From<&'a CompletionRequest> for GenerationRequest<'a> {
    fn from(request: &'a CompletionRequest) -> Self {
        Self {
            model: &request.model,
            input: GenerationInput {
                messages: &request.messages,
            },
            parameters: GenerationParameters {
                result_format: request.result_format.as_str(),
                max_tokens: request.params.max_tokens,
                temperature: request.params.temperature,
            },
        }
    }
}

/// Successful response from the generation API
#[derive(Deserialize)]
struct GenerationResponse {
    output: GenerationOutput,
    #[serde(default)]
    request_id: Option<String>,
}

#[derive(Deserialize)]
struct GenerationOutput {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    choices: Vec<GenerationChoice>,
}

#[derive(Deserialize)]
struct GenerationChoice {
    message: Message,
}

/// Error body returned with non-2xx statuses
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl DashScopeProvider {
    /// Create a provider against the public endpoint
    pub fn new(api_key: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_endpoint(DEFAULT_ENDPOINT, api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a provider against `endpoint` with a request timeout
    pub fn with_endpoint(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::Setup("DashScope API key is empty".to_string()));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key,
            client,
            runtime: blocking_runtime()?,
        })
    }

    /// Endpoint this provider talks to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, request: &CompletionRequest) -> Result<RawResponse, LlmError> {
        let url = format!("{}{}", self.endpoint, GENERATION_PATH);
        let body = GenerationRequest::from(request);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        interpret_response(status, &text)
    }
}

/// Turn an HTTP status and body into a `RawResponse`
fn interpret_response(status: u16, body: &str) -> Result<RawResponse, LlmError> {
    if (200..300).contains(&status) {
        let parsed: GenerationResponse = serde_json::from_str(body)
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        if let Some(id) = &parsed.request_id {
            debug!(request_id = %id, "DashScope generation succeeded");
        }

        let text = parsed
            .output
            .text
            .or_else(|| parsed.output.choices.into_iter().next().map(|c| c.message.content))
            .ok_or_else(|| LlmError::InvalidResponse("Response has no output text".to_string()))?;

        return Ok(RawResponse::success(text));
    }

    let message = match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            code: Some(code),
            message: Some(message),
        }) => format!("{}: {}", code, message),
        Ok(ErrorBody {
            message: Some(message),
            ..
        }) => message,
        Ok(ErrorBody { code: Some(code), .. }) => code,
        _ => body.trim().to_string(),
    };

    Ok(RawResponse::failure(status, message))
}

impl CompletionProvider for DashScopeProvider {
    type Error = LlmError;

    fn complete(&self, request: &CompletionRequest) -> Result<RawResponse, Self::Error> {
        self.runtime.block_on(self.send(request))
    }

    fn name(&self) -> &str {
        "dashscope"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetlift_domain::SamplingParams;

    #[test]
    fn test_request_body_shape() {
        let request =
            CompletionRequest::single_turn("qwen-max", "Extract: R1", SamplingParams::DOCUMENT);
        let body = serde_json::to_value(GenerationRequest::from(&request)).unwrap();

        assert_eq!(body["model"], "qwen-max");
        assert_eq!(body["input"]["messages"][0]["role"], "user");
        assert_eq!(body["input"]["messages"][0]["content"], "Extract: R1");
        assert_eq!(body["parameters"]["result_format"], "text");
        assert_eq!(body["parameters"]["max_tokens"], 2048);
    }

    #[test]
    fn test_interpret_success_text() {
        let body = concat!(
            r#"{"output":{"text":"```json\n{}\n```","finish_reason":"stop"},"#,
            r#""usage":{"input_tokens":3},"request_id":"abc"}"#
        );
        let response = interpret_response(200, body).unwrap();
        assert_eq!(response, RawResponse::success("```json\n{}\n```"));
    }

    #[test]
    fn test_interpret_success_message_format() {
        let body = r#"{"output":{"choices":[{"message":{"role":"assistant","content":"[1]"}}]}}"#;
        let response = interpret_response(200, body).unwrap();
        assert_eq!(response, RawResponse::success("[1]"));
    }

    #[test]
    fn test_interpret_success_without_text() {
        let body = r#"{"output":{}}"#;
        assert!(matches!(interpret_response(200, body), Err(LlmError::InvalidResponse(_))));
    }

    #[test]
    fn test_interpret_failure_body() {
        let body =
            r#"{"code":"InvalidApiKey","message":"Invalid API-key provided.","request_id":"x"}"#;
        let response = interpret_response(401, body).unwrap();
        assert_eq!(
            response,
            RawResponse::failure(401, "InvalidApiKey: Invalid API-key provided.")
        );
    }

    #[test]
    fn test_interpret_failure_unstructured_body() {
        let response = interpret_response(502, " Bad Gateway \n").unwrap();
        assert_eq!(response, RawResponse::failure(502, "Bad Gateway"));
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let result = DashScopeProvider::new("  ");
        assert!(matches!(result, Err(LlmError::Setup(_))));
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let provider = DashScopeProvider::with_endpoint(
            "http://localhost:9000/",
            "key",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(provider.endpoint(), "http://localhost:9000");
    }

    #[test]
    fn test_unreachable_endpoint_is_communication_error() {
        let provider = DashScopeProvider::with_endpoint(
            "http://127.0.0.1:9",
            "key",
            Duration::from_secs(2),
        )
        .unwrap();
        let request = CompletionRequest::single_turn("qwen-max", "hi", SamplingParams::DOCUMENT);

        let result = provider.complete(&request);
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }

    // Requires network access and a real key in DASHSCOPE_API_KEY
    #[test]
    #[ignore]
    fn test_dashscope_generate_integration() {
        let key = std::env::var("DASHSCOPE_API_KEY").unwrap_or_default();
        let provider = DashScopeProvider::new(key).unwrap();
        let request = CompletionRequest::single_turn(
            "qwen-max",
            "Reply with the JSON object {\"ok\": true} and nothing else",
            SamplingParams::DOCUMENT,
        );

        let response = provider.complete(&request).unwrap();
        assert!(response.is_success());
    }
}
