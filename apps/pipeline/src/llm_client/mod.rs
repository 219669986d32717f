/// LLM Client: the single point of entry for text-completion calls in the pipeline.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// Callers depend on the `CompletionOracle` trait; `LlmClient` is its production backend.
///
/// Model: claude-sonnet-4-5 (hardcoded, not configurable)
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all oracle calls.
pub const MODEL: &str = "claude-sonnet-4-5";
const TEMPERATURE: f32 = 0.1;
/// One retry at most; extraction degrades to sentinels beyond that.
const MAX_ATTEMPTS: u32 = 2;
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Upper bound on one `complete` call: every attempt at the per-request timeout plus the
/// backoff between them.
pub fn call_budget(request_timeout: Duration) -> Duration {
    request_timeout * MAX_ATTEMPTS + RETRY_BACKOFF * (MAX_ATTEMPTS - 1)
}

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("Oracle returned empty content")]
    EmptyContent,

    #[error("Oracle call timed out after {0:?}")]
    Timeout(Duration),
}

/// Text-completion capability used for fields regex cannot recover.
#[async_trait]
pub trait CompletionOracle: Send + Sync {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, OracleError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Wraps the Anthropic Messages API with a per-request timeout and a single retry.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String, request_timeout: Duration) -> Result<Self, OracleError> {
        Ok(Self {
            client: Client::builder().timeout(request_timeout).build()?,
            api_key,
        })
    }

    /// Makes a raw call to the Messages API, returning the full response object.
    /// Retries once on 429, 5xx and transport errors.
    pub async fn call(
        &self,
        prompt: &str,
        system: &str,
        max_tokens: u32,
    ) -> Result<LlmResponse, OracleError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens,
            temperature: TEMPERATURE,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut last_error: Option<OracleError> = None;

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                warn!(
                    "Oracle call attempt {} failed, retrying after {}ms...",
                    attempt,
                    RETRY_BACKOFF.as_millis()
                );
                tokio::time::sleep(RETRY_BACKOFF).await;
            }

            let response = self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(OracleError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Oracle API returned {}: {}", status, body);
                last_error = Some(OracleError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<AnthropicError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(OracleError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.bytes().await?;
            let llm_response: LlmResponse = serde_json::from_slice(&body)?;

            debug!(
                "Oracle call succeeded: input_tokens={}, output_tokens={}",
                llm_response.usage.input_tokens, llm_response.usage.output_tokens
            );

            return Ok(llm_response);
        }

        Err(last_error.unwrap_or(OracleError::RateLimited {
            attempts: MAX_ATTEMPTS,
        }))
    }
}

#[async_trait]
impl CompletionOracle for LlmClient {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, OracleError> {
        let response = self
            .call(prompt, prompts::EXTRACTION_SYSTEM, max_tokens)
            .await?;
        response
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .ok_or(OracleError::EmptyContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_picks_first_text_block() {
        let response: LlmResponse = serde_json::from_str(
            r#"{
                "content": [
                    {"type": "tool_use"},
                    {"type": "text", "text": "Jane Roe"},
                    {"type": "text", "text": "ignored"}
                ],
                "usage": {"input_tokens": 120, "output_tokens": 3}
            }"#,
        )
        .unwrap();
        assert_eq!(response.text(), Some("Jane Roe"));
    }

    #[test]
    fn test_text_absent_without_text_block() {
        let response: LlmResponse = serde_json::from_str(
            r#"{"content": [], "usage": {"input_tokens": 1, "output_tokens": 0}}"#,
        )
        .unwrap();
        assert_eq!(response.text(), None);
    }

    #[test]
    fn test_request_carries_token_budget() {
        let body = AnthropicRequest {
            model: MODEL,
            max_tokens: 20,
            temperature: TEMPERATURE,
            system: prompts::EXTRACTION_SYSTEM,
            messages: vec![AnthropicMessage {
                role: "user",
                content: "hi",
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["max_tokens"], 20);
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn test_call_budget_leaves_room_for_the_retry() {
        let request_timeout = Duration::from_secs(20);
        let budget = call_budget(request_timeout);
        assert_eq!(budget, Duration::from_millis(40_500));
        assert!(budget >= request_timeout * MAX_ATTEMPTS + RETRY_BACKOFF);
    }

    #[test]
    fn test_api_error_body_parses() {
        let err: AnthropicError =
            serde_json::from_str(r#"{"error": {"type": "invalid_request_error", "message": "bad"}}"#)
                .unwrap();
        assert_eq!(err.error.message, "bad");
    }
}
