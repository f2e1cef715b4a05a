//! Anthropic Messages API client shared by the CV analyzer and the scorer.
//!
//! Each request carries one system prompt and one user prompt and expects a JSON
//! document back. Rate limiting, server errors and transport timeouts are retried
//! up to the configured number of attempts, waiting `retry_delay` between tries;
//! every other failure is returned at once.
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_OUTPUT_TOKENS: u32 = 4096;

/// Upper bound accepted for `LLM_MAX_ATTEMPTS`.
pub const MAX_ATTEMPTS: u32 = 5;
const FIRST_RETRY_DELAY: Duration = Duration::from_millis(500);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(8);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request to the LLM failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM API answered {status}: {message}")]
    Api { status: u16, message: String },

    #[error("LLM output is not the expected JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM answered without any text")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [UserMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl MessagesResponse {
    fn first_text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text.as_deref())
    }
}

/// Outcome of a failed attempt: whether another attempt may succeed.
enum Failure {
    Transient(LlmError),
    Fatal(LlmError),
}

#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    max_attempts: u32,
}

impl LlmClient {
    /// `max_attempts` is clamped to `1..=MAX_ATTEMPTS`; 1 means no retry.
    pub fn new(api_key: String, timeout: Duration, max_attempts: u32) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            max_attempts: max_attempts.clamp(1, MAX_ATTEMPTS),
        })
    }

    /// Sends the prompts and decodes the model's text answer as JSON, tolerating a
    /// surrounding markdown code fence.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<T, LlmError> {
        let response = self.send(prompt, system).await?;
        let text = response.first_text().ok_or(LlmError::EmptyContent)?;
        Ok(serde_json::from_str(unfence(text))?)
    }

    async fn send(&self, prompt: &str, system: &str) -> Result<MessagesResponse, LlmError> {
        let request = MessagesRequest {
            model: MODEL,
            max_tokens: MAX_OUTPUT_TOKENS,
            system,
            messages: [UserMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut attempt = 1;
        loop {
            match self.send_once(&request).await {
                Ok(response) => return Ok(response),
                Err(Failure::Fatal(err)) => return Err(err),
                Err(Failure::Transient(err)) if attempt >= self.max_attempts => return Err(err),
                Err(Failure::Transient(err)) => {
                    let delay = retry_delay(attempt);
                    warn!(
                        "LLM attempt {attempt}/{} failed ({err}), retrying in {}ms",
                        self.max_attempts,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn send_once(&self, request: &MessagesRequest<'_>) -> Result<MessagesResponse, Failure> {
        let response = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    Failure::Transient(e.into())
                } else {
                    Failure::Fatal(e.into())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            let err = LlmError::Api {
                status: status.as_u16(),
                message,
            };
            return Err(if is_transient(status) {
                Failure::Transient(err)
            } else {
                Failure::Fatal(err)
            });
        }

        let decoded: MessagesResponse = response
            .json()
            .await
            .map_err(|e| Failure::Fatal(e.into()))?;
        if let Some(usage) = &decoded.usage {
            debug!(
                "LLM answered ({} tokens in, {} out)",
                usage.input_tokens, usage.output_tokens
            );
        }
        Ok(decoded)
    }
}

fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Wait before attempt `attempt + 1`: doubles from `FIRST_RETRY_DELAY`, capped at
/// `MAX_RETRY_DELAY`.
fn retry_delay(attempt: u32) -> Duration {
    let factor = 1u32
        .checked_shl(attempt.saturating_sub(1))
        .unwrap_or(u32::MAX);
    FIRST_RETRY_DELAY
        .saturating_mul(factor)
        .min(MAX_RETRY_DELAY)
}

/// Removes a markdown code fence (```` ``` ```` or ```` ```json ````) around `text`.
fn unfence(text: &str) -> &str {
    let text = text.trim();
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
