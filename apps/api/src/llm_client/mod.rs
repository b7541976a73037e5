/// LLM Client: the single point of entry for all text-generation calls.
///
/// No other module may call the provider directly. Generation code talks to the
/// `TextCompleter` trait so the provider can be swapped (and scripted in tests).
///
/// Contract: `complete` never fails. Provider failures come back as a string of
/// the form `"Error: <cause>"`, which callers embed in their output as-is.
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[cfg(test)]
pub mod testing;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
/// The model used for all completion calls.
pub const MODEL: &str = "gpt-4o";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Prefix marking a failed completion inside otherwise normal output.
pub const ERROR_PREFIX: &str = "Error: ";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl LlmError {
    /// Whether the provider asked us to slow down.
    pub fn is_rate_limit(&self) -> bool {
        match self {
            LlmError::Api { status, .. } if *status == StatusCode::TOO_MANY_REQUESTS.as_u16() => {
                true
            }
            LlmError::RateLimited { .. } => false,
            other => other.to_string().to_lowercase().contains("rate limit"),
        }
    }
}

pub fn error_sentinel(cause: impl Display) -> String {
    format!("{ERROR_PREFIX}{cause}")
}

pub fn is_error_sentinel(text: &str) -> bool {
    text.starts_with(ERROR_PREFIX)
}

/// Produces text for a prompt. Implementations must not panic or raise;
/// failures are reported through an `"Error: ..."` string.
#[async_trait]
pub trait TextCompleter: Send + Sync {
    async fn complete(&self, prompt: &str) -> String;
}

// ────────────────────────────────────────────────────────────────────────────
// Retry
// ────────────────────────────────────────────────────────────────────────────

/// Bounded retry for rate-limited calls. Delay doubles after every attempt.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_millis(base_delay_ms),
        }
    }

    fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(1u32 << attempt.saturating_sub(1).min(16))
    }
}

/// Runs `op` until it succeeds, fails with something other than a rate limit,
/// or the attempt budget is spent.
pub async fn retry_on_rate_limit<F, Fut>(policy: RetryPolicy, mut op: F) -> Result<String, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, LlmError>>,
{
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match op().await {
            Err(e) if e.is_rate_limit() => {
                if attempt == max_attempts {
                    break;
                }
                let delay = policy.delay_after(attempt);
                warn!(
                    "Completion rate limited (attempt {}/{}), retrying after {}ms",
                    attempt,
                    max_attempts,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
            other => return other,
        }
    }

    Err(LlmError::RateLimited {
        attempts: max_attempts,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// OpenAI chat completions
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Text of the first choice, if the provider returned any.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Chat-completions client with rate-limit back-off.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    retry: RetryPolicy,
}

impl LlmClient {
    pub fn new(api_key: String, retry: RetryPolicy) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            api_key,
            retry,
        })
    }

    /// One round trip to the provider. No retry here.
    async fn call(&self, prompt: &str) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response.json().await?;
        if let Some(usage) = &chat.usage {
            debug!(
                "Completion succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        chat.text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

#[async_trait]
impl TextCompleter for LlmClient {
    async fn complete(&self, prompt: &str) -> String {
        match retry_on_rate_limit(self.retry, || self.call(prompt)).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Completion failed: {e}");
                error_sentinel(e)
            }
        }
    }
}
