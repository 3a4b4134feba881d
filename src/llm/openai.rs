//! OpenAI chat-completions backend.
//!
//! Direct integration with the OpenAI API via `reqwest`. Handles bearer
//! authentication, retry with exponential backoff on rate limits and
//! server errors, and SSE parsing for streaming responses. The API key is
//! validated before any request is sent, so a missing credential surfaces
//! as a configuration error rather than a mid-conversation failure.

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{json, Value};

use crate::errors::{ConfigurationError, GenerationError};
use crate::llm::{ChunkStream, TextGeneration};

/// Environment variable consulted when no key is passed explicitly.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Default chat-completions endpoint base.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI chat-completions client.
#[derive(Debug, Clone)]
pub struct OpenAiChat {
    /// Model identifier, e.g. `gpt-4o`.
    pub model: String,
    /// API base URL, overridable for proxies.
    pub base_url: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Reply length cap.
    pub max_tokens: u32,
    /// Maximum retry attempts on retryable failures.
    pub max_retries: u32,
    /// Request timeout in seconds.
    pub timeout_secs: f64,
    api_key: Option<String>,
}

impl OpenAiChat {
    /// Create a client for `model`, reading the key from the environment
    /// when `api_key` is `None`.
    pub fn new(model: impl Into<String>, api_key: Option<String>) -> Self {
        let api_key = api_key.or_else(|| std::env::var(API_KEY_ENV).ok());
        Self {
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            max_retries: 3,
            timeout_secs: 120.0,
            api_key,
        }
    }

    /// Fail fast when no credential is configured.
    fn require_api_key(&self) -> Result<&str, ConfigurationError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(ConfigurationError::MissingApiKey { env_var: API_KEY_ENV })
    }

    /// Verify the backend is usable, for callers that want to refuse a
    /// request before assembling any prompt.
    pub fn ensure_configured(&self) -> Result<(), ConfigurationError> {
        self.require_api_key().map(|_| ())
    }

    fn request_body(&self, prompt: &str, stream: bool) -> Value {
        json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "stream": stream,
        })
    }

    fn client(&self) -> Result<reqwest::Client, GenerationError> {
        Ok(reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs_f64(self.timeout_secs))
            .build()?)
    }

    async fn send_with_retry(
        &self,
        body: &Value,
    ) -> Result<reqwest::Response, GenerationError> {
        let api_key = self.require_api_key()?.to_string();
        let endpoint = format!("{}/chat/completions", self.base_url);
        let client = self.client()?;

        let mut last_error = String::from("no attempt made");
        let mut retry_delay = std::time::Duration::from_secs(1);

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                log::warn!("openai: retry attempt {} after {:?}", attempt, retry_delay);
                tokio::time::sleep(retry_delay).await;
                retry_delay *= 2;
            }

            let response = match client
                .post(&endpoint)
                .header("Content-Type", "application/json")
                .header("Authorization", format!("Bearer {}", api_key))
                .json(body)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    last_error = e.to_string();
                    continue;
                }
            };

            let status = response.status();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                last_error = "rate limited (429)".to_string();
                continue;
            }
            if status.is_server_error() {
                last_error = format!("server error: {}", status);
                continue;
            }
            if status.is_client_error() {
                let text = response.text().await.unwrap_or_default();
                return Err(GenerationError::MalformedResponse {
                    message: format!("client error ({}): {}", status, text),
                });
            }
            return Ok(response);
        }

        Err(GenerationError::RetriesExhausted {
            attempts: self.max_retries + 1,
            message: last_error,
        })
    }
}

/// Pull the text deltas out of one SSE payload line.
///
/// Returns `None` for keep-alives, chunks without content, and the
/// terminal `[DONE]` marker.
fn parse_sse_delta(line: &str) -> Option<String> {
    let payload = line.strip_prefix("data:")?.trim();
    if payload.is_empty() || payload == "[DONE]" {
        return None;
    }
    let value: Value = serde_json::from_str(payload).ok()?;
    value["choices"][0]["delta"]["content"]
        .as_str()
        .map(str::to_string)
}

#[async_trait]
impl TextGeneration for OpenAiChat {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        log::debug!(
            "openai: generate, model={}, prompt_len={}",
            self.model,
            prompt.len()
        );
        let body = self.request_body(prompt, false);
        let response = self.send_with_retry(&body).await?;
        let payload: Value = response.json().await?;

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| GenerationError::MalformedResponse {
                message: format!(
                    "no message content in response: {}",
                    serde_json::to_string(&payload).unwrap_or_default()
                ),
            })
    }

    async fn generate_stream(&self, prompt: &str) -> Result<ChunkStream, GenerationError> {
        log::debug!(
            "openai: generate_stream, model={}, prompt_len={}",
            self.model,
            prompt.len()
        );
        let body = self.request_body(prompt, true);
        let response = self.send_with_retry(&body).await?;

        // SSE frames can split across network reads; carry the remainder
        // between chunks and only parse complete lines.
        let stream = response
            .bytes_stream()
            .scan(String::new(), |buffer, chunk| {
                let deltas = match chunk {
                    Ok(bytes) => {
                        buffer.push_str(&String::from_utf8_lossy(&bytes));
                        let mut out = Vec::new();
                        while let Some(pos) = buffer.find('\n') {
                            let line = buffer[..pos].trim_end_matches('\r').to_string();
                            buffer.drain(..=pos);
                            if let Some(delta) = parse_sse_delta(&line) {
                                out.push(Ok(delta));
                            }
                        }
                        out
                    }
                    Err(e) => vec![Err(GenerationError::Http(e))],
                };
                futures::future::ready(Some(futures::stream::iter(deltas)))
            })
            .flatten();

        Ok(Box::pin(stream))
    }
}
