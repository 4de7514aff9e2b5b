//! HTTP client for OpenAI-compatible `chat/completions` endpoints.
//!
//! Wraps `reqwest` with bearer-key handling, typed status errors, and
//! retry with back-off. The only thing callers get back is the text of the
//! first choice; interpreting it is their job.

use std::time::Duration;

use async_trait::async_trait;
use comparador_core::LlmConfig;
use reqwest::{Client, Url};

use crate::error::LlmError;
use crate::retry::retry_with_backoff;
use crate::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ChatRole, Prompt};
use crate::TextGenerator;

/// Client for a chat-completions endpoint.
///
/// Build it from [`LlmConfig`]; point `base_url` at a mock server in tests.
pub struct ChatCompletionsClient {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    max_retries: u32,
    retry_backoff_ms: u64,
}

impl ChatCompletionsClient {
    /// Creates a client from the configured endpoint, model, and retry policy.
    ///
    /// # Errors
    ///
    /// - [`LlmError::Http`] if the underlying `reqwest::Client` cannot be built.
    /// - [`LlmError::InvalidBaseUrl`] if `base_url` is not a valid URL.
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("comparador/0.1 (price-comparison)")
            .build()?;

        let endpoint = Self::endpoint_url(&config.base_url)?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_retries: config.max_retries,
            retry_backoff_ms: config.retry_backoff_ms,
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Resolves `<base_url>/chat/completions`, tolerating a trailing slash.
    fn endpoint_url(base_url: &str) -> Result<Url, LlmError> {
        let joined = format!("{}/chat/completions", base_url.trim_end_matches('/'));
        Url::parse(&joined).map_err(|e| LlmError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })
    }

    async fn complete_once(&self, prompt: &Prompt) -> Result<String, LlmError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: ChatRole::System,
                    content: &prompt.system,
                },
                ChatMessage {
                    role: ChatRole::User,
                    content: &prompt.user,
                },
            ],
            temperature: self.temperature,
            max_tokens: prompt.max_tokens.unwrap_or(self.max_tokens),
        };

        let mut builder = self.client.post(self.endpoint.clone()).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(LlmError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::UnexpectedStatus {
                status: status.as_u16(),
                body: body.chars().take(512).collect(),
            });
        }

        let body = response.text().await?;
        let parsed: ChatCompletionResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::Deserialize {
                context: format!("chat completion from {}", self.endpoint),
                source: e,
            })?;

        parsed.first_content().ok_or(LlmError::EmptyCompletion)
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsClient {
    async fn generate(&self, prompt: &Prompt) -> Result<String, LlmError> {
        let text = retry_with_backoff(self.max_retries, self.retry_backoff_ms, || {
            self.complete_once(prompt)
        })
        .await?;
        tracing::debug!(
            model = %self.model,
            chars = text.len(),
            "text generation completed"
        );
        Ok(text)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
