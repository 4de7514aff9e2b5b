use thiserror::Error;

/// Errors returned by the chat-completions client.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered 429.
    #[error("rate limited by text generation endpoint (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    /// Any other non-2xx answer.
    #[error("unexpected HTTP status {status} from text generation endpoint: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The reply parsed, but carried no message content.
    #[error("text generation endpoint returned no content")]
    EmptyCompletion,

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
