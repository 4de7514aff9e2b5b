//! Retry with exponential back-off and jitter for text generation calls.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors (network failures, 429, 5xx). Everything else is returned
//! immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::LlmError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:**
/// - Network-level failures: timeout, connection reset.
/// - [`LlmError::RateLimited`].
/// - [`LlmError::UnexpectedStatus`] with a 5xx status.
///
/// **Not retriable:**
/// - 4xx statuses other than 429, bad credentials included.
/// - [`LlmError::EmptyCompletion`] and [`LlmError::Deserialize`].
/// - [`LlmError::InvalidBaseUrl`].
pub(crate) fn is_retriable(err: &LlmError) -> bool {
    match err {
        LlmError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        LlmError::RateLimited { .. } => true,
        LlmError::UnexpectedStatus { status, .. } => (500..600).contains(status),
        LlmError::EmptyCompletion
        | LlmError::Deserialize { .. }
        | LlmError::InvalidBaseUrl { .. } => false,
    }
}

/// Wait the server asked for, if any.
fn server_delay_ms(err: &LlmError) -> Option<u64> {
    match err {
        LlmError::RateLimited { retry_after_secs } => Some(retry_after_secs.saturating_mul(1000)),
        _ => None,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// Back-off schedule with `backoff_base_ms = 500`:
///
/// | Attempt | Sleep before next attempt     |
/// |---------|-------------------------------|
/// | 1       | 500 ms × 2⁰ ± 25 % jitter     |
/// | 2       | 500 ms × 2¹ ± 25 % jitter     |
/// | 3       | 500 ms × 2² ± 25 % jitter     |
///
/// A 429 waits at least as long as its `Retry-After`. Delay is capped at
/// 30 s. Non-retriable errors are returned immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    const MAX_DELAY_MS: u64 = 30_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let jittered = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                let delay_ms = match server_delay_ms(&err) {
                    Some(requested) => jittered.max(requested).min(MAX_DELAY_MS),
                    None => jittered,
                };
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "text generation transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
