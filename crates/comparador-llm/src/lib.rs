//! Generative text client used to synthesize store results.
//!
//! [`TextGenerator`] is the seam the search crate depends on;
//! [`ChatCompletionsClient`] is the production implementation.

pub mod client;
pub mod error;
pub mod types;

mod retry;

use std::sync::Arc;

use async_trait::async_trait;

pub use client::ChatCompletionsClient;
pub use error::LlmError;
pub use types::{ChatRole, Prompt};

/// Anything that turns a prompt into free-form text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Completes `prompt` and returns the raw reply text.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] when the backend cannot be reached or answers
    /// without usable content.
    async fn generate(&self, prompt: &Prompt) -> Result<String, LlmError>;
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    async fn generate(&self, prompt: &Prompt) -> Result<String, LlmError> {
        (**self).generate(prompt).await
    }
}
