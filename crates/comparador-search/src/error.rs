use comparador_core::FailureKind;
use comparador_llm::LlmError;
use thiserror::Error;

/// Failures turning free-form catalog text into product records.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("catalog reply was empty")]
    EmptyResponse,

    #[error("no JSON array found in catalog reply")]
    NoArrayFound,

    #[error("no JSON object found in catalog reply")]
    NoObjectFound,

    #[error("malformed JSON in catalog reply: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("catalog reply is valid JSON but not an array")]
    NotAnArray,

    #[error("item {index} does not match the product schema: {reason}")]
    SchemaMismatch { index: usize, reason: String },

    #[error("catalog reply contained no products")]
    EmptyArray,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("text generation failed: {0}")]
    Generation(#[from] LlmError),

    #[error("could not interpret catalog reply: {0}")]
    Extract(#[from] ExtractError),
}

impl CatalogError {
    /// Which store-level failure this error is reported as.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Generation(_) => FailureKind::Unavailable,
            Self::Extract(_) => FailureKind::InvalidResponse,
        }
    }
}
