//! Domain types and configuration shared by every comparador crate.

pub mod app_config;
pub mod comparison;
pub mod config;
pub mod failures;
pub mod products;
pub mod stores;

use thiserror::Error;

pub use app_config::{AppConfig, CatalogKind, LlmConfig};
pub use comparison::{BatchSummary, ComparisonRow, COMPARISON_HEADERS};
pub use config::{build_app_config, load_app_config, load_app_config_from_env};
pub use failures::{FailureKind, StoreFailure, FAILURE_CODES};
pub use products::{
    format_colones, ProductError, ProductRecord, NO_PROMO_PRICE, PLACEHOLDER_IMAGE_URL,
};
pub use stores::{SearchMode, Store, StoreSelection};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Unknown store '{0}'")]
    UnknownStore(String),

    #[error("Unknown search mode '{0}'")]
    UnknownSearchMode(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
