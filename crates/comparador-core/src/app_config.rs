use std::net::SocketAddr;
use std::path::PathBuf;

/// Where store searches and batch comparisons get their data from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    /// Pseudo-random records, no network.
    Mock,
    /// Records produced by a chat-completions endpoint.
    Generative,
}

impl std::fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogKind::Mock => write!(f, "mock"),
            CatalogKind::Generative => write!(f, "generative"),
        }
    }
}

/// Settings for the chat-completions client.
#[derive(Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub catalog: CatalogKind,
    pub llm: LlmConfig,
    pub mock_delay_min_ms: u64,
    pub mock_delay_max_ms: u64,
    /// Fixed seed for the mock catalog; `None` draws from OS entropy.
    pub mock_seed: Option<u64>,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub rate_limit_per_minute: usize,
}
