use std::str::FromStr;

use crate::app_config::{AppConfig, CatalogKind, LlmConfig};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing and validation live here, decoupled from the process environment,
/// so tests can drive it with a plain `HashMap`.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let bind_addr: SocketAddr = parse_var(&or_default, "COMPARADOR_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("COMPARADOR_LOG_LEVEL", "info");
    let catalog = parse_catalog(&or_default("COMPARADOR_CATALOG", "mock"))?;

    let api_key = lookup("COMPARADOR_LLM_API_KEY")
        .ok()
        .map(|key| key.trim().to_owned())
        .filter(|key| !key.is_empty());
    if catalog == CatalogKind::Generative && api_key.is_none() {
        return Err(ConfigError::MissingEnvVar(
            "COMPARADOR_LLM_API_KEY".to_string(),
        ));
    }

    let llm = LlmConfig {
        base_url: or_default("COMPARADOR_LLM_BASE_URL", "https://api.openai.com/v1"),
        api_key,
        model: or_default("COMPARADOR_LLM_MODEL", "gpt-4o-mini"),
        temperature: parse_var(&or_default, "COMPARADOR_LLM_TEMPERATURE", "0.7")?,
        max_tokens: parse_var(&or_default, "COMPARADOR_LLM_MAX_TOKENS", "2000")?,
        timeout_secs: parse_var(&or_default, "COMPARADOR_LLM_TIMEOUT_SECS", "30")?,
        max_retries: parse_var(&or_default, "COMPARADOR_LLM_MAX_RETRIES", "2")?,
        retry_backoff_ms: parse_var(&or_default, "COMPARADOR_LLM_RETRY_BACKOFF_MS", "500")?,
    };

    let mock_delay_min_ms: u64 = parse_var(&or_default, "COMPARADOR_MOCK_DELAY_MIN_MS", "500")?;
    let mock_delay_max_ms: u64 = parse_var(&or_default, "COMPARADOR_MOCK_DELAY_MAX_MS", "1500")?;
    if mock_delay_min_ms > mock_delay_max_ms {
        return Err(ConfigError::InvalidEnvVar {
            var: "COMPARADOR_MOCK_DELAY_MAX_MS".to_string(),
            reason: format!(
                "must be >= COMPARADOR_MOCK_DELAY_MIN_MS ({mock_delay_min_ms}), got {mock_delay_max_ms}"
            ),
        });
    }

    let mock_seed = match lookup("COMPARADOR_MOCK_SEED") {
        Ok(raw) => Some(
            raw.trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidEnvVar {
                    var: "COMPARADOR_MOCK_SEED".to_string(),
                    reason: e.to_string(),
                })?,
        ),
        Err(_) => None,
    };

    let upload_dir = PathBuf::from(or_default("COMPARADOR_UPLOAD_DIR", "./temp"));
    let max_upload_bytes: usize =
        parse_var(&or_default, "COMPARADOR_MAX_UPLOAD_BYTES", "10485760")?;
    let rate_limit_per_minute: usize =
        parse_var(&or_default, "COMPARADOR_RATE_LIMIT_PER_MINUTE", "120")?;
    if rate_limit_per_minute == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "COMPARADOR_RATE_LIMIT_PER_MINUTE".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(AppConfig {
        bind_addr,
        log_level,
        catalog,
        llm,
        mock_delay_min_ms,
        mock_delay_max_ms,
        mock_seed,
        upload_dir,
        max_upload_bytes,
        rate_limit_per_minute,
    })
}

fn parse_var<T, D>(or_default: &D, var: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    D: Fn(&str, &str) -> String,
{
    let raw = or_default(var, default);
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

fn parse_catalog(s: &str) -> Result<CatalogKind, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "mock" => Ok(CatalogKind::Mock),
        "generative" => Ok(CatalogKind::Generative),
        other => Err(ConfigError::InvalidEnvVar {
            var: "COMPARADOR_CATALOG".to_string(),
            reason: format!("expected \"mock\" or \"generative\", got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
