//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `TIENDA_API_URL` - Base URL of the store API (default: `http://localhost:3001`)
//! - `TIENDA_STATE_DIR` - Directory holding the persisted session (default: `.tienda`)
//! - `TIENDA_TIMEOUT_SECS` - Per-request timeout in seconds (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:3001";
const DEFAULT_STATE_DIR: &str = ".tienda";
const DEFAULT_TIMEOUT_SECS: &str = "10";
const SESSION_FILE: &str = "session.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the store API; endpoint paths are joined onto it.
    pub api_url: Url,
    /// Directory for durable client state (the persisted session).
    pub state_dir: PathBuf,
    /// Timeout applied to every outbound request.
    pub timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production", "staging")
    pub sentry_environment: Option<String>,
}

impl ClientConfig {
    /// Configuration pointing at `api_url` with every other setting at its
    /// default.
    #[must_use]
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            timeout: Duration::from_secs(10),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(&get_env_or_default("TIENDA_API_URL", DEFAULT_API_URL))?;
        let state_dir = PathBuf::from(get_env_or_default("TIENDA_STATE_DIR", DEFAULT_STATE_DIR));
        let timeout = parse_timeout(&get_env_or_default(
            "TIENDA_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        ))?;

        Ok(Self {
            api_url,
            state_dir,
            timeout,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Path of the file backing the persisted session.
    #[must_use]
    pub fn session_file(&self) -> PathBuf {
        self.state_dir.join(SESSION_FILE)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_api_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar("TIENDA_API_URL".to_string(), e.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "TIENDA_API_URL".to_string(),
            format!("expected an http(s) base URL, got {value}"),
        ));
    }
    Ok(url)
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    match value.parse::<u64>() {
        Ok(0) | Err(_) => Err(ConfigError::InvalidEnvVar(
            "TIENDA_TIMEOUT_SECS".to_string(),
            format!("expected a positive number of seconds, got {value:?}"),
        )),
        Ok(secs) => Ok(Duration::from_secs(secs)),
    }
}
