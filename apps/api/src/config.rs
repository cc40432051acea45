use anyhow::{Context, Result};

use crate::identity::toolkit::DEFAULT_ENDPOINT;

const DEFAULT_MAX_CAPTURE_BYTES: usize = 16 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. Without it documents live in process memory.
    pub database_url: Option<String>,
    pub identity_api_key: String,
    pub identity_endpoint: String,
    /// Request URI sent with provider token exchanges.
    pub oauth_request_uri: String,
    /// Upper bound on an uploaded capture image.
    pub max_capture_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            identity_api_key: require_env("IDENTITY_API_KEY")?,
            identity_endpoint: optional_env("IDENTITY_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            oauth_request_uri: optional_env("OAUTH_REQUEST_URI")
                .unwrap_or_else(|| "http://localhost".to_string()),
            max_capture_bytes: optional_env("MAX_CAPTURE_BYTES")
                .map(|v| v.parse::<usize>())
                .transpose()
                .context("MAX_CAPTURE_BYTES must be a byte count")?
                .unwrap_or(DEFAULT_MAX_CAPTURE_BYTES),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank both mean "not configured".
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Config {
            database_url: None,
            identity_api_key: "test-key".to_string(),
            identity_endpoint: DEFAULT_ENDPOINT.to_string(),
            oauth_request_uri: "http://localhost".to_string(),
            max_capture_bytes: 1024 * 1024,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}
