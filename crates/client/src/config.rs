//! Client configuration from the environment.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub const API_URL_VAR: &str = "STOREFRONT_API_URL";
pub const TOKEN_FILE_VAR: &str = "STOREFRONT_TOKEN_FILE";
pub const HTTP_TIMEOUT_VAR: &str = "STOREFRONT_HTTP_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base of the REST API; endpoint paths are joined onto it.
    pub api_url: Url,
    /// The well-known durable token location.
    pub token_file: PathBuf,
    pub http_timeout: Duration,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var} '{value}': {reason}")]
    InvalidUrl {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid {var} '{0}': expected a whole number of seconds", var = HTTP_TIMEOUT_VAR)]
    InvalidTimeout(String),

    #[error("failed to resolve OS app data directory; set {var}", var = TOKEN_FILE_VAR)]
    NoDataDir,
}

impl ClientConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = parse_api_url(&raw_url)?;

        let token_file = match lookup(TOKEN_FILE_VAR) {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_token_file().ok_or(ConfigError::NoDataDir)?,
        };

        let http_timeout = match lookup(HTTP_TIMEOUT_VAR) {
            Some(secs) => secs
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::InvalidTimeout(secs))?,
            None => DEFAULT_HTTP_TIMEOUT,
        };

        Ok(Self {
            api_url,
            token_file,
            http_timeout,
        })
    }
}

fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        var: API_URL_VAR,
        value: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}

/// `<data dir>/storefront-admin/token`, falling back to `~/.local/share`.
pub fn default_token_file() -> Option<PathBuf> {
    let base = dirs::data_dir().or_else(|| {
        dirs::home_dir().map(|mut home| {
            home.push(".local");
            home.push("share");
            home
        })
    })?;

    Some(base.join("storefront-admin").join("token"))
}
