//! Endpoint and credential configuration

use std::env;
use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::{CompletionError, Result};

/// Default inference endpoint
pub const DEFAULT_BASE_URL: &str = "https://qwen7b.gaia.domains/v1";

pub const ENV_BASE_URL: &str = "GAIA_BASE_URL";
pub const ENV_API_KEY: &str = "GAIA_API_KEY";
pub const ENV_TIMEOUT_SECS: &str = "GAIA_TIMEOUT_SECS";

/// Where to send requests and how to authenticate
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    /// Upper bound on the whole request; `None` waits for the transport
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            timeout: None,
        }
    }
}

// Hand-written so the key never lands in logs.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field(
                "api_key",
                &if self.api_key.is_empty() {
                    "<unset>"
                } else {
                    "<redacted>"
                },
            )
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    /// Create a config for the given endpoint and key
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: None,
        }
    }

    /// Read `GAIA_BASE_URL`, `GAIA_API_KEY` and `GAIA_TIMEOUT_SECS`.
    ///
    /// Unset or unparsable values keep their defaults; nothing is validated here.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env::var(ENV_BASE_URL).unwrap_or(defaults.base_url),
            api_key: env::var(ENV_API_KEY).unwrap_or(defaults.api_key),
            timeout: env::var(ENV_TIMEOUT_SECS)
                .ok()
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|secs| secs.is_finite() && *secs > 0.0)
                .map(Duration::from_secs_f64)
                .or(defaults.timeout),
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Check that a request may be attempted with this config
    ///
    /// Returns the parsed endpoint on success.
    pub fn validate(&self) -> Result<Url> {
        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            return Err(CompletionError::Configuration(
                "endpoint URL is empty".to_string(),
            ));
        }
        if self.api_key.trim().is_empty() {
            return Err(CompletionError::Configuration(format!(
                "API key is empty (set {} or pass --api-key)",
                ENV_API_KEY
            )));
        }
        if self.api_key.trim().chars().any(char::is_control) {
            return Err(CompletionError::Configuration(
                "API key contains control characters".to_string(),
            ));
        }

        let url = Url::parse(base_url).map_err(|e| {
            CompletionError::Configuration(format!("invalid endpoint URL '{}': {}", base_url, e))
        })?;
        match url.scheme() {
            "http" | "https" if url.host().is_some() => Ok(url),
            _ => Err(CompletionError::Configuration(format!(
                "endpoint URL must be an absolute http(s) URL: {}",
                base_url
            ))),
        }
    }
}
