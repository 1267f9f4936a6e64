//! Client configuration: where the backend lives and how long to wait for it.

use std::{env, fmt::Display, str::FromStr, time::Duration};

use tracing::{info, warn};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_API_PREFIX: &str = "/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Scheme, host and port of the backend. Any trailing slash is dropped.
    pub base_url: String,
    /// Path prefix prepended to every endpoint.
    pub api_prefix: String,
    /// Upper bound on a single call, enforced by the transport.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_api_prefix(mut self, prefix: &str) -> Self {
        self.api_prefix = prefix.to_string();
        self
    }

    /// Reads `EVAL_API_BASE_URL`, `EVAL_API_PREFIX` and
    /// `EVAL_API_TIMEOUT_SECS`, falling back to the defaults for anything
    /// missing or unparseable.
    pub fn from_env() -> Self {
        Self {
            base_url: try_load("EVAL_API_BASE_URL", DEFAULT_BASE_URL.to_string()),
            api_prefix: try_load("EVAL_API_PREFIX", DEFAULT_API_PREFIX.to_string()),
            timeout: Duration::from_secs(try_load("EVAL_API_TIMEOUT_SECS", DEFAULT_TIMEOUT.as_secs())),
        }
    }

    /// `base_url` + `api_prefix`, normalized to exactly one slash between
    /// them and none at the end.
    pub fn api_root(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let prefix = self.api_prefix.trim_matches('/');
        if prefix.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{prefix}")
        }
    }
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
            default
        }),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}
