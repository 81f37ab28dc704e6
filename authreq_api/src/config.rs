//! Client configuration with environment overrides.

use std::time::Duration;

use url::Url;

use crate::Error;

/// Route the navigator is sent to when the session is rejected.
pub const DEFAULT_LOGIN_PATH: &str = "/login";
/// Timeout applied by the default transport.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Prefix for relative request URLs.
    pub base_url: Option<Url>,
    pub timeout: Duration,
    pub login_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
        }
    }
}

impl ClientConfig {
    /// Reads `AUTHREQ_BASE_URL`, `AUTHREQ_TIMEOUT_SECS` and `AUTHREQ_LOGIN_PATH`,
    /// falling back to the defaults for anything unset.
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::default();
        if let Some(base) = env_string("AUTHREQ_BASE_URL") {
            config = config.with_base_url(&base)?;
        }
        config.timeout = Duration::from_secs(env_u64(
            "AUTHREQ_TIMEOUT_SECS",
            DEFAULT_TIMEOUT.as_secs(),
        ));
        if let Some(path) = env_string("AUTHREQ_LOGIN_PATH") {
            config.login_path = path;
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, Error> {
        let url = Url::parse(base_url).map_err(|e| {
            tracing::error!("Invalid base URL {}: {}", base_url, e);
            Error::InvalidUrl(format!("{}: {}", base_url, e))
        })?;
        self.base_url = Some(url);
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_login_path(mut self, login_path: &str) -> Self {
        self.login_path = login_path.to_string();
        self
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}
