//! Client configuration.
//!
//! A config is a plain value passed to `PinboardClient::new`; there is no
//! process-wide state, so differently configured clients can coexist.

use std::time::Duration;

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "https://api.pinboard.in/v1";

pub const TOKEN_ENV: &str = "PINBOARD_TOKEN";
pub const BASE_URL_ENV: &str = "PINBOARD_BASE_URL";
pub const TIMEOUT_ENV: &str = "PINBOARD_TIMEOUT_SECS";

#[derive(Clone)]
pub struct ClientConfig {
    pub token: String,
    pub base_url: String,
    /// Applied to the default transport only.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }

    /// Reads `PINBOARD_TOKEN` (required), `PINBOARD_BASE_URL` and
    /// `PINBOARD_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let token = lookup(TOKEN_ENV)
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| ApiError::InvalidRequest(format!("{TOKEN_ENV} not set")))?;
        let mut config = Self::new(token);
        if let Some(base_url) = lookup(BASE_URL_ENV) {
            config = config.with_base_url(&base_url);
        }
        if let Some(secs) = lookup(TIMEOUT_ENV) {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| ApiError::InvalidRequest(format!("{TIMEOUT_ENV} is not a number: {secs}")))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

// The token is a credential; keep it out of debug output.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("token", &"***")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
