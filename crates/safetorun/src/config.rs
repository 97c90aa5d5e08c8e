//! Client configuration

use crate::error::{Result, SafetorunError};
use std::time::Duration;

pub use safetorun_config::{API_KEY_ENV, ENDPOINT_ENV, TOKEN_ENV};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the Safetorun GraphQL endpoint
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Full URL of the GraphQL endpoint
    pub endpoint: String,

    /// Sent as the `x-api-key` header when present
    pub api_key: Option<String>,

    /// Sent as a bearer `Authorization` header when present
    pub token: Option<String>,

    /// Per-request timeout
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: None,
            token: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Create ClientConfig from environment variables
    ///
    /// `SAFETORUN_ENDPOINT` is required, `SAFETORUN_API_KEY` and
    /// `SAFETORUN_TOKEN` are optional.
    pub fn from_env() -> Result<Self> {
        let endpoint = std::env::var(ENDPOINT_ENV)
            .map_err(|_| SafetorunError::MissingEnvVar(ENDPOINT_ENV.to_string()))?;

        let mut config = Self::new(endpoint);
        config.api_key = std::env::var(API_KEY_ENV).ok().filter(|v| !v.is_empty());
        config.token = std::env::var(TOKEN_ENV).ok().filter(|v| !v.is_empty());
        config.validate()?;
        Ok(config)
    }

    /// Check that the endpoint looks like an HTTP(S) URL
    pub fn validate(&self) -> Result<()> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(SafetorunError::InvalidConfig(
                "endpoint must not be empty".to_string(),
            ));
        }
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(SafetorunError::InvalidConfig(format!(
                "endpoint must be an http(s) URL: {}",
                endpoint
            )));
        }
        Ok(())
    }
}
