//! Provider settings
//!
//! Loaded from `~/.config/safetorun/config.yaml`, then overridden by the
//! `SAFETORUN_*` environment variables.

use crate::error::{ConfigError, Result};
use crate::{API_KEY_ENV, ENDPOINT_ENV, TOKEN_ENV};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "config.yaml";

/// Connection and polling settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// GraphQL endpoint URL
    pub endpoint: Option<String>,

    pub api_key: Option<String>,

    pub token: Option<String>,

    /// Per-request timeout in seconds
    pub request_timeout_secs: Option<u64>,

    pub wait: WaitSettings,

    /// File the settings were read from, if any
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Bounds for waiting on organisation status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitSettings {
    pub interval_secs: u64,

    /// `null` waits without a deadline
    pub timeout_secs: Option<u64>,

    pub max_attempts: Option<u32>,

    pub error_destroying_limit: Option<u32>,
}

fn default_interval_secs() -> u64 {
    1
}

fn default_timeout_secs() -> Option<u64> {
    Some(30 * 60)
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            timeout_secs: default_timeout_secs(),
            max_attempts: None,
            error_destroying_limit: None,
        }
    }
}

impl WaitSettings {
    /// Reject bounds that would poll without pause or give up before polling
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| Err(ConfigError::InvalidSettings(message.to_string()));

        if self.interval_secs == 0 {
            return invalid("wait.interval_secs must be at least 1");
        }
        if self.timeout_secs == Some(0) {
            return invalid("wait.timeout_secs must be at least 1, or null for no deadline");
        }
        if self.max_attempts == Some(0) {
            return invalid("wait.max_attempts must be at least 1");
        }
        if self.error_destroying_limit == Some(0) {
            return invalid("wait.error_destroying_limit must be at least 1");
        }
        Ok(())
    }
}

impl Settings {
    /// Load the user settings file and apply environment overrides
    pub fn load() -> Result<Self> {
        let path = crate::get_config_dir()?.join(SETTINGS_FILE);
        let mut settings = Self::load_from(&path)?;
        settings.apply_env();
        Ok(settings)
    }

    /// Read settings from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("Settings file not found: {}", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let mut settings: Settings = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(&content)?
        };
        settings.source = Some(path.to_path_buf());
        settings.wait.validate()?;

        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Override values with non-empty `SAFETORUN_*` environment variables
    pub fn apply_env(&mut self) {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        if let Some(endpoint) = var(ENDPOINT_ENV) {
            self.endpoint = Some(endpoint);
        }
        if let Some(api_key) = var(API_KEY_ENV) {
            self.api_key = Some(api_key);
        }
        if let Some(token) = var(TOKEN_ENV) {
            self.token = Some(token);
        }
    }

    /// The configured endpoint, or an error naming where to set it
    pub fn endpoint(&self) -> Result<&str> {
        self.endpoint
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| {
                ConfigError::MissingEndpoint(
                    self.source
                        .clone()
                        .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE)),
                )
            })
    }
}
