//! Configuration handling.
//!
//! Defaults for fetch and extraction come from environment variables, falling
//! back to the built-in values. Command-line flags are layered on top by the
//! binary.

use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::extractor::{ExtractOptions, StopPolicy};
use crate::fetcher::FetchOptions;
use crate::fetcher::types::{DEFAULT_MAX_BYTES, DEFAULT_TIMEOUT_SECS};

pub const ENV_TIMEOUT_SECS: &str = "PAGESNIP_TIMEOUT_SECS";
pub const ENV_MAX_BYTES: &str = "PAGESNIP_MAX_BYTES";
pub const ENV_USER_AGENT: &str = "PAGESNIP_USER_AGENT";
pub const ENV_STOP_POLICY: &str = "PAGESNIP_STOP_POLICY";

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    timeout_secs: u64,
    max_bytes: usize,
    user_agent: Option<String>,
    stop_policy: StopPolicy,
}

impl Config {
    pub fn new(
        timeout_secs: u64,
        max_bytes: usize,
        user_agent: Option<String>,
        stop_policy: StopPolicy,
    ) -> Self {
        Self {
            timeout_secs,
            max_bytes,
            user_agent,
            stop_policy,
        }
    }

    /// Load from environment variables, falling back to defaults.
    ///
    /// Unset or empty variables use the default; values that do not parse
    /// are rejected.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = read_var(ENV_TIMEOUT_SECS) {
            config.timeout_secs = raw.parse().map_err(|e| ConfigError::InvalidValue {
                field: ENV_TIMEOUT_SECS,
                reason: format!("{}: {}", raw, e),
            })?;
        }
        if let Some(raw) = read_var(ENV_MAX_BYTES) {
            config.max_bytes = raw.parse().map_err(|e| ConfigError::InvalidValue {
                field: ENV_MAX_BYTES,
                reason: format!("{}: {}", raw, e),
            })?;
        }
        config.user_agent = read_var(ENV_USER_AGENT);
        if let Some(raw) = read_var(ENV_STOP_POLICY) {
            config.stop_policy = raw.parse().map_err(|reason| ConfigError::InvalidValue {
                field: ENV_STOP_POLICY,
                reason,
            })?;
        }
        Ok(config)
    }

    /// Request timeout in seconds; `0` means the fetcher default.
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }
    /// Cap on decoded body bytes; `0` means the fetcher default.
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }
    pub fn stop_policy(&self) -> StopPolicy {
        self.stop_policy
    }

    pub fn fetch_options(&self) -> FetchOptions {
        let options = FetchOptions::new()
            .with_timeout_secs(self.timeout_secs)
            .with_max_bytes(self.max_bytes);
        match &self.user_agent {
            Some(agent) => options.with_header("User-Agent", agent.clone()),
            None => options,
        }
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions::with_stop(self.stop_policy)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            DEFAULT_TIMEOUT_SECS,
            DEFAULT_MAX_BYTES,
            None,
            StopPolicy::default(),
        )
    }
}

fn read_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Errors that can occur while building a configuration.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {}
