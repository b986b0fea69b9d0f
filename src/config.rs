//! Runtime configuration for the dispatcher.

use std::time::Duration;

use anyhow::{Context, Result};
use callback_delivery::{
    ClientConfig, RetryPolicy, DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT_MS,
};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::telemetry::LogFormat;

const CONFIG_FILE: &str = "callback.toml";
const ENV_PREFIX: &str = "CALLBACK_";

/// Dispatcher settings with defaults, file and environment overrides.
///
/// Configuration is loaded in priority order:
/// 1. `CALLBACK_*` environment variables (highest priority)
/// 2. Configuration file (`callback.toml`)
/// 3. Built-in defaults (lowest priority)
///
/// The defaults are the documented contract (3 attempts, 2s linear backoff
/// unit, 5s request timeout), so the action needs no configuration at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Maximum delivery attempts.
    ///
    /// Environment variable: `CALLBACK_MAX_ATTEMPTS`
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Backoff unit in milliseconds; attempt `n` is followed by `n` units.
    ///
    /// Environment variable: `CALLBACK_BASE_DELAY_MS`
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Per-request timeout in milliseconds.
    ///
    /// Environment variable: `CALLBACK_REQUEST_TIMEOUT_MS`
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// User agent sent with each request.
    ///
    /// Environment variable: `CALLBACK_USER_AGENT`
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Log output format.
    ///
    /// Environment variable: `CALLBACK_LOG_FORMAT`
    #[serde(default)]
    pub log_format: LogFormat,
    /// Log filter directives, used when `RUST_LOG` is unset.
    ///
    /// Environment variable: `CALLBACK_LOG_FILTER`
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Config {
    /// Load configuration from defaults, `callback.toml` and `CALLBACK_*`
    /// environment variables.
    pub fn load() -> Result<Self> {
        Self::from_figment(Self::figment())
    }

    /// Layered provider used by `load`.
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Extracts and validates configuration from any figment.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Convert to the HTTP client configuration.
    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_millis(self.request_timeout_ms),
            user_agent: self.user_agent.clone(),
        }
    }

    /// Convert to retry policy.
    pub fn to_retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.base_delay_ms))
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            anyhow::bail!("max_attempts must be greater than 0");
        }

        if self.request_timeout_ms == 0 {
            anyhow::bail!("request_timeout_ms must be greater than 0");
        }

        if self.user_agent.trim().is_empty() {
            anyhow::bail!("user_agent must not be empty");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            user_agent: default_user_agent(),
            log_format: LogFormat::default(),
            log_filter: default_log_filter(),
        }
    }
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_base_delay_ms() -> u64 {
    DEFAULT_BASE_DELAY_MS
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_user_agent() -> String {
    ClientConfig::default().user_agent
}

fn default_log_filter() -> String {
    "info".to_string()
}
