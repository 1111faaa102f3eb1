//! Configuration surface, loadable from serde sources or the environment.

use std::str::FromStr;

use serde::Deserialize;

use crate::{
    sink::DEFAULT_CHANNEL, ClientOptions, LoggingOptions, PropertyDataError, Result, RetryPolicy,
};

pub const DEFAULT_BASE_URL: &str = "https://api.propertydata.co.uk";

/// Full client configuration.
///
/// Timeouts are in seconds and the retry delay follows the
/// [`RetryPolicy::from_config`] millisecond/second convention.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: u64,
    pub connect_timeout: u64,
    pub retry: RetryConfig,
    pub logging: LoggingConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: String::new(),
            timeout: 30,
            connect_timeout: 10,
            retry: RetryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetryConfig {
    pub enabled: bool,
    pub max_attempts: i64,
    /// Milliseconds when above 100, seconds otherwise.
    pub delay: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            delay: 1000,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub channel: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            channel: DEFAULT_CHANNEL.to_owned(),
        }
    }
}

impl ClientConfig {
    /// Reads configuration from `PROPERTY_DATA_*` environment variables,
    /// falling back to defaults for unset ones.
    ///
    /// - `PROPERTY_DATA_API_URL`
    /// - `PROPERTY_DATA_API_KEY`
    /// - `PROPERTY_DATA_API_TIMEOUT` (seconds)
    /// - `PROPERTY_DATA_RETRY_ENABLED`
    /// - `PROPERTY_DATA_RETRY_ATTEMPTS`
    /// - `PROPERTY_DATA_RETRY_DELAY`
    /// - `PROPERTY_DATA_LOGGING_ENABLED`
    /// - `PROPERTY_DATA_LOG_CHANNEL`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = var("PROPERTY_DATA_API_URL") {
            config.base_url = value;
        }
        if let Some(value) = var("PROPERTY_DATA_API_KEY") {
            config.api_key = value;
        }
        if let Some(value) = var("PROPERTY_DATA_API_TIMEOUT") {
            config.timeout = parse_number("PROPERTY_DATA_API_TIMEOUT", &value)?;
        }
        if let Some(value) = var("PROPERTY_DATA_RETRY_ENABLED") {
            config.retry.enabled = parse_bool("PROPERTY_DATA_RETRY_ENABLED", &value)?;
        }
        if let Some(value) = var("PROPERTY_DATA_RETRY_ATTEMPTS") {
            config.retry.max_attempts = parse_number("PROPERTY_DATA_RETRY_ATTEMPTS", &value)?;
        }
        if let Some(value) = var("PROPERTY_DATA_RETRY_DELAY") {
            config.retry.delay = parse_number("PROPERTY_DATA_RETRY_DELAY", &value)?;
        }
        if let Some(value) = var("PROPERTY_DATA_LOGGING_ENABLED") {
            config.logging.enabled = parse_bool("PROPERTY_DATA_LOGGING_ENABLED", &value)?;
        }
        if let Some(value) = var("PROPERTY_DATA_LOG_CHANNEL") {
            config.logging.channel = value;
        }
        Ok(config)
    }

    pub fn options(&self) -> ClientOptions {
        ClientOptions {
            timeout_ms: self.timeout.saturating_mul(1000),
            connect_timeout_ms: self.connect_timeout.saturating_mul(1000),
            retry: RetryPolicy::from_config(
                self.retry.enabled,
                self.retry.max_attempts,
                self.retry.delay,
            ),
            logging: LoggingOptions {
                enabled: self.logging.enabled,
                channel: self.logging.channel.clone(),
            },
        }
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        PropertyDataError::configuration(format!("{key} must be a number, got '{value}'"))
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(PropertyDataError::configuration(format!(
            "{key} must be a boolean, got '{value}'"
        ))),
    }
}
