use std::time::Duration;

use crate::{sink::DEFAULT_CHANNEL, RetryPolicy};

/// Configures timeouts, retry behavior and logging.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Total per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Connection establishment timeout in milliseconds.
    pub connect_timeout_ms: u64,
    pub retry: RetryPolicy,
    pub logging: LoggingOptions,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            connect_timeout_ms: 10_000,
            retry: RetryPolicy::default(),
            logging: LoggingOptions::default(),
        }
    }
}

impl ClientOptions {
    pub(crate) fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub(crate) fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Whether events are emitted, and on which channel.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LoggingOptions {
    pub enabled: bool,
    pub channel: String,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            channel: DEFAULT_CHANNEL.to_owned(),
        }
    }
}
