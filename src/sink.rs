//! Observability events and the sinks that receive them.

use std::{fmt, sync::Arc, time::Duration};

use crate::{
    params::{QueryValue, CREDENTIAL_PARAM},
    PropertyDataError, QueryParams,
};

/// Replacement text for the credential in logged parameters.
pub const REDACTED: &str = "***HIDDEN***";

/// Default channel name for [`TracingSink`].
pub const DEFAULT_CHANNEL: &str = "property-data";

/// Event emitted by the client while executing a call.
#[derive(Clone, Debug, PartialEq)]
pub enum ClientEvent<'a> {
    Request {
        method: &'a str,
        url: &'a str,
        /// Query parameters with the credential already redacted.
        parameters: &'a QueryParams,
    },
    Response {
        url: &'a str,
        status: u16,
        body_size: usize,
    },
    Error {
        message: &'a str,
        cause: Option<String>,
        /// `file:line` where the error was raised.
        location: String,
    },
    RetryAttempt {
        attempt: u32,
        max_attempts: u32,
        delay: Duration,
        message: &'a str,
    },
    RetryExhausted {
        attempts: u32,
        message: &'a str,
    },
}

/// Failure reported by a [`LogSink`]. Never surfaced to callers.
#[derive(Debug, thiserror::Error)]
#[error("log sink failure: {0}")]
pub struct SinkError(pub String);

/// Receiver of [`ClientEvent`]s.
pub trait LogSink: Send + Sync {
    fn record(&self, event: &ClientEvent<'_>) -> Result<(), SinkError>;
}

/// Forwards events to `tracing`, tagged with a channel name.
#[derive(Clone, Debug)]
pub struct TracingSink {
    channel: String,
}

impl TracingSink {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL)
    }
}

impl LogSink for TracingSink {
    fn record(&self, event: &ClientEvent<'_>) -> Result<(), SinkError> {
        let channel = self.channel.as_str();
        match event {
            ClientEvent::Request {
                method,
                url,
                parameters,
            } => {
                tracing::info!(channel, method, url, parameters = ?parameters, "PropertyData API request");
            }
            ClientEvent::Response {
                url,
                status,
                body_size,
            } => {
                tracing::info!(channel, url, status, body_size, "PropertyData API response");
            }
            ClientEvent::Error {
                message,
                cause,
                location,
            } => {
                tracing::error!(
                    channel,
                    cause = cause.as_deref().unwrap_or(""),
                    location = location.as_str(),
                    "PropertyData API error: {message}"
                );
            }
            ClientEvent::RetryAttempt {
                attempt,
                max_attempts,
                delay,
                message,
            } => {
                tracing::warn!(
                    channel,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "PropertyData API request failed, retrying: {message}"
                );
            }
            ClientEvent::RetryExhausted { attempts, message } => {
                tracing::error!(
                    channel,
                    attempts,
                    "PropertyData API request failed after {attempts} attempts: {message}"
                );
            }
        }
        Ok(())
    }
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn record(&self, _event: &ClientEvent<'_>) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Best-effort dispatcher shared by the executor and the retry coordinator.
///
/// Holds no sink when logging is disabled. Sink failures are swallowed.
#[derive(Clone, Default)]
pub(crate) struct EventEmitter {
    sink: Option<Arc<dyn LogSink>>,
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("enabled", &self.sink.is_some())
            .finish()
    }
}

impl EventEmitter {
    pub(crate) fn new(enabled: bool, sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink: enabled.then_some(sink),
        }
    }

    pub(crate) fn disabled() -> Self {
        Self { sink: None }
    }

    pub(crate) fn emit(&self, event: ClientEvent<'_>) {
        let Some(sink) = &self.sink else {
            return;
        };
        if let Err(err) = sink.record(&event) {
            tracing::trace!(error = %err, "log sink rejected event");
        }
    }

    pub(crate) fn error(&self, err: &PropertyDataError) {
        if self.sink.is_none() {
            return;
        }
        let location = err.location();
        self.emit(ClientEvent::Error {
            message: err.message(),
            cause: err.cause_message(),
            location: format!("{}:{}", location.file(), location.line()),
        });
    }
}

/// Copy of `params` with the credential value replaced by [`REDACTED`].
pub(crate) fn redact(params: &QueryParams) -> QueryParams {
    let mut redacted = params.clone();
    if redacted.get(CREDENTIAL_PARAM).is_some() {
        redacted.insert(CREDENTIAL_PARAM, QueryValue::text(REDACTED));
    }
    redacted
}
