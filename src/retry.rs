use std::{future::Future, time::Duration};

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{sink::EventEmitter, ClientEvent, PropertyDataError, Result};

/// Upper bound for a single backoff wait.
pub const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Configures whether, how often and how slowly failed calls are retried.
///
/// `max_attempts` counts the first attempt, and is never below 1.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryPolicy {
    enabled: bool,
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(enabled: bool, max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            enabled,
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Builds a policy from raw configuration values.
    ///
    /// `raw_delay` above 100 is read as milliseconds and rounded up to whole
    /// seconds; 100 or below is read as seconds. The result is at least 1s.
    pub fn from_config(enabled: bool, max_attempts: i64, raw_delay: u64) -> Self {
        let max_attempts = u32::try_from(max_attempts.max(1)).unwrap_or(u32::MAX);
        Self::new(enabled, max_attempts, normalize_delay(raw_delay))
    }

    /// Policy that performs exactly one attempt.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn set_enabled(&mut self, enabled: bool) -> &mut Self {
        self.enabled = enabled;
        self
    }

    pub fn set_max_attempts(&mut self, max_attempts: u32) -> &mut Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn set_base_delay(&mut self, base_delay: Duration) -> &mut Self {
        self.base_delay = base_delay;
        self
    }

    /// Wait before retry number `attempt` (1-based): `base * 2^(attempt-1)`,
    /// capped at [`MAX_BACKOFF`].
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(31);
        self.base_delay
            .checked_mul(1u32 << exp)
            .map_or(MAX_BACKOFF, |delay| delay.min(MAX_BACKOFF))
    }
}

fn normalize_delay(raw: u64) -> Duration {
    let seconds = if raw > 100 { raw.div_ceil(1000) } else { raw };
    Duration::from_secs(seconds.max(1))
}

/// Runs one logical call as a sequence of attempts.
///
/// Only errors whose kind is retryable loop; everything else is returned on
/// the spot. The wait between attempts is cancelable through the token.
#[derive(Clone, Debug)]
pub struct RetryCoordinator {
    policy: RetryPolicy,
    events: EventEmitter,
}

impl RetryCoordinator {
    /// Coordinator that emits no events.
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_events(policy, EventEmitter::disabled())
    }

    pub(crate) fn with_events(policy: RetryPolicy, events: EventEmitter) -> Self {
        Self { policy, events }
    }

    pub(crate) fn set_events(&mut self, events: EventEmitter) {
        self.events = events;
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub(crate) fn policy_mut(&mut self) -> &mut RetryPolicy {
        &mut self.policy
    }

    /// Calls `attempt` (with the 1-based attempt number) until it succeeds,
    /// fails terminally, exhausts the policy, or `cancel` fires.
    pub async fn run<T, F, Fut>(&self, cancel: &CancellationToken, mut attempt: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if !self.policy.enabled {
            return attempt(1).await;
        }

        let max_attempts = self.policy.max_attempts;
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let err = match attempt(attempts).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_retryable() {
                return Err(err);
            }

            if attempts >= max_attempts {
                self.events.emit(ClientEvent::RetryExhausted {
                    attempts,
                    message: err.message(),
                });
                return Err(err);
            }

            if cancel.is_cancelled() {
                return Err(cancelled(err));
            }

            let delay = self.policy.delay_for(attempts);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(cancelled(err)),
                _ = sleep(delay) => {}
            }

            self.events.emit(ClientEvent::RetryAttempt {
                attempt: attempts,
                max_attempts,
                delay,
                message: err.message(),
            });
        }
    }
}

/// Cancellation between attempts; the last attempt's failure is kept as cause.
#[track_caller]
fn cancelled(last: PropertyDataError) -> PropertyDataError {
    PropertyDataError::connection("request cancelled").with_source(last)
}
