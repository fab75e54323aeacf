//! Retry Policy Module
//!
//! A retry policy is attached to each request. The pipeline consults it after
//! every retryable failure; the policy either advances its internal state and
//! allows another attempt, or hands back the terminal error.

use std::time::Duration;

use crate::error::NetworkError;

/// Per-request retry strategy.
pub trait RetryPolicy: Send {
    /// Timeout to apply to the next attempt.
    fn current_timeout(&self) -> Duration;

    /// Number of retries performed so far.
    fn current_retry_count(&self) -> u32;

    /// Prepare for another attempt after `error`.
    ///
    /// `Ok(())` permits the retry (with internal state advanced); `Err`
    /// carries the terminal error to surface to the caller.
    fn retry(&mut self, error: &NetworkError) -> Result<(), NetworkError>;

    /// How long to wait before the attempt that `retry` just permitted.
    fn backoff_delay(&self) -> Duration {
        Duration::ZERO
    }
}

/// Default policy: a fixed number of retries, each one growing the timeout
/// by `timeout * backoff_multiplier`. No delay between attempts.
#[derive(Debug, Clone)]
pub struct DefaultRetryPolicy {
    /// Current timeout
    current_timeout: Duration,
    /// Retries performed so far
    current_retry_count: u32,
    /// Maximum number of retries
    max_retries: u32,
    /// Timeout growth factor applied on each retry
    backoff_multiplier: f32,
}

impl Default for DefaultRetryPolicy {
    fn default() -> Self {
        Self::new(
            crate::defaults::retry::INITIAL_TIMEOUT,
            crate::defaults::retry::MAX_RETRIES,
            crate::defaults::retry::BACKOFF_MULTIPLIER,
        )
    }
}

impl DefaultRetryPolicy {
    /// Create a new retry policy
    pub const fn new(initial_timeout: Duration, max_retries: u32, backoff_multiplier: f32) -> Self {
        Self {
            current_timeout: initial_timeout,
            current_retry_count: 0,
            max_retries,
            backoff_multiplier,
        }
    }

    /// Set maximum retries
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set initial timeout
    pub const fn with_initial_timeout(mut self, timeout: Duration) -> Self {
        self.current_timeout = timeout;
        self
    }

    /// Set timeout growth factor
    pub const fn with_backoff_multiplier(mut self, multiplier: f32) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    pub const fn backoff_multiplier(&self) -> f32 {
        self.backoff_multiplier
    }

    /// Growth applied on the next retry. Negative or NaN multipliers mean no
    /// growth; results too large for a `Duration` saturate.
    fn timeout_growth(&self) -> Duration {
        let multiplier = self.backoff_multiplier.max(0.0);
        Duration::try_from_secs_f32(multiplier * self.current_timeout.as_secs_f32())
            .unwrap_or(Duration::MAX)
    }

    const fn has_attempt_remaining(&self) -> bool {
        self.current_retry_count <= self.max_retries
    }
}

impl RetryPolicy for DefaultRetryPolicy {
    fn current_timeout(&self) -> Duration {
        self.current_timeout
    }

    fn current_retry_count(&self) -> u32 {
        self.current_retry_count
    }

    fn retry(&mut self, error: &NetworkError) -> Result<(), NetworkError> {
        self.current_retry_count = self.current_retry_count.saturating_add(1);
        self.current_timeout = self.current_timeout.saturating_add(self.timeout_growth());
        if self.has_attempt_remaining() {
            Ok(())
        } else {
            Err(error.clone())
        }
    }
}
