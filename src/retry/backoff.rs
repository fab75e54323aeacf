//! Backoff-based retry policy
//!
//! Uses the `backoff` crate's exponential schedule to space out attempts.
//! The pipeline waits the returned interval asynchronously before re-issuing.

use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use std::time::Duration;

use super::policy::RetryPolicy;
use crate::error::NetworkError;

/// Exponential backoff between attempts, capped by a retry count.
#[derive(Debug, Clone)]
pub struct BackoffRetryPolicy {
    backoff: ExponentialBackoff,
    timeout: Duration,
    max_retries: u32,
    retries: u32,
    next_delay: Duration,
}

impl BackoffRetryPolicy {
    /// Create a policy with the given per-attempt timeout and retry cap,
    /// using `backoff`'s default schedule.
    pub fn new(timeout: Duration, max_retries: u32) -> Self {
        Self::with_backoff(
            backoff::ExponentialBackoffBuilder::new()
                .with_max_elapsed_time(None)
                .build(),
            timeout,
            max_retries,
        )
    }

    /// Create a policy around a preconfigured schedule.
    pub fn with_backoff(backoff: ExponentialBackoff, timeout: Duration, max_retries: u32) -> Self {
        Self {
            backoff,
            timeout,
            max_retries,
            retries: 0,
            next_delay: Duration::ZERO,
        }
    }
}

impl RetryPolicy for BackoffRetryPolicy {
    fn current_timeout(&self) -> Duration {
        self.timeout
    }

    fn current_retry_count(&self) -> u32 {
        self.retries
    }

    fn retry(&mut self, error: &NetworkError) -> Result<(), NetworkError> {
        if self.retries >= self.max_retries {
            return Err(error.clone());
        }
        match self.backoff.next_backoff() {
            Some(delay) => {
                self.retries += 1;
                self.next_delay = delay;
                Ok(())
            }
            // Schedule exhausted (max elapsed time reached)
            None => Err(error.clone()),
        }
    }

    fn backoff_delay(&self) -> Duration {
        self.next_delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deterministic(max_retries: u32) -> BackoffRetryPolicy {
        let backoff = backoff::ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(100))
            .with_multiplier(2.0)
            .with_randomization_factor(0.0)
            .with_max_interval(Duration::from_secs(1))
            .with_max_elapsed_time(None)
            .build();
        BackoffRetryPolicy::with_backoff(backoff, Duration::from_secs(5), max_retries)
    }

    #[test]
    fn test_delays_follow_schedule() {
        let mut policy = deterministic(3);
        policy.retry(&NetworkError::Timeout).unwrap();
        assert_eq!(policy.backoff_delay(), Duration::from_millis(100));
        policy.retry(&NetworkError::Timeout).unwrap();
        assert_eq!(policy.backoff_delay(), Duration::from_millis(200));
        assert_eq!(policy.current_retry_count(), 2);
        assert_eq!(policy.current_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_retry_cap() {
        let mut policy = deterministic(1);
        assert!(policy.retry(&NetworkError::Timeout).is_ok());
        let err = policy.retry(&NetworkError::Timeout).unwrap_err();
        assert!(matches!(err, NetworkError::Timeout));
    }
}
