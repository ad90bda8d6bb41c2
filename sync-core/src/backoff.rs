//! Bounded exponential backoff.
//!
//! A call is attempted once, then retried up to `max_retries` times while
//! it keeps failing with a retryable error. The wait before retry `n`
//! (1-based) is `initial_delay * 2^(n-1)`: strictly doubling, no jitter,
//! no cap.

use std::time::Duration;
use sync_types::RemoteError;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay before the first retry.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);

/// Retry budget and schedule for a single remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Total attempts = `1 + max_retries`.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each subsequent retry.
    pub initial_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy.
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
        }
    }

    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Delay before retry number `retry` (1-based).
    ///
    /// Saturates instead of overflowing for very large retry numbers.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.checked_pow(retry.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(factor)
    }

    /// Total number of attempts this policy allows.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Start tracking one call.
    pub fn start(&self) -> RetryState {
        RetryState {
            policy: *self,
            retries: 0,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_INITIAL_DELAY)
    }
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait for the given delay, then attempt again.
    Retry {
        /// Backoff before the next attempt.
        delay: Duration,
    },
    /// Propagate the failure to the caller.
    GiveUp,
}

/// Retry bookkeeping for one in-flight call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    policy: RetryPolicy,
    retries: u32,
}

impl RetryState {
    /// Decide what to do about a failed attempt.
    ///
    /// Non-retryable errors give up immediately; retryable errors consume
    /// one retry from the budget.
    pub fn on_failure(&mut self, error: &RemoteError) -> RetryDecision {
        if !error.is_retryable() || self.retries >= self.policy.max_retries {
            return RetryDecision::GiveUp;
        }
        self.retries += 1;
        RetryDecision::Retry {
            delay: self.policy.delay_for(self.retries),
        }
    }

    /// Retries performed so far.
    pub fn retries(&self) -> u32 {
        self.retries
    }
}
