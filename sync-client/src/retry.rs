//! Retry executor for remote calls.
//!
//! Wraps a single asynchronous call with the bounded, strictly doubling
//! backoff of [`RetryPolicy`]. The same executor serves the live write path
//! and queue replay, so both get identical resilience.

use std::future::Future;

use sync_core::{RetryDecision, RetryPolicy};
use sync_types::RemoteError;

/// Runs remote calls under a [`RetryPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    /// Create an executor with the given policy.
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// The policy in use.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Invoke `call`, retrying retryable failures with backoff.
    ///
    /// Non-retryable failures, and the last retryable failure once the
    /// budget is spent, are returned unchanged.
    pub async fn run<T, F, Fut>(&self, mut call: F) -> Result<T, RemoteError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let mut state = self.policy.start();
        loop {
            let error = match call().await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            match state.on_failure(&error) {
                RetryDecision::Retry { delay } => {
                    tracing::warn!(
                        "Remote call failed ({}), retry {}/{} in {:?}",
                        error,
                        state.retries(),
                        self.policy.max_retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::GiveUp => {
                    tracing::debug!(
                        "Remote call failed after {} retries: {}",
                        state.retries(),
                        error
                    );
                    return Err(error);
                }
            }
        }
    }
}
