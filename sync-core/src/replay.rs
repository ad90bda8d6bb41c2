//! Disposition of queued items whose replay failed.
//!
//! Queued items are retried on every pass, but not forever: a permanent
//! rejection parks the item immediately, and a server-side transient
//! failure parks it once it has failed `max_attempts` passes. Connectivity
//! failures (network, timeout) say nothing about the item itself, so they
//! are recorded but never spend the budget. Parked items (status `error`)
//! stay in the queue for inspection and are skipped until requeued.

use sync_types::{ItemStatus, QueueItem, RemoteError};

/// Default number of failed passes before an item is parked.
pub const DEFAULT_MAX_REPLAY_ATTEMPTS: u32 = 20;

/// Eviction policy for queued items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayPolicy {
    /// Failed passes before parking. `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl ReplayPolicy {
    /// Create a policy. Zero means unlimited.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: (max_attempts > 0).then_some(max_attempts),
        }
    }

    /// Never park on transient failures.
    pub fn unlimited() -> Self {
        Self { max_attempts: None }
    }

    /// Record a failed replay on `item` and decide its fate.
    pub fn on_failure(&self, item: &mut QueueItem, error: &RemoteError) -> FailureDisposition {
        item.last_error = Some(error.to_string());

        if error.is_connectivity() {
            item.status = ItemStatus::Pending;
            return FailureDisposition::Retry;
        }
        item.attempts = item.attempts.saturating_add(1);

        let exhausted = self
            .max_attempts
            .is_some_and(|max| item.attempts >= max);

        if error.is_permanent() || exhausted {
            item.status = ItemStatus::Error;
            FailureDisposition::Parked
        } else {
            item.status = ItemStatus::Pending;
            FailureDisposition::Retry
        }
    }
}

impl Default for ReplayPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REPLAY_ATTEMPTS)
    }
}

/// Outcome of [`ReplayPolicy::on_failure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureDisposition {
    /// Left pending; replayed again on the next pass.
    Retry,
    /// Parked with status `error`; skipped until requeued.
    Parked,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use sync_types::{ItemId, OperationType};

    fn item() -> QueueItem {
        QueueItem::new(
            ItemId::new(1, 0),
            OperationType::Loan,
            "/bank/loan-apply",
            json!({"amount": 1000}),
            Utc::now(),
        )
    }

    #[test]
    fn transient_failure_stays_pending() {
        let policy = ReplayPolicy::default();
        let mut item = item();
        item.status = ItemStatus::Syncing;

        let disposition = policy.on_failure(&mut item, &RemoteError::Unavailable);

        assert_eq!(disposition, FailureDisposition::Retry);
        assert_eq!(item.status, ItemStatus::Pending);
        assert_eq!(item.attempts, 1);
        assert_eq!(item.last_error.as_deref(), Some("service unavailable"));
    }

    #[test]
    fn permanent_failure_parks_immediately() {
        let policy = ReplayPolicy::default();
        let mut item = item();

        let disposition = policy.on_failure(&mut item, &RemoteError::from_status(422, "bad"));

        assert_eq!(disposition, FailureDisposition::Parked);
        assert_eq!(item.status, ItemStatus::Error);
        assert_eq!(item.attempts, 1);
    }

    #[test]
    fn parks_after_max_attempts() {
        let policy = ReplayPolicy::new(3);
        let mut item = item();
        let err = RemoteError::Unavailable;

        assert_eq!(policy.on_failure(&mut item, &err), FailureDisposition::Retry);
        assert_eq!(policy.on_failure(&mut item, &err), FailureDisposition::Retry);
        assert_eq!(policy.on_failure(&mut item, &err), FailureDisposition::Parked);
        assert_eq!(item.status, ItemStatus::Error);
        assert_eq!(item.attempts, 3);
    }

    #[test]
    fn connectivity_failures_never_park() {
        let policy = ReplayPolicy::new(3);
        let mut item = item();
        item.status = ItemStatus::Syncing;

        for _ in 0..20 {
            assert_eq!(
                policy.on_failure(&mut item, &RemoteError::Network("unreachable".into())),
                FailureDisposition::Retry
            );
            assert_eq!(
                policy.on_failure(&mut item, &RemoteError::Timeout),
                FailureDisposition::Retry
            );
        }

        assert_eq!(item.status, ItemStatus::Pending);
        assert_eq!(item.attempts, 0);
        assert_eq!(item.last_error.as_deref(), Some(RemoteError::Timeout.to_string().as_str()));
    }

    #[test]
    fn zero_means_unlimited() {
        assert_eq!(ReplayPolicy::new(0), ReplayPolicy::unlimited());

        let policy = ReplayPolicy::unlimited();
        let mut item = item();
        for _ in 0..100 {
            assert_eq!(
                policy.on_failure(&mut item, &RemoteError::RateLimited),
                FailureDisposition::Retry
            );
        }
        assert_eq!(item.attempts, 100);
    }

    #[test]
    fn unlimited_still_parks_permanent_rejections() {
        let policy = ReplayPolicy::unlimited();
        let mut item = item();
        assert_eq!(
            policy.on_failure(&mut item, &RemoteError::Unauthorized),
            FailureDisposition::Parked
        );
    }
}
