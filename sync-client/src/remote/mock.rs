//! Mock remote for testing.
//!
//! Allows scripting failures per endpoint and capturing calls for verification.

use super::RemoteEndpoint;
use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use sync_types::RemoteError;

/// A call observed by [`MockRemote`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Endpoint called.
    pub endpoint: String,
    /// Payload sent.
    pub payload: serde_json::Value,
}

/// Mock remote for testing.
///
/// Calls succeed with `{"ok": true}` unless a failure is scripted.
/// Clones share state.
#[derive(Debug, Default, Clone)]
pub struct MockRemote {
    inner: Arc<Mutex<MockRemoteInner>>,
}

#[derive(Debug, Default)]
struct MockRemoteInner {
    calls: Vec<RecordedCall>,
    scripted: HashMap<String, VecDeque<RemoteError>>,
    always_fail: HashMap<String, RemoteError>,
    latency: Option<Duration>,
    in_flight: usize,
    max_in_flight: usize,
}

impl MockRemote {
    /// Create a mock that accepts every call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cause the next call to `endpoint` to fail with `error`.
    ///
    /// Failures queue up: calling this twice fails the next two calls.
    pub fn fail_next(&self, endpoint: &str, error: RemoteError) {
        self.lock()
            .scripted
            .entry(endpoint.to_string())
            .or_default()
            .push_back(error);
    }

    /// Cause every call to `endpoint` to fail with `error` until cleared.
    pub fn fail_always(&self, endpoint: &str, error: RemoteError) {
        self.lock().always_fail.insert(endpoint.to_string(), error);
    }

    /// Clear scripted failures for `endpoint`.
    pub fn recover(&self, endpoint: &str) {
        let mut inner = self.lock();
        inner.scripted.remove(endpoint);
        inner.always_fail.remove(endpoint);
    }

    /// Make every call take `latency` to complete.
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = Some(latency);
    }

    /// All calls received, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// Calls received for one endpoint.
    pub fn calls_to(&self, endpoint: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.endpoint == endpoint)
            .count()
    }

    /// Highest number of calls that were in flight at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.lock().max_in_flight
    }

    fn lock(&self) -> MutexGuard<'_, MockRemoteInner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl RemoteEndpoint for MockRemote {
    async fn call(
        &self,
        endpoint: &str,
        payload: &serde_json::Value,
    ) -> Result<serde_json::Value, RemoteError> {
        let latency = {
            let mut inner = self.lock();
            inner.calls.push(RecordedCall {
                endpoint: endpoint.to_string(),
                payload: payload.clone(),
            });
            inner.in_flight += 1;
            inner.max_in_flight = inner.max_in_flight.max(inner.in_flight);
            inner.latency
        };

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut inner = self.lock();
        inner.in_flight -= 1;

        if let Some(error) = inner.always_fail.get(endpoint) {
            return Err(error.clone());
        }
        if let Some(error) = inner
            .scripted
            .get_mut(endpoint)
            .and_then(|queue| queue.pop_front())
        {
            return Err(error);
        }
        Ok(json!({ "ok": true, "endpoint": endpoint }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn accepts_by_default_and_records() {
        let remote = MockRemote::new();
        let payload = json!({"crop": "Onion"});

        let response = remote.call("/marketplace/listing", &payload).await.unwrap();

        assert_eq!(response["ok"], true);
        assert_eq!(
            remote.calls(),
            vec![RecordedCall {
                endpoint: "/marketplace/listing".into(),
                payload,
            }]
        );
    }

    #[tokio::test]
    async fn scripted_failures_are_consumed_in_order() {
        let remote = MockRemote::new();
        remote.fail_next("/x", RemoteError::RateLimited);
        remote.fail_next("/x", RemoteError::Unavailable);

        assert_eq!(
            remote.call("/x", &json!({})).await,
            Err(RemoteError::RateLimited)
        );
        assert_eq!(
            remote.call("/x", &json!({})).await,
            Err(RemoteError::Unavailable)
        );
        assert!(remote.call("/x", &json!({})).await.is_ok());
    }

    #[tokio::test]
    async fn failures_are_per_endpoint() {
        let remote = MockRemote::new();
        remote.fail_always("/down", RemoteError::Network("unreachable".into()));

        assert!(remote.call("/down", &json!({})).await.is_err());
        assert!(remote.call("/up", &json!({})).await.is_ok());

        remote.recover("/down");
        assert!(remote.call("/down", &json!({})).await.is_ok());
        assert_eq!(remote.calls_to("/down"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn tracks_concurrency() {
        let remote = MockRemote::new();
        remote.set_latency(Duration::from_millis(100));

        let payload = json!({});
        let (a, b) = tokio::join!(remote.call("/a", &payload), remote.call("/b", &payload));

        assert!(a.is_ok() && b.is_ok());
        assert_eq!(remote.max_in_flight(), 2);
    }

    #[tokio::test]
    async fn clone_shares_state() {
        let remote = MockRemote::new();
        let other = remote.clone();

        other.call("/a", &json!({})).await.unwrap();
        assert_eq!(remote.calls().len(), 1);
    }
}
