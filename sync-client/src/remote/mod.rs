//! Remote endpoint abstraction.
//!
//! A queued item names a logical endpoint (e.g. `/marketplace/listing`);
//! a [`RemoteEndpoint`] resolves that name to an actual remote call and
//! classifies failures as [`RemoteError`]s.
//!
//! # Example
//!
//! ```ignore
//! let remote = MockRemote::new();
//! remote.fail_next("/bank/loan-apply", RemoteError::RateLimited);
//! let response = remote.call("/bank/loan-apply", &payload).await?;
//! ```

mod mock;

pub use mock::{MockRemote, RecordedCall};

use async_trait::async_trait;
use sync_types::RemoteError;

/// Remote service reachable by logical endpoint name.
///
/// Implementations handle the underlying mechanism (HTTP, mock, etc).
#[async_trait]
pub trait RemoteEndpoint: Send + Sync {
    /// Send `payload` to `endpoint` and return the response body.
    async fn call(
        &self,
        endpoint: &str,
        payload: &serde_json::Value,
    ) -> Result<serde_json::Value, RemoteError>;
}
