//! # sync-client
//!
//! Offline-first write pipeline for field applications.
//!
//! Writes issued without connectivity are captured in a durable queue and
//! replayed once a network path reappears.
//!
//! ## Components
//!
//! - **Durable queue**: [`OperationQueue`] over a pluggable [`KeyValueStore`]
//! - **Connectivity**: [`ConnectivityMonitor`] turns platform signals into edges
//! - **Sync engine**: [`SyncEngine`] drains the queue, one pass at a time
//! - **Retry**: [`RetryExecutor`] absorbs rate limiting and outages with doubling backoff
//! - **Domain services**: listings, loans, claims, diagnoses (queueable) and payments (live only)
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sync_client::*;
//!
//! let queue = Arc::new(OperationQueue::new(Arc::new(FileStore::open(&dir)?)));
//! let remote: Arc<dyn RemoteEndpoint> = Arc::new(MockRemote::new());
//! let monitor = ConnectivityMonitor::new(false);
//!
//! let gateway = Arc::new(WriteGateway::new(
//!     Arc::clone(&queue),
//!     Arc::clone(&remote),
//!     monitor.clone(),
//!     RetryExecutor::default(),
//! ));
//! let engine = Arc::new(SyncEngine::new(queue, remote, RetryExecutor::default(), ReplayPolicy::default()));
//! let _task = spawn_sync_task(engine, &monitor);
//!
//! // Offline: queued, replayed on reconnect
//! ListingService::new(gateway).create(&listing).await?;
//! monitor.set_online(true);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod connectivity;
pub mod engine;
pub mod queue;
pub mod remote;
pub mod retry;
pub mod services;
pub mod store;

pub use connectivity::{ConnectivityMonitor, OnlineSignals};
pub use engine::{spawn_sync_task, PassOutcome, SyncEngine, SyncReport};
pub use queue::{OperationQueue, QueueChanged, DEFAULT_QUEUE_KEY};
pub use remote::{MockRemote, RecordedCall, RemoteEndpoint};
pub use retry::RetryExecutor;
pub use services::{
    endpoint_for, ClaimService, DiagnosisRequest, DiagnosisService, InsuranceClaim, Listing,
    ListingService, LoanApplication, LoanService, Payment, PaymentService, WriteError,
    WriteGateway, CLAIM_ENDPOINT, DIAGNOSIS_ENDPOINT, LISTING_ENDPOINT, LOAN_ENDPOINT, PAYMENT_ENDPOINT,
};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError, StoreResult};

pub use sync_core::{ReplayPolicy, RetryPolicy};
pub use sync_types::{Accepted, ItemId, ItemStatus, OperationType, QueueItem, RemoteError};

#[cfg(test)]
mod tests {
    use serde_json::json;

    #[test]
    fn diagnosis_request_is_usable_from_crate_root() {
        let request = crate::DiagnosisRequest {
            crop: "Tomato".into(),
            symptoms: "leaf curl".into(),
            image: None,
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "crop": "Tomato", "symptoms": "leaf curl" })
        );
    }
}
