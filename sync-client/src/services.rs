//! Domain write services.
//!
//! Every mutating call from the application goes through a [`WriteGateway`],
//! which decides per call whether to hit the remote now or queue the write
//! for replay:
//!
//! | Connectivity | Remote result            | Outcome                      |
//! |--------------|--------------------------|------------------------------|
//! | offline      | (not called)             | `Accepted::Queued`           |
//! | online       | success                  | `Accepted::Confirmed`        |
//! | online       | network error / timeout  | `Accepted::Queued`           |
//! | online       | any other failure        | `Err(WriteError::Remote)`    |
//!
//! Payments are live-only: they are never queued and fail with
//! [`WriteError::RequiresConnectivity`] instead.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sync_types::{Accepted, OperationType, RemoteError};
use thiserror::Error;

use crate::connectivity::ConnectivityMonitor;
use crate::queue::OperationQueue;
use crate::remote::RemoteEndpoint;
use crate::retry::RetryExecutor;
use crate::store::StoreError;

/// Endpoint for marketplace listings.
pub const LISTING_ENDPOINT: &str = "/marketplace/listing";
/// Endpoint for loan applications.
pub const LOAN_ENDPOINT: &str = "/bank/loan-apply";
/// Endpoint for insurance claims.
pub const CLAIM_ENDPOINT: &str = "/insurance/claim";
/// Endpoint for crop diagnosis requests.
pub const DIAGNOSIS_ENDPOINT: &str = "/advisor/diagnosis";
/// Endpoint for payments (live only).
pub const PAYMENT_ENDPOINT: &str = "/payments/transfer";

/// Endpoint that a queueable operation is sent to.
///
/// Returns `None` for extension tags without a built-in endpoint.
pub fn endpoint_for(operation: &OperationType) -> Option<&'static str> {
    match operation {
        OperationType::Listing => Some(LISTING_ENDPOINT),
        OperationType::Loan => Some(LOAN_ENDPOINT),
        OperationType::Claim => Some(CLAIM_ENDPOINT),
        OperationType::Diagnosis => Some(DIAGNOSIS_ENDPOINT),
        OperationType::Other(_) => None,
    }
}

/// Write errors.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The remote rejected the write or retries ran out.
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// The write could not be queued.
    #[error("queue error: {0}")]
    Store(#[from] StoreError),

    /// A live-only operation was attempted without connectivity.
    #[error("{operation} requires connectivity")]
    RequiresConnectivity {
        /// Operation name.
        operation: String,
    },

    /// Payload could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Shared online/offline decision for all domain services.
pub struct WriteGateway {
    queue: Arc<OperationQueue>,
    remote: Arc<dyn RemoteEndpoint>,
    monitor: ConnectivityMonitor,
    executor: RetryExecutor,
}

impl std::fmt::Debug for WriteGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteGateway")
            .field("queue", &self.queue)
            .field("monitor", &self.monitor)
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}

impl WriteGateway {
    /// Create a gateway.
    pub fn new(
        queue: Arc<OperationQueue>,
        remote: Arc<dyn RemoteEndpoint>,
        monitor: ConnectivityMonitor,
        executor: RetryExecutor,
    ) -> Self {
        Self {
            queue,
            remote,
            monitor,
            executor,
        }
    }

    /// The queue writes are parked in.
    pub fn queue(&self) -> &Arc<OperationQueue> {
        &self.queue
    }

    /// The connectivity monitor consulted per call.
    pub fn monitor(&self) -> &ConnectivityMonitor {
        &self.monitor
    }

    /// Submit a queueable write.
    ///
    /// Offline, or online but unreachable, the write is queued and
    /// `Accepted::Queued` is returned. Other remote failures propagate.
    pub async fn submit(
        &self,
        operation_type: OperationType,
        endpoint: &str,
        payload: serde_json::Value,
    ) -> Result<Accepted, WriteError> {
        if !self.monitor.is_online() {
            return self.enqueue(operation_type, endpoint, payload);
        }

        let result = self
            .executor
            .run(|| self.remote.call(endpoint, &payload))
            .await;

        match result {
            Ok(response) => {
                tracing::debug!("{} confirmed by {}", operation_type, endpoint);
                Ok(Accepted::Confirmed { response })
            }
            Err(e) if e.is_connectivity() => {
                tracing::info!("{} unreachable ({}), queueing {}", endpoint, e, operation_type);
                self.enqueue(operation_type, endpoint, payload)
            }
            Err(e) => Err(WriteError::Remote(e)),
        }
    }

    /// Submit a write that must reach the remote now.
    ///
    /// Never queues. Offline, or a connectivity failure, yields
    /// [`WriteError::RequiresConnectivity`].
    pub async fn submit_live(
        &self,
        operation: &str,
        endpoint: &str,
        payload: serde_json::Value,
    ) -> Result<serde_json::Value, WriteError> {
        let requires_connectivity = || WriteError::RequiresConnectivity {
            operation: operation.to_string(),
        };

        if !self.monitor.is_online() {
            return Err(requires_connectivity());
        }

        self.executor
            .run(|| self.remote.call(endpoint, &payload))
            .await
            .map_err(|e| {
                if e.is_connectivity() {
                    requires_connectivity()
                } else {
                    WriteError::Remote(e)
                }
            })
    }

    fn enqueue(
        &self,
        operation_type: OperationType,
        endpoint: &str,
        payload: serde_json::Value,
    ) -> Result<Accepted, WriteError> {
        let item = self.queue.enqueue(operation_type, endpoint, payload)?;
        Ok(Accepted::Queued { item })
    }
}

/// A crop listing for the marketplace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Crop name.
    pub crop: String,
    /// Quantity offered in kilograms.
    pub quantity_kg: f64,
    /// Asking price per kilogram.
    pub price_per_kg: f64,
    /// Pickup location.
    pub location: String,
}

/// A loan application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplication {
    /// Applicant identifier.
    pub farmer_id: String,
    /// Requested amount.
    pub amount: f64,
    /// Purpose of the loan.
    pub purpose: String,
    /// Repayment period in months.
    pub tenure_months: u32,
}

/// A crop insurance claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceClaim {
    /// Policy the claim is filed against.
    pub policy_id: String,
    /// Affected crop.
    pub crop: String,
    /// Cause of damage.
    pub cause: String,
    /// Estimated loss.
    pub estimated_loss: f64,
}

/// A crop diagnosis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisRequest {
    /// Affected crop.
    pub crop: String,
    /// Observed symptoms.
    pub symptoms: String,
    /// Optional encoded photo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A payment transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// Payer account.
    pub from: String,
    /// Payee account.
    pub to: String,
    /// Amount to transfer.
    pub amount: f64,
}

/// Marketplace listings.
#[derive(Debug, Clone)]
pub struct ListingService {
    gateway: Arc<WriteGateway>,
}

impl ListingService {
    /// Create the service.
    pub fn new(gateway: Arc<WriteGateway>) -> Self {
        Self { gateway }
    }

    /// Publish a listing, queueing it when offline.
    pub async fn create(&self, listing: &Listing) -> Result<Accepted, WriteError> {
        let payload = serde_json::to_value(listing)?;
        self.gateway
            .submit(OperationType::Listing, LISTING_ENDPOINT, payload)
            .await
    }
}

/// Loan applications.
#[derive(Debug, Clone)]
pub struct LoanService {
    gateway: Arc<WriteGateway>,
}

impl LoanService {
    /// Create the service.
    pub fn new(gateway: Arc<WriteGateway>) -> Self {
        Self { gateway }
    }

    /// Submit an application, queueing it when offline.
    pub async fn apply(&self, application: &LoanApplication) -> Result<Accepted, WriteError> {
        let payload = serde_json::to_value(application)?;
        self.gateway
            .submit(OperationType::Loan, LOAN_ENDPOINT, payload)
            .await
    }
}

/// Insurance claims.
#[derive(Debug, Clone)]
pub struct ClaimService {
    gateway: Arc<WriteGateway>,
}

impl ClaimService {
    /// Create the service.
    pub fn new(gateway: Arc<WriteGateway>) -> Self {
        Self { gateway }
    }

    /// File a claim, queueing it when offline.
    pub async fn file(&self, claim: &InsuranceClaim) -> Result<Accepted, WriteError> {
        let payload = serde_json::to_value(claim)?;
        self.gateway
            .submit(OperationType::Claim, CLAIM_ENDPOINT, payload)
            .await
    }
}

/// Crop diagnosis requests.
#[derive(Debug, Clone)]
pub struct DiagnosisService {
    gateway: Arc<WriteGateway>,
}

impl DiagnosisService {
    /// Create the service.
    pub fn new(gateway: Arc<WriteGateway>) -> Self {
        Self { gateway }
    }

    /// Request a diagnosis, queueing it when offline.
    pub async fn request(&self, request: &DiagnosisRequest) -> Result<Accepted, WriteError> {
        let payload = serde_json::to_value(request)?;
        self.gateway
            .submit(OperationType::Diagnosis, DIAGNOSIS_ENDPOINT, payload)
            .await
    }
}

/// Payments. Live only.
#[derive(Debug, Clone)]
pub struct PaymentService {
    gateway: Arc<WriteGateway>,
}

impl PaymentService {
    /// Create the service.
    pub fn new(gateway: Arc<WriteGateway>) -> Self {
        Self { gateway }
    }

    /// Transfer funds. Returns the remote's confirmation.
    pub async fn pay(&self, payment: &Payment) -> Result<serde_json::Value, WriteError> {
        let payload = serde_json::to_value(payment)?;
        self.gateway
            .submit_live("payment", PAYMENT_ENDPOINT, payload)
            .await
    }
}
