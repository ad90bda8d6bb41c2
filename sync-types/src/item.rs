//! Queued write operations and their lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ItemId;

/// Tag identifying the domain operation behind a queued write.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OperationType {
    /// Marketplace produce listing.
    Listing,
    /// Loan application.
    Loan,
    /// Insurance claim.
    Claim,
    /// Crop diagnosis request.
    Diagnosis,
    /// Any other operation, by tag.
    Other(String),
}

impl OperationType {
    /// The tag as stored on disk.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Listing => "listing",
            Self::Loan => "loan",
            Self::Claim => "claim",
            Self::Diagnosis => "diagnosis",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for OperationType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "listing" => Self::Listing,
            "loan" => Self::Loan,
            "claim" => Self::Claim,
            "diagnosis" => Self::Diagnosis,
            _ => Self::Other(tag),
        }
    }
}

impl From<&str> for OperationType {
    fn from(tag: &str) -> Self {
        Self::from(tag.to_string())
    }
}

impl From<OperationType> for String {
    fn from(op: OperationType) -> Self {
        match op {
            OperationType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Replay status of a queued write.
///
/// There is no `Synced` status: a successfully replayed item is removed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Waiting for the next sync pass.
    #[default]
    Pending,
    /// Being replayed by the current sync pass.
    Syncing,
    /// Parked after a permanent failure or too many failed passes.
    /// Skipped by sync passes until requeued.
    Error,
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Syncing => "syncing",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// One durably persisted write operation awaiting delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    /// Unique id, assigned at enqueue time.
    pub id: ItemId,
    /// Domain operation tag.
    pub operation_type: OperationType,
    /// Logical target the item is replayed against (e.g. `/bank/loan-apply`).
    pub endpoint: String,
    /// Opaque payload, sent unmodified on replay.
    pub payload: serde_json::Value,
    /// Enqueue time. Diagnostic only, never used for expiry.
    pub created_at: DateTime<Utc>,
    /// Replay status.
    #[serde(default)]
    pub status: ItemStatus,
    /// Number of sync passes in which replay of this item failed.
    #[serde(default)]
    pub attempts: u32,
    /// Message of the most recent replay failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl QueueItem {
    /// Create a new pending item.
    pub fn new(
        id: ItemId,
        operation_type: OperationType,
        endpoint: impl Into<String>,
        payload: serde_json::Value,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            operation_type,
            endpoint: endpoint.into(),
            payload,
            created_at,
            status: ItemStatus::Pending,
            attempts: 0,
            last_error: None,
        }
    }

    /// Whether a sync pass should replay this item.
    pub fn is_replayable(&self) -> bool {
        self.status != ItemStatus::Error
    }
}

/// Outcome of a domain write.
///
/// Distinguishes a server-confirmed write from one that was only durably
/// queued for later replay (the optimistic path).
#[derive(Debug, Clone, PartialEq)]
pub enum Accepted {
    /// The remote endpoint accepted the write.
    Confirmed {
        /// Response body returned by the endpoint.
        response: serde_json::Value,
    },
    /// The write was queued and will be replayed once connectivity returns.
    Queued {
        /// The queued item.
        item: QueueItem,
    },
}

impl Accepted {
    /// Whether the write has been confirmed by the server.
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }

    /// Whether the write is only queued.
    pub fn is_queued(&self) -> bool {
        matches!(self, Self::Queued { .. })
    }
}
