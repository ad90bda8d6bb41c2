//! Remote call failures.

use thiserror::Error;

/// Errors returned by a remote endpoint call.
///
/// The classification drives the retry executor: only
/// [`RateLimited`](RemoteError::RateLimited) and
/// [`Unavailable`](RemoteError::Unavailable) are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The service is rate limiting this client (HTTP 429).
    #[error("rate limited")]
    RateLimited,

    /// The service is temporarily unavailable (HTTP 503).
    #[error("service unavailable")]
    Unavailable,

    /// Authentication or authorization failed (HTTP 401/403).
    #[error("unauthorized")]
    Unauthorized,

    /// The request was rejected (validation failure or other non-2xx status).
    #[error("rejected with status {status}: {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// No network path to the endpoint.
    #[error("network error: {0}")]
    Network(String),

    /// The call did not complete in time.
    #[error("request timed out")]
    Timeout,
}

impl RemoteError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            429 => Self::RateLimited,
            503 => Self::Unavailable,
            401 | 403 => Self::Unauthorized,
            _ => Self::Rejected {
                status,
                message: message.into(),
            },
        }
    }

    /// Whether the failure is transient and the call should be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Unavailable)
    }

    /// Whether the failure means the endpoint could not be reached at all.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout)
    }

    /// Whether retrying later can never succeed without changing the request.
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::Rejected { .. })
    }
}
