//! Durable key-value storage for the offline queue.
//!
//! The queue persists its whole snapshot under a single key and always
//! reads the whole value back; backends never see partial updates.
//!
//! - [`FileStore`]: one file per key in a directory, replaced atomically
//! - [`MemoryStore`]: in-process map for tests; clones share state, so a
//!   "restart" is simulated by reopening a queue over a clone

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid key.
    #[error("invalid store key: {0:?}")]
    InvalidKey(String),

    /// Backend refused the write (e.g. quota exceeded).
    #[error("write rejected: {0}")]
    WriteRejected(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A durable keyed store holding serialized values.
///
/// Operations are synchronous: a queue mutation reads, modifies, and writes
/// the snapshot without suspending in between.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Durably replace the value stored under `key`.
    fn put(&self, key: &str, value: &str) -> StoreResult<()>;
}
