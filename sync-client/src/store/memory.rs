//! In-memory store for testing.
//!
//! Clones share state, so dropping a queue and reopening one over a clone
//! behaves like a process restart against the same durable store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{KeyValueStore, StoreError, StoreResult};

/// In-memory key-value store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    values: HashMap<String, String>,
    fail_next_put: Option<String>,
    puts: usize,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cause the next `put()` to fail with the given reason.
    pub fn fail_next_put(&self, reason: &str) {
        self.lock().fail_next_put = Some(reason.to_string());
    }

    /// Number of successful writes so far.
    pub fn put_count(&self) -> usize {
        self.lock().puts
    }

    fn lock(&self) -> MutexGuard<'_, MemoryStoreInner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.lock().values.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut inner = self.lock();
        if let Some(reason) = inner.fail_next_put.take() {
            return Err(StoreError::WriteRejected(reason));
        }
        inner.values.insert(key.to_string(), value.to_string());
        inner.puts += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.put("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));

        store.put("k", "w").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("w"));
    }

    #[test]
    fn clone_shares_state() {
        let store = MemoryStore::new();
        let other = store.clone();

        store.put("k", "v").unwrap();
        assert_eq!(other.get("k").unwrap().as_deref(), Some("v"));
        assert_eq!(other.put_count(), 1);
    }

    #[test]
    fn forced_put_failure() {
        let store = MemoryStore::new();
        store.fail_next_put("quota exceeded");

        let result = store.put("k", "v");
        assert!(matches!(result, Err(StoreError::WriteRejected(_))));
        assert_eq!(store.get("k").unwrap(), None);

        // Next put should work
        store.put("k", "v").unwrap();
        assert_eq!(store.put_count(), 1);
    }
}
