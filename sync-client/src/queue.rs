//! Durable operation queue.
//!
//! [`OperationQueue`] is the single owner of the persisted queue snapshot.
//! It is constructed once per process over a [`KeyValueStore`] and shared
//! (via `Arc`) by the write services and the sync engine.
//!
//! Every mutation reads the full snapshot, applies the change, and writes
//! the full snapshot back while holding the queue lock, so concurrent
//! callers cannot lose each other's updates. Nothing is awaited while the
//! lock is held.
//!
//! The snapshot is stored as `{ "lastId": ..., "items": [...] }` so the id
//! high-water mark outlives the items it was issued to. A bare item array
//! from earlier versions is still accepted.
//!
//! Malformed persisted data fails closed: it is logged and treated as an
//! empty queue. Items a previous process left `syncing` are returned to
//! `pending` on the first load.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sync_core::{FailureDisposition, PendingQueue, ReplayPolicy};
use sync_types::{ItemId, ItemStatus, OperationType, QueueItem, RemoteError};
use tokio::sync::broadcast;

use crate::store::{KeyValueStore, StoreResult};

/// Default store key holding the queue snapshot.
pub const DEFAULT_QUEUE_KEY: &str = "offline-queue";

const EVENT_CAPACITY: usize = 64;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRef<'a> {
    last_id: Option<ItemId>,
    items: &'a [QueueItem],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Snapshot {
    #[serde(rename_all = "camelCase")]
    Envelope {
        #[serde(default)]
        last_id: Option<ItemId>,
        items: Vec<QueueItem>,
    },
    Items(Vec<QueueItem>),
}

impl Snapshot {
    fn into_queue(self) -> PendingQueue {
        match self {
            Snapshot::Envelope { last_id, items } => PendingQueue::from_items(items, last_id),
            Snapshot::Items(items) => PendingQueue::from_items(items, None),
        }
    }
}

#[derive(Debug, Default)]
struct QueueState {
    /// Whether interrupted items from a previous process have been reset.
    recovered: bool,
}

/// Queue-changed notification.
///
/// Purely informational (e.g. a pending-count badge); never used for
/// correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueChanged {
    /// Items a sync pass would replay after the change.
    pub pending: usize,
}

/// Durable, append-only (until removal) queue of pending writes.
pub struct OperationQueue {
    store: Arc<dyn KeyValueStore>,
    key: String,
    lock: Mutex<QueueState>,
    events: broadcast::Sender<QueueChanged>,
}

impl std::fmt::Debug for OperationQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationQueue")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl OperationQueue {
    /// Open the queue stored under [`DEFAULT_QUEUE_KEY`].
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, DEFAULT_QUEUE_KEY)
    }

    /// Open the queue stored under `key`.
    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store,
            key: key.into(),
            lock: Mutex::new(QueueState::default()),
            events,
        }
    }

    /// Subscribe to queue-changed notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<QueueChanged> {
        self.events.subscribe()
    }

    /// Append a write to the tail of the queue and persist it.
    pub fn enqueue(
        &self,
        operation_type: OperationType,
        endpoint: &str,
        payload: serde_json::Value,
    ) -> StoreResult<QueueItem> {
        let (item, pending) = self.mutate(|queue| {
            let item = queue.enqueue(operation_type, endpoint, payload, Utc::now());
            (item, queue.pending_count())
        })?;

        tracing::debug!(
            "Queued {} {} for {} ({} pending)",
            item.operation_type,
            item.id,
            item.endpoint,
            pending
        );
        self.notify_count(pending);
        Ok(item)
    }

    /// All queued items, oldest first (pending and parked).
    pub fn list(&self) -> StoreResult<Vec<QueueItem>> {
        let mut state = self.lock();
        Ok(self.load(&mut state)?.into_items())
    }

    /// Remove the item with the given id.
    ///
    /// Removing an id that is not queued is a no-op and returns `false`.
    /// Either way the snapshot is persisted and a notification is emitted.
    pub fn remove(&self, id: &ItemId) -> StoreResult<bool> {
        let (removed, pending) = self.mutate(|queue| {
            let removed = queue.remove(id).is_some();
            (removed, queue.pending_count())
        })?;
        self.notify_count(pending);
        Ok(removed)
    }

    /// Number of items a sync pass would replay.
    pub fn count(&self) -> StoreResult<usize> {
        let mut state = self.lock();
        Ok(self.load(&mut state)?.pending_count())
    }

    /// Number of parked items.
    pub fn error_count(&self) -> StoreResult<usize> {
        let mut state = self.lock();
        Ok(self.load(&mut state)?.error_count())
    }

    /// Move every parked item back to `pending`. Returns how many moved.
    pub fn requeue_errored(&self) -> StoreResult<usize> {
        let (count, pending) = self.mutate(|queue| {
            let count = queue.requeue_errored();
            (count, queue.pending_count())
        })?;
        if count > 0 {
            tracing::info!("Requeued {} parked items", count);
            self.notify_count(pending);
        }
        Ok(count)
    }

    /// Snapshot of the items a sync pass should replay, oldest first.
    pub(crate) fn replayable(&self) -> StoreResult<Vec<QueueItem>> {
        let mut state = self.lock();
        Ok(self.load(&mut state)?.replayable())
    }

    /// Mark an item as being replayed.
    ///
    /// Returns `false` if the item is no longer queued.
    pub(crate) fn mark_syncing(&self, id: &ItemId) -> StoreResult<bool> {
        self.mutate(|queue| match queue.get_mut(id) {
            Some(item) => {
                item.status = ItemStatus::Syncing;
                true
            }
            None => false,
        })
    }

    /// Remove a successfully replayed item without emitting a notification.
    pub(crate) fn complete(&self, id: &ItemId) -> StoreResult<bool> {
        self.mutate(|queue| queue.remove(id).is_some())
    }

    /// Record a failed replay and apply the replay policy.
    ///
    /// Returns `None` if the item is no longer queued.
    pub(crate) fn record_failure(
        &self,
        id: &ItemId,
        error: &RemoteError,
        policy: &ReplayPolicy,
    ) -> StoreResult<Option<FailureDisposition>> {
        self.mutate(|queue| queue.get_mut(id).map(|item| policy.on_failure(item, error)))
    }

    /// Emit a notification with the current pending count.
    pub(crate) fn notify(&self) -> StoreResult<usize> {
        let pending = self.count()?;
        self.notify_count(pending);
        Ok(pending)
    }

    fn notify_count(&self, pending: usize) {
        // No subscribers is fine
        let _ = self.events.send(QueueChanged { pending });
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut PendingQueue) -> R) -> StoreResult<R> {
        let mut state = self.lock();
        let mut queue = self.load(&mut state)?;
        let result = f(&mut queue);
        self.save(&queue)?;
        Ok(result)
    }

    fn load(&self, state: &mut QueueState) -> StoreResult<PendingQueue> {
        let Some(raw) = self.store.get(&self.key)? else {
            state.recovered = true;
            return Ok(PendingQueue::new());
        };
        match serde_json::from_str::<Snapshot>(&raw) {
            Ok(snapshot) => {
                let mut queue = snapshot.into_queue();
                if !state.recovered {
                    let reset = queue.reset_interrupted();
                    if reset > 0 {
                        tracing::info!("Reset {} items interrupted mid-sync", reset);
                        self.save(&queue)?;
                    }
                    state.recovered = true;
                }
                Ok(queue)
            }
            Err(e) => {
                tracing::warn!(
                    "Discarding malformed queue snapshot under {:?}: {}",
                    self.key,
                    e
                );
                Ok(PendingQueue::new())
            }
        }
    }

    fn save(&self, queue: &PendingQueue) -> StoreResult<()> {
        let raw = serde_json::to_string(&SnapshotRef {
            last_id: queue.last_id(),
            items: queue.items(),
        })?;
        self.store.put(&self.key, &raw)
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
