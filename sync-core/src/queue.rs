//! In-memory snapshot of the offline write queue.
//!
//! This module provides the ordered list of queued writes with:
//! - FIFO ordering (items only ever appended at the tail)
//! - Removal by id after confirmed delivery
//! - Id allocation that stays unique across reloads, even once the queue
//!   has drained
//!
//! The snapshot is what the durable queue in sync-client reads from and
//! writes back to its store on every mutation. It knows nothing about
//! persistence itself.

use chrono::{DateTime, Utc};
use sync_types::{ItemId, ItemStatus, OperationType, QueueItem};

/// Ordered snapshot of queued writes, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingQueue {
    items: Vec<QueueItem>,
    /// Highest id ever issued, kept after that item is removed.
    last_issued: Option<ItemId>,
}

impl PendingQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a queue from persisted items, in id order.
    ///
    /// `last_issued` is the persisted high-water mark; new ids are
    /// allocated after it and after every item present.
    pub fn from_items(mut items: Vec<QueueItem>, last_issued: Option<ItemId>) -> Self {
        items.sort_by_key(|item| item.id);
        items.dedup_by_key(|item| item.id);
        Self { items, last_issued }
    }

    /// Return items left `syncing` by an interrupted pass to `pending`.
    ///
    /// Call once after loading a snapshot written by a previous process.
    /// Returns the number of items reset.
    pub fn reset_interrupted(&mut self) -> usize {
        let mut count = 0;
        for item in &mut self.items {
            if item.status == ItemStatus::Syncing {
                item.status = ItemStatus::Pending;
                count += 1;
            }
        }
        count
    }

    /// Append a new pending item at the tail and return a copy of it.
    pub fn enqueue(
        &mut self,
        operation_type: OperationType,
        endpoint: impl Into<String>,
        payload: serde_json::Value,
        now: DateTime<Utc>,
    ) -> QueueItem {
        let now_millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let id = ItemId::next_after(self.last_id(), now_millis);
        let item = QueueItem::new(id, operation_type, endpoint, payload, now);
        self.last_issued = Some(id);
        self.items.push(item.clone());
        item
    }

    /// Remove the item with the given id. Returns it if it was present.
    pub fn remove(&mut self, id: &ItemId) -> Option<QueueItem> {
        let index = self.items.iter().position(|item| &item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Mutable lookup by id.
    pub fn get_mut(&mut self, id: &ItemId) -> Option<&mut QueueItem> {
        self.items.iter_mut().find(|item| &item.id == id)
    }

    /// All items, oldest first.
    pub fn items(&self) -> &[QueueItem] {
        &self.items
    }

    /// Consume the queue, yielding its items oldest first.
    pub fn into_items(self) -> Vec<QueueItem> {
        self.items
    }

    /// Copy of the items a sync pass should replay, oldest first.
    pub fn replayable(&self) -> Vec<QueueItem> {
        self.items
            .iter()
            .filter(|item| item.is_replayable())
            .cloned()
            .collect()
    }

    /// Move every parked item back to `pending` with a fresh attempt count.
    ///
    /// Returns the number of items requeued.
    pub fn requeue_errored(&mut self) -> usize {
        let mut count = 0;
        for item in &mut self.items {
            if item.status == ItemStatus::Error {
                item.status = ItemStatus::Pending;
                item.attempts = 0;
                item.last_error = None;
                count += 1;
            }
        }
        count
    }

    /// Highest id this queue has issued or holds, if any.
    ///
    /// Persist this with the items so ids are never reused.
    pub fn last_id(&self) -> Option<ItemId> {
        let newest = self.items.last().map(|item| item.id);
        newest.max(self.last_issued)
    }

    /// Number of items a sync pass would replay.
    pub fn pending_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_replayable()).count()
    }

    /// Number of parked items.
    pub fn error_count(&self) -> usize {
        self.items.len() - self.pending_count()
    }
}
