//! Synchronization engine.
//!
//! Drains the [`OperationQueue`] by replaying each queued write against its
//! endpoint through the [`RetryExecutor`].
//!
//! # Pass algorithm
//!
//! 1. If another pass is in flight, coalesce (return without replaying).
//! 2. Snapshot the replayable items. Items enqueued during the pass wait
//!    for the next one. An empty snapshot ends the pass immediately.
//! 3. For each item, oldest first: mark it `syncing`, replay it, remove it
//!    on success, or record the failure and move on. One failing item
//!    never blocks the items behind it.
//! 4. Emit a single queue-changed notification.
//!
//! ```text
//! reconnect edge / manual drain → SyncEngine → RetryExecutor → RemoteEndpoint
//!                                     ↓
//!                          sync-core (pass gate, replay policy)
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use sync_core::{FailureDisposition, PassAction, PassEvent, ReplayPolicy, SyncPhase};
use tokio::task::JoinHandle;

use crate::connectivity::ConnectivityMonitor;
use crate::queue::OperationQueue;
use crate::remote::RemoteEndpoint;
use crate::retry::RetryExecutor;
use crate::store::StoreResult;

/// How a drain request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// Nothing to replay.
    Empty,
    /// The snapshot was fully processed.
    Completed,
    /// Another pass was already in flight; this trigger was dropped.
    Coalesced,
}

/// Summary of one drain request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    /// How the request ended.
    pub outcome: PassOutcome,
    /// Items replayed and removed.
    pub replayed: usize,
    /// Items that failed and stay pending.
    pub failed: usize,
    /// Items that failed and were parked.
    pub parked: usize,
}

impl SyncReport {
    fn new(outcome: PassOutcome) -> Self {
        Self {
            outcome,
            replayed: 0,
            failed: 0,
            parked: 0,
        }
    }
}

/// Replays queued writes once connectivity is available.
pub struct SyncEngine {
    queue: Arc<OperationQueue>,
    remote: Arc<dyn RemoteEndpoint>,
    executor: RetryExecutor,
    replay: ReplayPolicy,
    phase: Mutex<SyncPhase>,
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("queue", &self.queue)
            .field("executor", &self.executor)
            .field("replay", &self.replay)
            .finish_non_exhaustive()
    }
}

impl SyncEngine {
    /// Create an engine over a shared queue and remote.
    pub fn new(
        queue: Arc<OperationQueue>,
        remote: Arc<dyn RemoteEndpoint>,
        executor: RetryExecutor,
        replay: ReplayPolicy,
    ) -> Self {
        Self {
            queue,
            remote,
            executor,
            replay,
            phase: Mutex::new(SyncPhase::Idle),
        }
    }

    /// Check if a pass is in flight.
    pub fn is_draining(&self) -> bool {
        self.lock_phase().is_draining()
    }

    /// Run one sync pass over a snapshot of the queue.
    ///
    /// Safe to call at any time: concurrent calls coalesce into the pass
    /// already in flight. Store failures abort the pass; items not yet
    /// replayed stay queued.
    pub async fn drain(&self) -> StoreResult<SyncReport> {
        let Some(_pass) = self.begin_pass() else {
            tracing::debug!("Sync pass already running, coalescing trigger");
            return Ok(SyncReport::new(PassOutcome::Coalesced));
        };

        let snapshot = self.queue.replayable()?;
        if snapshot.is_empty() {
            return Ok(SyncReport::new(PassOutcome::Empty));
        }

        tracing::info!("Sync pass started ({} items)", snapshot.len());
        let mut report = SyncReport::new(PassOutcome::Completed);

        for item in snapshot {
            if !self.queue.mark_syncing(&item.id)? {
                // Removed by the user while this pass was running
                continue;
            }

            let result = self
                .executor
                .run(|| self.remote.call(&item.endpoint, &item.payload))
                .await;

            match result {
                Ok(_) => {
                    tracing::debug!("Replayed {} to {}", item.id, item.endpoint);
                    self.queue.complete(&item.id)?;
                    report.replayed += 1;
                }
                Err(e) => match self.queue.record_failure(&item.id, &e, &self.replay)? {
                    Some(FailureDisposition::Retry) => {
                        tracing::debug!("Replay of {} failed, keeping it: {}", item.id, e);
                        report.failed += 1;
                    }
                    Some(FailureDisposition::Parked) => {
                        tracing::warn!("Parked {} ({}): {}", item.id, item.endpoint, e);
                        report.parked += 1;
                    }
                    None => {}
                },
            }
        }

        let pending = self.queue.notify()?;
        tracing::info!(
            "Sync pass finished: {} replayed, {} failed, {} parked, {} pending",
            report.replayed,
            report.failed,
            report.parked,
            pending
        );
        Ok(report)
    }

    fn begin_pass(&self) -> Option<PassGuard<'_>> {
        let mut phase = self.lock_phase();
        let (next, action) = phase.on_event(PassEvent::Triggered);
        *phase = next;
        match action {
            PassAction::StartPass => Some(PassGuard { engine: self }),
            PassAction::Coalesce | PassAction::None => None,
        }
    }

    fn lock_phase(&self) -> MutexGuard<'_, SyncPhase> {
        self.phase
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Returns the engine to idle when a pass ends, however it ends.
struct PassGuard<'a> {
    engine: &'a SyncEngine,
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        let mut phase = self.engine.lock_phase();
        let (next, _) = phase.on_event(PassEvent::Finished);
        *phase = next;
    }
}

/// Spawn a background task that keeps the queue drained.
///
/// Runs one pass at start if online, then one pass per offline→online
/// edge. Edges arriving while a pass runs collapse into a single
/// follow-up pass. Returns a handle that can be used to abort the task.
pub fn spawn_sync_task(
    engine: Arc<SyncEngine>,
    monitor: &ConnectivityMonitor,
) -> JoinHandle<()> {
    let mut signals = monitor.subscribe();
    let online_at_start = monitor.is_online();

    tokio::spawn(async move {
        tracing::info!("Sync task started");
        let mut run = online_at_start;
        loop {
            while run {
                if let Err(e) = engine.drain().await {
                    tracing::error!("Sync pass error: {}", e);
                }
                run = signals.take_pending();
            }
            if signals.recv().await.is_none() {
                break;
            }
            run = true;
        }
        tracing::info!("Sync task stopped");
    })
}
