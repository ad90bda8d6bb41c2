//! Connectivity monitor.
//!
//! Bridges the platform's push-style reachability signal into the sync
//! pipeline. The platform (or a test) calls [`ConnectivityMonitor::set_online`]
//! whenever it learns the current level; subscribers receive exactly one
//! [`OnlineSignals::recv`] wakeup per offline→online edge.
//!
//! There is no polling. When the platform signal is unreliable, callers can
//! still run a sync pass manually via `SyncEngine::drain`.

use std::sync::{Arc, Mutex, MutexGuard};

use sync_core::{ConnectivityState, Transition};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

const EDGE_CAPACITY: usize = 16;

/// Tracks reachability and broadcasts edges.
///
/// Clones share state.
#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
    inner: Arc<MonitorInner>,
}

#[derive(Debug)]
struct MonitorInner {
    state: Mutex<ConnectivityState>,
    edges: broadcast::Sender<Transition>,
}

impl ConnectivityMonitor {
    /// Create a monitor with the given initial reachability.
    pub fn new(online: bool) -> Self {
        let (edges, _) = broadcast::channel(EDGE_CAPACITY);
        Self {
            inner: Arc::new(MonitorInner {
                state: Mutex::new(ConnectivityState::from_online(online)),
                edges,
            }),
        }
    }

    /// Current reachability.
    pub fn is_online(&self) -> bool {
        self.state().is_online()
    }

    /// Current state.
    pub fn state(&self) -> ConnectivityState {
        *self.lock()
    }

    /// Feed a platform reachability signal.
    ///
    /// Returns the edge it produced, if any. Repeating the current level
    /// is a no-op.
    pub fn set_online(&self, online: bool) -> Option<Transition> {
        let edge = {
            let mut state = self.lock();
            let (next, edge) = state.on_signal(online);
            *state = next;
            edge
        };

        match edge {
            Some(Transition::BecameOnline) => tracing::info!("Network: online"),
            Some(Transition::WentOffline) => tracing::info!("Network: offline"),
            None => {}
        }
        if let Some(edge) = edge {
            // No subscribers is fine
            let _ = self.inner.edges.send(edge);
        }
        edge
    }

    /// Subscribe to offline→online edges occurring after this call.
    pub fn subscribe(&self) -> OnlineSignals {
        OnlineSignals {
            rx: self.inner.edges.subscribe(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ConnectivityState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Receiver of "became online" edges.
#[derive(Debug)]
pub struct OnlineSignals {
    rx: broadcast::Receiver<Transition>,
}

impl OnlineSignals {
    /// Wait for the next offline→online edge.
    ///
    /// Returns `None` once every monitor handle has been dropped.
    /// If the receiver fell behind, the missed edges count as one.
    pub async fn recv(&mut self) -> Option<()> {
        loop {
            match self.rx.recv().await {
                Ok(Transition::BecameOnline) => return Some(()),
                Ok(Transition::WentOffline) => continue,
                Err(RecvError::Lagged(_)) => return Some(()),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Consume edges already buffered, without waiting.
    ///
    /// Returns true if at least one offline→online edge was pending.
    pub fn take_pending(&mut self) -> bool {
        let mut found = false;
        loop {
            match self.rx.try_recv() {
                Ok(Transition::BecameOnline) | Err(TryRecvError::Lagged(_)) => found = true,
                Ok(Transition::WentOffline) => {}
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return found,
            }
        }
    }
}
