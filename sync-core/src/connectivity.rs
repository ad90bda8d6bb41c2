//! Connectivity edge detection.
//!
//! The platform reports reachability as a level (online or offline) and may
//! repeat the same level. Only an `Offline → Online` change is an edge that
//! should trigger an unsolicited sync pass.

/// Binary network reachability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectivityState {
    /// A network path is believed to exist.
    Online,
    /// No network path.
    Offline,
}

/// A change in reachability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Offline → Online. Triggers a sync pass.
    BecameOnline,
    /// Online → Offline.
    WentOffline,
}

impl ConnectivityState {
    /// Map a platform `online` flag to a state.
    pub fn from_online(online: bool) -> Self {
        if online {
            Self::Online
        } else {
            Self::Offline
        }
    }

    /// Apply a platform signal, returning the new state and the edge, if any.
    ///
    /// Repeating the current level is a no-op.
    pub fn on_signal(self, online: bool) -> (Self, Option<Transition>) {
        match (self, online) {
            (Self::Offline, true) => (Self::Online, Some(Transition::BecameOnline)),
            (Self::Online, false) => (Self::Offline, Some(Transition::WentOffline)),
            (state, _) => (state, None),
        }
    }

    /// Check if online.
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }
}
