//! Sync pass gate.
//!
//! A pure state machine deciding whether a trigger (reconnection edge or
//! manual request) starts a new sync pass. At most one pass is in flight;
//! triggers arriving while draining are coalesced (dropped) so the same
//! item is never replayed by two overlapping passes.

/// Phase of the synchronization engine - NO I/O, just state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPhase {
    /// No pass running.
    #[default]
    Idle,
    /// A pass is draining its snapshot.
    Draining,
}

/// Inputs to the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassEvent {
    /// Something asked for a sync pass.
    Triggered,
    /// The running pass finished its snapshot.
    Finished,
}

/// What the engine should do in response to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassAction {
    /// Start draining.
    StartPass,
    /// Drop the trigger; a pass is already running.
    Coalesce,
    /// Nothing to do.
    None,
}

impl SyncPhase {
    /// Process an event and return the new phase plus the action to execute.
    pub fn on_event(self, event: PassEvent) -> (Self, PassAction) {
        match (self, event) {
            (Self::Idle, PassEvent::Triggered) => (Self::Draining, PassAction::StartPass),
            (Self::Draining, PassEvent::Triggered) => (Self::Draining, PassAction::Coalesce),
            (Self::Draining, PassEvent::Finished) => (Self::Idle, PassAction::None),
            // Finished while idle - stay idle
            (Self::Idle, PassEvent::Finished) => (Self::Idle, PassAction::None),
        }
    }

    /// Check if a pass is in flight.
    pub fn is_draining(&self) -> bool {
        matches!(self, Self::Draining)
    }
}
