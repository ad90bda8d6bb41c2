//! # sync-core
//!
//! Pure logic for fieldsync (no I/O, instant tests).
//!
//! This crate implements the state machines and algorithms of the offline
//! write pipeline without any network or disk I/O, enabling fast unit tests.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce output
//! without side effects:
//! - [`backoff`]: doubling retry schedule and retry decisions
//! - [`connectivity`]: edge detection on the platform reachability signal
//! - [`pass`]: the `Idle → Draining → Idle` sync pass gate
//! - [`queue`]: the ordered in-memory snapshot of queued writes
//! - [`replay`]: what happens to a queued item whose replay failed
//!
//! The actual I/O (store, timers, remote calls) is performed by `sync-client`,
//! which interprets the decisions produced here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backoff;
pub mod connectivity;
pub mod pass;
pub mod queue;
pub mod replay;

pub use backoff::{RetryDecision, RetryPolicy, RetryState};
pub use connectivity::{ConnectivityState, Transition};
pub use pass::{PassAction, PassEvent, SyncPhase};
pub use queue::PendingQueue;
pub use replay::{FailureDisposition, ReplayPolicy};
