//! # sync-types
//!
//! Data types for the fieldsync offline write pipeline.
//!
//! This crate provides the foundational types used across all fieldsync crates:
//! - [`ItemId`] - Unique, strictly increasing identifier for queued writes
//! - [`QueueItem`] - One durably persisted write awaiting delivery
//! - [`OperationType`], [`ItemStatus`] - Item tagging and lifecycle
//! - [`Accepted`] - Outcome of a write: server-confirmed or durably queued
//! - [`RemoteError`] - Remote call failures with retry classification

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod ids;
mod item;

pub use error::RemoteError;
pub use ids::{InvalidItemId, ItemId};
pub use item::{Accepted, ItemStatus, OperationType, QueueItem};
