//! Action vocabulary and the broadcast bus that carries it.
//!
//! This module groups the action **data model** and the **bus** every produced or
//! dispatched action is published on.
//!
//! ## Contents
//! - [`ActionKind`], [`Action`] closed vocabulary and per-kind payload constructors
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Engine::dispatch` (relayed actions) and the per-run `Emitter`
//!   used by the lifecycle controller and every source.
//! - **Consumers**: `Engine::subscribe()` receivers and the subscriber listener that
//!   fans out to `SubscriberSet`.

mod action;
mod bus;

pub use action::{Action, ActionKind};
pub use bus::Bus;
