//! # Action bus for broadcasting produced and dispatched actions.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking publishing from the engine's dispatch path and from every source.
//!
//! ## Architecture
//! ```text
//! Publishers:                            Receivers:
//!   Engine::dispatch ──┐
//!   lifecycle run    ──┼──► Bus ──┬──► Engine::subscribe() (consumer stores, tests)
//!   Emitter (sources)──┘          └──► subscriber_listener ──► SubscriberSet
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks; it calls `broadcast::Sender::send`.
//! - **Bounded capacity**: a single ring buffer stores recent actions for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **Reducers first**: configured [`Reducer`]s update application state synchronously
//!   before the action is sent, so state never lags behind what sources emitted.
//! - **No persistence**: actions are lost if there are no receivers at send time.

use std::fmt;
use std::sync::Arc;

use tokio::sync::broadcast;

use super::action::Action;
use crate::sources::Reducer;

/// Broadcast channel for actions.
///
/// ### Properties
/// - **Non-blocking**: `publish()` returns immediately.
/// - **Ordered**: every receiver observes actions in publish order.
/// - **Reduced first**: every [`Reducer`] sees an action before any receiver does.
/// - **Cloneable**: cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone)]
pub struct Bus {
    tx: broadcast::Sender<Action>,
    reducers: Arc<[Arc<dyn Reducer>]>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity and no reducers.
    ///
    /// The minimum capacity is 1 (clamped).
    pub fn new(capacity: usize) -> Self {
        Self::with_reducers(capacity, Vec::new())
    }

    /// Creates a bus that applies `reducers`, in order, to every action it publishes.
    pub fn with_reducers(capacity: usize, reducers: Vec<Arc<dyn Reducer>>) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Action>(capacity);
        Self {
            tx,
            reducers: reducers.into(),
        }
    }

    /// Reduces `action` into application state, then sends it to all active receivers.
    ///
    /// If there are no receivers, the action is dropped after reduction.
    pub fn publish(&self, action: Action) {
        for reducer in self.reducers.iter() {
            reducer.reduce(&action);
        }
        let _ = self.tx.send(action);
    }

    /// Creates a new receiver that will observe subsequent actions.
    pub fn subscribe(&self) -> broadcast::Receiver<Action> {
        self.tx.subscribe()
    }
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bus")
            .field("receivers", &self.tx.receiver_count())
            .field("reducers", &self.reducers.len())
            .finish()
    }
}
