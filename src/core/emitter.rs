//! # Run-scoped emission handle.
//!
//! Sources never touch the bus directly. They get an [`Emitter`] bound to the run
//! that attached them; once that run is stopped every `emit` is silently dropped,
//! including callbacks that were already scheduled when stop arrived.

use std::sync::Arc;

use crate::actions::{Action, Bus};
use crate::core::lifecycle::Gate;

/// Publishes actions on behalf of one run.
///
/// Cloned into every source of the run. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Emitter {
    gate: Arc<Gate>,
    bus: Bus,
    run: u64,
}

impl Emitter {
    pub(crate) fn new(gate: Arc<Gate>, bus: Bus, run: u64) -> Self {
        Self { gate, bus, run }
    }

    /// Publishes `action` if the run is still live.
    ///
    /// Returns `false` when the action was discarded because the run was stopped.
    pub fn emit(&self, action: Action) -> bool {
        let kind = action.kind();
        let delivered = self.gate.publish_if_live(self.run, &self.bus, action);
        if !delivered {
            tracing::trace!(run = self.run, %kind, "discarded after stop");
        }
        delivered
    }

    /// Whether the run this emitter belongs to is still live.
    pub fn is_live(&self) -> bool {
        self.gate.is_live(self.run)
    }

    /// Number of the run this emitter belongs to.
    pub fn run(&self) -> u64 {
        self.run
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn emit_stops_at_close() {
        let gate = Arc::new(Gate::new());
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();

        let run = gate.open().unwrap();
        let emitter = Emitter::new(Arc::clone(&gate), bus.clone(), run);

        assert!(emitter.emit(Action::online(true)));
        gate.close();
        assert!(!emitter.emit(Action::online(false)));
        assert!(!emitter.is_live());

        assert_eq!(rx.recv().await.unwrap(), Action::online(true));
        assert!(rx.try_recv().is_err());
    }
}

/// A live emitter on a fresh gate, for unit tests of sources.
#[cfg(test)]
pub(crate) fn live_emitter(bus: &Bus) -> (Arc<Gate>, Emitter) {
    let gate = Arc::new(Gate::new());
    let run = gate.open().unwrap_or_default();
    let emitter = Emitter::new(Arc::clone(&gate), bus.clone(), run);
    (gate, emitter)
}
