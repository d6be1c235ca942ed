//! # Error boundary: source faults become actions.
//!
//! No fault raised by a source ever terminates the lifecycle. What the boundary does
//! with the *siblings* of a faulting runtime source depends on [`FaultPolicy`]:
//!
//! ```text
//! storage load ── Err ──► error(..)                        (always, before started)
//! redirect     ── Err ──► sign-in-fail(..)                 (inside the adapter)
//! runtime src  ── Err ──► error(..) ──┬─ Isolate   → siblings keep running
//!                                     └─ Propagate → whole merged group cancelled
//! ```

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::{actions::Action, core::emitter::Emitter, error::SourceError};

/// What a fault in one runtime source does to the others.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FaultPolicy {
    /// Report the fault as an `error` action; siblings keep running (default).
    #[default]
    Isolate,
    /// Report the fault, then cancel the whole merged group.
    ///
    /// The lifecycle stays `Active` until an explicit stop.
    Propagate,
}

/// Applies a [`FaultPolicy`] to runtime-source faults.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ErrorBoundary {
    policy: FaultPolicy,
}

impl ErrorBoundary {
    pub(crate) fn new(policy: FaultPolicy) -> Self {
        Self { policy }
    }

    /// Reports a runtime source fault and applies the policy to the group.
    pub(crate) fn absorb(
        &self,
        source: &str,
        err: &SourceError,
        emitter: &Emitter,
        group: &CancellationToken,
    ) {
        tracing::warn!(
            source,
            label = err.as_label(),
            error = %err,
            policy = ?self.policy,
            "source faulted"
        );
        emitter.emit(Action::app_error(err));

        if self.policy == FaultPolicy::Propagate {
            group.cancel();
        }
    }
}

/// Converts a settled storage load into the action that precedes `started`.
pub(crate) fn recover_load(res: Result<Value, SourceError>) -> Action {
    match res {
        Ok(state) => Action::storage_loaded(state),
        Err(err) => {
            tracing::warn!(label = err.as_label(), error = %err, "storage load failed");
            Action::app_error(&err)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::actions::{ActionKind, Bus};
    use crate::core::lifecycle::Gate;

    fn live_emitter(bus: &Bus) -> Emitter {
        let gate = Arc::new(Gate::new());
        let run = gate.open().unwrap();
        Emitter::new(gate, bus.clone(), run)
    }

    #[test]
    fn recover_load_maps_both_outcomes() {
        let ok = recover_load(Ok(json!({ "theme": "dark" })));
        assert_eq!(ok, Action::storage_loaded(json!({ "theme": "dark" })));

        let err = recover_load(Err(SourceError::storage("io")));
        assert_eq!(err.kind(), ActionKind::Error);
        assert_eq!(err.error_label(), Some("source_storage"));
    }

    #[tokio::test]
    async fn isolate_leaves_group_running() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let group = CancellationToken::new();

        ErrorBoundary::new(FaultPolicy::Isolate).absorb(
            "auth-state",
            &SourceError::listener("revoked"),
            &live_emitter(&bus),
            &group,
        );

        assert!(!group.is_cancelled());
        assert_eq!(rx.recv().await.unwrap().kind(), ActionKind::Error);
    }

    #[tokio::test]
    async fn propagate_cancels_group() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let group = CancellationToken::new();

        ErrorBoundary::new(FaultPolicy::Propagate).absorb(
            "connectivity",
            &SourceError::listener("permission denied"),
            &live_emitter(&bus),
            &group,
        );

        assert!(group.is_cancelled());
        assert_eq!(
            rx.recv().await.unwrap().error_label(),
            Some("source_listener")
        );
    }
}
