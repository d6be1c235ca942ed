//! # Lifecycle phase, emission gate, and the body of one run.
//!
//! The lifecycle controller owns an explicit [`Phase`] guarded by a [`Gate`]. Every
//! transition and every emission of a run goes through the same lock, which is what
//! makes stop race-free: once [`Gate::close`] returns, no emission from the stopped run
//! can reach the bus.
//!
//! ## State machine
//! ```text
//!            open()              settle(run, [loaded|error, started])
//! Stopped ──────────► Loading ─────────────────────────────────────► Active
//!    ▲                   │                                            │
//!    └────── close() ────┴─────────────────── close() ────────────────┘
//! ```
//!
//! ## One run
//! ```text
//! Cycle::run(token)
//!   ├─► StorageLoad::settle(token)          (None if stop arrived first → return)
//!   ├─► Gate::settle(run, [settled, started])   (atomic with Loading → Active)
//!   └─► Multiplexer::run(token.child_token(), emitter)
//!         └─► runtime sources attach only here, never before `started`
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;

use crate::{
    actions::{Action, Bus},
    core::{emitter::Emitter, multiplexer::Multiplexer},
    sources::StorageLoad,
};

/// Lifecycle phase of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No run in progress; nothing is attached.
    #[default]
    Stopped,
    /// Between `start` and `started`: the storage load is outstanding.
    Loading,
    /// After `started`: runtime sources are merged into the stream.
    Active,
}

impl Phase {
    /// True in `Loading` and `Active`.
    #[inline]
    pub fn is_running(&self) -> bool {
        !matches!(self, Phase::Stopped)
    }
}

#[derive(Debug, Default)]
struct GateState {
    phase: Phase,
    /// Number of the current (or last) run; bumped on every `open`.
    run: u64,
}

/// Phase holder and emission gate shared by the engine and every run.
#[derive(Debug, Default)]
pub(crate) struct Gate {
    state: Mutex<GateState>,
}

impl Gate {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current phase.
    pub(crate) fn phase(&self) -> Phase {
        self.lock().phase
    }

    /// `Stopped → Loading`; returns the new run number, or the blocking phase.
    pub(crate) fn open(&self) -> Result<u64, Phase> {
        let mut state = self.lock();
        if state.phase.is_running() {
            return Err(state.phase);
        }
        state.run += 1;
        state.phase = Phase::Loading;
        Ok(state.run)
    }

    /// `Loading → Active` for `run`, publishing `actions` inside the same critical section.
    ///
    /// Returns `false` (and publishes nothing) if the run was stopped meanwhile.
    pub(crate) fn settle<I>(&self, run: u64, bus: &Bus, actions: I) -> bool
    where
        I: IntoIterator<Item = Action>,
    {
        let mut state = self.lock();
        if state.run != run || state.phase != Phase::Loading {
            return false;
        }
        for action in actions {
            bus.publish(action);
        }
        state.phase = Phase::Active;
        true
    }

    /// Publishes `action` only while `run` is the live run.
    pub(crate) fn publish_if_live(&self, run: u64, bus: &Bus, action: Action) -> bool {
        let state = self.lock();
        if state.run != run || !state.phase.is_running() {
            return false;
        }
        bus.publish(action);
        true
    }

    /// Whether `run` is still the live run.
    pub(crate) fn is_live(&self, run: u64) -> bool {
        let state = self.lock();
        state.run == run && state.phase.is_running()
    }

    /// Any → `Stopped`; returns the phase that was left.
    pub(crate) fn close(&self) -> Phase {
        let mut state = self.lock();
        std::mem::replace(&mut state.phase, Phase::Stopped)
    }
}

/// Everything one run needs; consumed by [`Cycle::run`].
pub(crate) struct Cycle {
    pub(crate) run: u64,
    pub(crate) gate: Arc<Gate>,
    pub(crate) bus: Bus,
    pub(crate) storage: StorageLoad,
    pub(crate) multiplexer: Multiplexer,
}

impl Cycle {
    /// Drives the run until cancelled or until every runtime source has finished.
    pub(crate) async fn run(self, token: CancellationToken) {
        let run = self.run;

        let Some(settled) = self.storage.settle(&token).await else {
            tracing::debug!(run, "storage load abandoned by stop");
            return;
        };

        let settled_kind = settled.kind();
        if !self.gate.settle(run, &self.bus, [settled, Action::started()]) {
            tracing::debug!(run, "run stopped before storage settled");
            return;
        }
        tracing::debug!(run, settled = %settled_kind, "started");

        let emitter = Emitter::new(Arc::clone(&self.gate), self.bus.clone(), run);
        self.multiplexer.run(token.child_token(), emitter).await;
        tracing::debug!(run, "all runtime sources finished");
    }
}
