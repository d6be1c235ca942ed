//! # Engine: lifecycle controller, action dispatch, and teardown.
//!
//! The [`Engine`] owns the action bus (which feeds the [`SubscriberSet`]), the phase
//! gate and the handle of the current run. It turns `start`/`stop` into runs and guarantees that
//! a stopped run can no longer publish anything.
//!
//! ## High-level architecture
//! ```text
//! dispatch(start) ──► Bus.publish(start) ──► start()
//!                                              ├─ Gate::open()          Stopped → Loading
//!                                              └─ spawn Cycle::run(run token)
//!                                                   ├─ storage load (once)
//!                                                   ├─ Gate::settle([loaded|error, started])
//!                                                   └─ Multiplexer (connectivity, auth-state,
//!                                                      redirect-sign-in if Client, custom)
//!
//! dispatch(stop)  ──► halt()                        (synchronous)
//!                      ├─ Gate::close()             → no emission of the run gets through
//!                      └─ run token.cancel()        → propagates to every source
//!                 ──► Bus.publish(stop)
//!                 ──► drain(grace)
//!                      ├─ Ok (run task joined)      → every listener detached
//!                      └─ grace exceeded            → abort run, RuntimeError::GraceExceeded
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use serde_json::{Value, json};
//! use actionvisor::{Action, ActionKind, Engine, EngineConfig, SourceError, StorageEngine};
//!
//! struct Prefs;
//!
//! #[async_trait]
//! impl StorageEngine for Prefs {
//!     async fn load(&self) -> Result<Value, SourceError> {
//!         Ok(json!({ "theme": "dark" }))
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = Engine::builder(EngineConfig::default())
//!         .with_storage(Arc::new(Prefs))
//!         .build()?;
//!     let mut actions = engine.subscribe();
//!
//!     engine.dispatch(Action::start()).await?;
//!     assert_eq!(actions.recv().await?.kind(), ActionKind::Start);
//!     assert_eq!(actions.recv().await?.kind(), ActionKind::StorageLoaded);
//!     assert_eq!(actions.recv().await?.kind(), ActionKind::Started);
//!
//!     engine.dispatch(Action::stop()).await?;
//!     Ok(())
//! }
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::{sync::broadcast, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{
    actions::{Action, ActionKind, Bus},
    core::{
        attached::AttachedSources,
        boundary::ErrorBoundary,
        builder::EngineBuilder,
        config::EngineConfig,
        lifecycle::{Cycle, Gate, Phase},
        multiplexer::Multiplexer,
        shutdown,
    },
    error::RuntimeError,
    sources::SourceSet,
    subscribers::SubscriberSet,
};

/// Handle of the run currently in progress.
struct RunHandle {
    run: u64,
    token: CancellationToken,
    join: JoinHandle<()>,
}

/// Drives the start/stop lifecycle and merges runtime sources into one action stream.
pub struct Engine {
    cfg: EngineConfig,
    bus: Bus,
    gate: Arc<Gate>,
    sources: SourceSet,
    attached: Arc<AttachedSources>,
    current: Mutex<Option<RunHandle>>,
}

impl Engine {
    /// Returns a builder for configuring collaborators and subscribers.
    pub fn builder(cfg: EngineConfig) -> EngineBuilder {
        EngineBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: EngineConfig,
        bus: Bus,
        sources: SourceSet,
    ) -> Self {
        Self {
            cfg,
            bus,
            gate: Arc::new(Gate::new()),
            sources,
            attached: Arc::new(AttachedSources::new()),
            current: Mutex::new(None),
        }
    }

    /// Subscribes to the bus and forwards actions to `set` (fire-and-forget).
    ///
    /// The listener owns the set. Once the bus closes (the engine and every run are
    /// gone) it shuts the set down, so queued actions still reach their subscribers.
    pub(crate) fn subscriber_listener(&self, set: SubscriberSet) {
        if set.is_empty() {
            return;
        }
        let mut rx = self.bus.subscribe();
        tracing::debug!(subscribers = set.len(), "subscriber listener started");
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(action) => set.emit(&action),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "subscriber listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            set.shutdown().await;
        });
    }

    /// Creates a receiver observing every action published from now on, in order.
    pub fn subscribe(&self) -> broadcast::Receiver<Action> {
        self.bus.subscribe()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.gate.phase()
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    /// Sorted names of the runtime sources currently attached.
    pub async fn attached_sources(&self) -> Vec<String> {
        self.attached.snapshot().await
    }

    /// Store-style entry point.
    ///
    /// Every action is published on the bus. `start` then starts a run (ignored while
    /// one is in progress); `stop` stops it, and is published only once the run can
    /// no longer emit, so nothing from the run follows it on the stream.
    pub async fn dispatch(&self, action: Action) -> Result<(), RuntimeError> {
        match action.kind() {
            ActionKind::Start => {
                self.bus.publish(action);
                match self.start() {
                    Err(RuntimeError::AlreadyRunning { phase }) => {
                        tracing::debug!(?phase, "start ignored; already running");
                        Ok(())
                    }
                    other => other,
                }
            }
            ActionKind::Stop => {
                let handle = self.halt();
                self.bus.publish(action);
                self.drain(handle).await
            }
            _ => {
                self.bus.publish(action);
                Ok(())
            }
        }
    }

    /// Starts a run: `Stopped → Loading`, then load, `started`, and source merging.
    ///
    /// Fails with [`RuntimeError::AlreadyRunning`] outside `Stopped`; the storage engine
    /// is never loaded twice for one run.
    pub fn start(&self) -> Result<(), RuntimeError> {
        let mut current = self.lock_current();
        let run = self
            .gate
            .open()
            .map_err(|phase| RuntimeError::AlreadyRunning { phase })?;

        let cycle = Cycle {
            run,
            gate: Arc::clone(&self.gate),
            bus: self.bus.clone(),
            storage: self.sources.storage(),
            multiplexer: Multiplexer::new(
                self.sources.runtime(&self.cfg),
                ErrorBoundary::new(self.cfg.fault_policy),
                Arc::clone(&self.attached),
            ),
        };
        let token = CancellationToken::new();
        let join = tokio::spawn(cycle.run(token.clone()));
        tracing::debug!(run, "loading");

        *current = Some(RunHandle { run, token, join });
        Ok(())
    }

    /// Stops the current run and waits until every source has detached.
    ///
    /// Idempotent: a no-op when already stopped.
    pub async fn stop(&self) -> Result<(), RuntimeError> {
        let handle = self.halt();
        self.drain(handle).await
    }

    /// Starts, waits for an OS termination signal, then stops.
    pub async fn run_until_shutdown(&self) -> Result<(), RuntimeError> {
        self.dispatch(Action::start()).await?;
        match shutdown::wait_for_shutdown_signal().await {
            Ok(signal) => tracing::info!(%signal, "shutdown signal received; stopping"),
            Err(e) => tracing::warn!(error = %e, "signal registration failed; stopping now"),
        }
        self.dispatch(Action::stop()).await
    }

    /// Closes the gate and cancels the run; nothing of the run is published afterwards.
    fn halt(&self) -> Option<RunHandle> {
        let mut current = self.lock_current();
        let left = self.gate.close();
        let handle = current.take()?;

        handle.token.cancel();
        tracing::debug!(run = handle.run, ?left, "stopping");
        Some(handle)
    }

    /// Waits for the halted run to finish within the configured grace period.
    ///
    /// On timeout the run task is aborted, which drops every source and its
    /// subscription. [`RuntimeError::GraceExceeded`] is returned only if sources of
    /// this run were still attached; a run that merely had not been polled yet (always
    /// the case with a zero grace) stops cleanly. Other runs' sources are untouched.
    async fn drain(&self, handle: Option<RunHandle>) -> Result<(), RuntimeError> {
        let Some(mut handle) = handle else {
            return Ok(());
        };
        let grace = self.cfg.grace;

        match tokio::time::timeout(grace, &mut handle.join).await {
            Ok(Ok(())) => {
                tracing::debug!(run = handle.run, "stopped");
                Ok(())
            }
            Ok(Err(join_err)) => {
                tracing::warn!(run = handle.run, error = %join_err, "run task ended abnormally");
                Ok(())
            }
            Err(_elapsed) => {
                let stuck = self.attached.snapshot_run(handle.run).await;
                handle.join.abort();
                let _ = handle.join.await;
                self.attached.clear_run(handle.run).await;

                if stuck.is_empty() {
                    tracing::debug!(run = handle.run, ?grace, "stopped; run aborted with nothing attached");
                    return Ok(());
                }
                tracing::warn!(run = handle.run, ?grace, ?stuck, "stop grace exceeded; run aborted");
                Err(RuntimeError::GraceExceeded { grace, stuck })
            }
        }
    }

    fn lock_current(&self) -> MutexGuard<'_, Option<RunHandle>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.gate.close();
        if let Some(handle) = self.lock_current().take() {
            handle.token.cancel();
        }
    }
}
