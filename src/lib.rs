//! # actionvisor
//!
//! **Actionvisor** is a small reactive orchestration runtime for Rust.
//!
//! It turns a `start`/`stop` lifecycle into a single ordered stream of [`Action`]s:
//! a one-shot storage load, followed by the merged output of long-lived sources
//! (connectivity, auth state, a post-redirect sign-in check, custom sources).
//! Stopping cancels every source transitively and guarantees that nothing from the
//! stopped run reaches the stream afterwards.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ┌──────────────────┐ ┌──────────────────┐ ┌──────────────────┐ ┌─────────────┐
//!   │  StorageEngine   │ │ConnectivityServ. │ │ IdentityProvider │ │ custom      │
//!   │  (load once)     │ │ + StateReader    │ │ (auth, redirect) │ │ SourceRef   │
//!   └────────┬─────────┘ └────────┬─────────┘ └────────┬─────────┘ └──────┬──────┘
//!            ▼                    ▼                    ▼                  ▼
//!      StorageLoad          Connectivity      AuthState / RedirectSignIn   Source
//!            │                    └──────────┬─────────┴──────────────────┘
//!            │                               ▼
//! ┌──────────┴────────────────────────────────────────────────────────────────────┐
//! │  Engine (lifecycle controller)                                                │
//! │  - Gate (explicit Phase + run number; every emission passes through it)       │
//! │  - Multiplexer (task group, child cancellation tokens, ErrorBoundary)         │
//! │  - AttachedSources (which listeners are live)                                 │
//! └───────────────────────────────────────┬───────────────────────────────────────┘
//!                                         ▼
//! ┌───────────────────────────────────────────────────────────────────────────────┐
//! │                    Bus (broadcast channel of Actions)                         │
//! │                    (capacity: EngineConfig::bus_capacity)                     │
//! └───────────────┬───────────────────────────────────────┬───────────────────────┘
//!                 ▼                                       ▼
//!        Engine::subscribe()                     subscriber_listener
//!        (host store / reducers)                          ▼
//!                                                  SubscriberSet
//!                                               ┌─────────┼─────────┐
//!                                               ▼         ▼         ▼
//!                                            worker1   worker2   workerN
//! ```
//!
//! ### Lifecycle
//! ```text
//! dispatch(start) ─► start  ─► Loading ─► storage-loaded | error ─► started ─► Active
//!                                                                              │
//!                         online / auth-changed / sign-in-done / sign-in-fail  │
//!                         error (listener faults, per FaultPolicy)  ◄──────────┘
//!
//! dispatch(stop)  ─► gate closed + run cancelled ─► stop ─► all listeners detached
//! ```
//!
//! ## Features
//! | Area              | Description                                                     | Key types / traits                           |
//! |-------------------|-----------------------------------------------------------------|----------------------------------------------|
//! | **Lifecycle**     | Start/stop runs, dispatch actions, graceful teardown.           | [`Engine`], [`EngineBuilder`], [`Phase`]     |
//! | **Actions**       | Serializable action vocabulary shared with the host.            | [`Action`], [`ActionKind`]                   |
//! | **Sources**       | Cancellable adapters over external collaborators.               | [`Source`], [`SourceFn`], [`Emitter`]        |
//! | **Collaborators** | Host-side traits the built-in sources wrap.                     | [`StorageEngine`], [`ConnectivityService`], [`IdentityProvider`] |
//! | **State hooks**   | Read and update host state synchronously with publishing.       | [`StateReader`], [`Reducer`], [`OnlineStatus`] |
//! | **Subscriber API**| Consume the action stream on dedicated workers.                 | [`Subscribe`]                                |
//! | **Errors**        | Typed errors for orchestration and source faults.               | [`RuntimeError`], [`SourceError`]            |
//! | **Configuration** | Grace period, bus capacity, execution context, fault policy.    | [`EngineConfig`], [`FaultPolicy`]            |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] subscriber _(demo/reference only)_.
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
//!     // Build subscribers (optional)
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn actionvisor::Subscribe>> = vec![Arc::new(actionvisor::LogWriter::new())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn actionvisor::Subscribe>> = Vec::new();
//!
//!     let engine = Engine::builder(EngineConfig::default())
//!         .with_subscribers(subs)
//!         .with_storage(Arc::new(Prefs))
//!         .build()?;
//!     let mut actions = engine.subscribe();
//!
//!     engine.dispatch(Action::start()).await?;
//!     let _start = actions.recv().await?;
//!     let loaded = actions.recv().await?;
//!     assert_eq!(loaded.loaded_state(), Some(&json!({ "theme": "dark" })));
//!     assert_eq!(actions.recv().await?.kind(), ActionKind::Started);
//!
//!     engine.dispatch(Action::stop()).await?;
//!     Ok(())
//! }
//! ```
mod actions;
mod core;
mod error;
mod sources;
mod subscribers;

// ---- Public re-exports ----

pub use actions::{Action, ActionKind};
pub use core::{Emitter, Engine, EngineBuilder, EngineConfig, ExecutionContext, FaultPolicy, Phase};
pub use error::{RuntimeError, SourceError};
pub use sources::{
    AuthState, Connectivity, ConnectivityService, IdentityProvider, Listener, OnlineStatus,
    RedirectResult, RedirectSignIn, Reducer, Source, SourceFn, SourceRef, StateReader, StorageEngine,
    StorageLoad, Subscription, UserSnapshot,
};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
