//! Runtime core: lifecycle, multiplexing and teardown.
//!
//! The public API from this module is [`Engine`] (plus its builder, config and
//! [`Phase`]), which drives the start/stop lifecycle and owns every run.
//!
//! Internal modules:
//! - [`lifecycle`]: explicit phase, the emission gate and one run's load → started → merge sequence;
//! - [`emitter`]: the run-scoped handle sources publish through;
//! - [`multiplexer`]: merges runtime sources into one stream under a task group;
//! - [`runner`]: runs one source with attach tracking and panic capture;
//! - [`boundary`]: turns source faults into actions per [`FaultPolicy`];
//! - [`attached`]: tracks which sources are currently attached;
//! - [`shutdown`]: cross-platform OS termination signal handling.

mod attached;
mod boundary;
mod builder;
mod config;
mod emitter;
mod engine;
mod lifecycle;
mod multiplexer;
mod runner;
mod shutdown;

pub(crate) use boundary::recover_load;
#[cfg(test)]
pub(crate) use emitter::live_emitter;

pub use boundary::FaultPolicy;
pub use builder::EngineBuilder;
pub use config::{EngineConfig, ExecutionContext};
pub use emitter::Emitter;
pub use engine::Engine;
pub use lifecycle::Phase;
