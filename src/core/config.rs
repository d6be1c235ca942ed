//! # Engine configuration.
//!
//! Provides [`EngineConfig`], the settings the [`Engine`](crate::Engine) is built with,
//! and [`ExecutionContext`], the capability flag deciding whether the redirect
//! sign-in source takes part in a run.
//!
//! ## Sentinel values
//! - `grace = 0s` → do not wait on stop; abort the run immediately. Only sources that
//!   were still attached at that moment are reported in `GraceExceeded`
//! - `bus_capacity = 0` → clamped to 1

use std::time::Duration;

use crate::core::boundary::FaultPolicy;

/// Where the engine runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExecutionContext {
    /// Interactive client (browser or native app). Collects redirect sign-in results.
    #[default]
    Client,
    /// Server-side or headless rendering. Never checks for redirect sign-in.
    Server,
}

/// Global configuration for the engine.
///
/// ## Field semantics
/// - `grace`: Maximum wait for sources to detach on stop (`0s` = abort immediately)
/// - `bus_capacity`: Action bus ring buffer size (min 1; clamped by Bus)
/// - `context`: Execution context gating the redirect sign-in source
/// - `fault_policy`: What a runtime source fault does to its siblings
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Maximum time `stop` waits for every source to detach before aborting the run.
    pub grace: Duration,

    /// Capacity of the action bus broadcast channel ring buffer.
    ///
    /// Receivers that lag behind more than `bus_capacity` actions observe `Lagged`.
    pub bus_capacity: usize,

    /// Execution context; `Server` excludes the redirect sign-in source.
    pub context: ExecutionContext,

    /// Fault handling for connectivity, auth-state and custom sources.
    pub fault_policy: FaultPolicy,
}

impl EngineConfig {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Whether runs include the redirect sign-in source.
    #[inline]
    pub fn includes_redirect(&self) -> bool {
        self.context == ExecutionContext::Client
    }
}

impl Default for EngineConfig {
    /// Default configuration:
    ///
    /// - `grace = 5s`
    /// - `bus_capacity = 1024`
    /// - `context = ExecutionContext::Client`
    /// - `fault_policy = FaultPolicy::Isolate`
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(5),
            bus_capacity: 1024,
            context: ExecutionContext::default(),
            fault_policy: FaultPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_context_excludes_redirect() {
        let cfg = EngineConfig {
            context: ExecutionContext::Server,
            bus_capacity: 0,
            ..EngineConfig::default()
        };
        assert!(!cfg.includes_redirect());
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert!(EngineConfig::default().includes_redirect());
    }
}
