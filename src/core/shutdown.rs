//! # Termination signals for long-running hosts.
//!
//! [`Engine::run_until_shutdown`](crate::Engine::run_until_shutdown) starts a run, parks
//! on [`wait_for_shutdown_signal`], then dispatches `stop`: the gate closes, the run is
//! cancelled and every source is given the configured grace period to detach.
//!
//! ```text
//! run_until_shutdown
//!   ├─ dispatch(start)
//!   ├─ wait_for_shutdown_signal() ──► Signal::{Interrupt, Terminate, Quit}
//!   └─ dispatch(stop)                 (also reached when registration fails)
//! ```
//!
//! Unix listens for `SIGINT`, `SIGTERM` and `SIGQUIT`; other platforms for Ctrl-C.

use std::fmt;

/// Which termination signal ended the wait.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(not(unix), allow(dead_code))]
pub(crate) enum Signal {
    Interrupt,
    Terminate,
    Quit,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Signal::Interrupt => "SIGINT",
            Signal::Terminate => "SIGTERM",
            Signal::Quit => "SIGQUIT",
        })
    }
}

/// Resolves with the first termination signal received.
///
/// Fails only if a signal handler cannot be registered.
#[cfg(unix)]
pub(crate) async fn wait_for_shutdown_signal() -> std::io::Result<Signal> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut quit = signal(SignalKind::quit())?;

    let received = tokio::select! {
        _ = interrupt.recv() => Signal::Interrupt,
        _ = terminate.recv() => Signal::Terminate,
        _ = quit.recv() => Signal::Quit,
    };
    Ok(received)
}

/// Resolves on Ctrl-C, reported as [`Signal::Interrupt`].
#[cfg(not(unix))]
pub(crate) async fn wait_for_shutdown_signal() -> std::io::Result<Signal> {
    tokio::signal::ctrl_c().await?;
    Ok(Signal::Interrupt)
}
