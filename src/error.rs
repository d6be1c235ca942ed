//! Error types used by the actionvisor runtime and its sources.
//!
//! This module defines two main error enums:
//!
//! - [`RuntimeError`]: errors raised by the lifecycle controller itself.
//! - [`SourceError`]: faults raised by storage, listeners and sign-in checks.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging and for
//! building `error` action payloads.

use std::time::Duration;
use thiserror::Error;

use crate::core::Phase;

/// # Errors produced by the actionvisor runtime.
///
/// These represent failures of the orchestration itself, never of a source.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Stop grace period was exceeded; some sources were still attached and had to be aborted.
    #[error("stop timeout {grace:?} exceeded; stuck: {stuck:?}; aborting")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of sources that had not detached in time.
        stuck: Vec<String>,
    },

    /// `start` was requested while a run is already loading or active.
    #[error("already running (phase: {phase:?})")]
    AlreadyRunning {
        /// Phase observed when the request was rejected.
        phase: Phase,
    },

    /// The builder was missing a required collaborator.
    #[error("missing collaborator: {name}")]
    MissingCollaborator {
        /// Which collaborator was not provided.
        name: &'static str,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use actionvisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::AlreadyRunning { .. } => "runtime_already_running",
            RuntimeError::MissingCollaborator { .. } => "runtime_missing_collaborator",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck sources={stuck:?}")
            }
            RuntimeError::AlreadyRunning { phase } => format!("already running: {phase:?}"),
            RuntimeError::MissingCollaborator { name } => format!("missing: {name}"),
        }
    }
}

/// # Faults raised by sources.
///
/// Every variant is turned into an action by the runtime: storage faults and listener
/// faults become `error`, sign-in faults become `sign-in-fail`.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The storage engine failed to load persisted state.
    #[error("storage load failed: {error}")]
    Storage {
        /// The underlying error message.
        error: String,
    },

    /// A realtime listener (connectivity, auth-state, custom) reported a fault.
    #[error("listener fault: {error}")]
    Listener {
        /// The underlying error message.
        error: String,
    },

    /// The post-redirect sign-in check failed.
    #[error("sign-in failed: {error}")]
    SignIn {
        /// Provider-specific error code, if any.
        code: Option<String>,
        /// The underlying error message.
        error: String,
    },

    /// Source observed cancellation and exited.
    #[error("context cancelled")]
    Canceled,
}

impl SourceError {
    /// Returns a short stable label (snake_case) for use in logs and action payloads.
    ///
    /// # Example
    /// ```
    /// use actionvisor::SourceError;
    ///
    /// let err = SourceError::Storage { error: "disk gone".into() };
    /// assert_eq!(err.as_label(), "source_storage");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SourceError::Storage { .. } => "source_storage",
            SourceError::Listener { .. } => "source_listener",
            SourceError::SignIn { .. } => "source_sign_in",
            SourceError::Canceled => "source_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SourceError::Storage { error } => format!("storage: {error}"),
            SourceError::Listener { error } => format!("listener: {error}"),
            SourceError::SignIn {
                code: Some(code),
                error,
            } => format!("sign-in [{code}]: {error}"),
            SourceError::SignIn { code: None, error } => format!("sign-in: {error}"),
            SourceError::Canceled => "context cancelled".to_string(),
        }
    }

    /// Shorthand for a listener fault.
    pub fn listener(error: impl Into<String>) -> Self {
        SourceError::Listener {
            error: error.into(),
        }
    }

    /// Shorthand for a storage fault.
    pub fn storage(error: impl Into<String>) -> Self {
        SourceError::Storage {
            error: error.into(),
        }
    }
}
