//! # Action consumers.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`] that fans
//! every action published on the [`Bus`](crate::actions::Bus) out to them. A
//! reducer-style store is the typical subscriber.
//!
//! ## Architecture
//! ```text
//! Bus ──► subscriber_listener (in Engine) ──► SubscriberSet::emit(&Action)
//!                                                   │
//!                                  ┌────────────────┼────────────────┐
//!                                  ▼                ▼                ▼
//!                              LogWriter          Store           Custom
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use actionvisor::{Action, ActionKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct ErrorReporter;
//!
//! #[async_trait]
//! impl Subscribe for ErrorReporter {
//!     async fn on_action(&self, action: &Action) {
//!         if action.is(ActionKind::Error) {
//!             // forward to the crash reporter
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "error-reporter" }
//! }
//! ```

#[cfg(feature = "logging")]
mod embedded;
mod subscriber;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;
