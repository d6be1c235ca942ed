//! # Source abstraction.
//!
//! A [`Source`] is a long-lived, cancellable producer of actions: it subscribes to
//! something external, pushes zero or more actions through its [`Emitter`], and
//! releases its subscription when the [`CancellationToken`] fires.
//!
//! The common handle type is [`SourceRef`], an `Arc<dyn Source>` the multiplexer
//! spawns once per run.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{core::Emitter, error::SourceError};

/// # Asynchronous, cancellable action producer.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use actionvisor::{Action, Emitter, Source, SourceError};
///
/// struct Menu;
///
/// #[async_trait]
/// impl Source for Menu {
///     fn name(&self) -> &str { "menu" }
///
///     async fn run(&self, ctx: CancellationToken, emitter: Emitter) -> Result<(), SourceError> {
///         emitter.emit(Action::show_menu(false));
///         ctx.cancelled().await;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Source: Send + Sync + 'static {
    /// Returns a stable, human-readable source name.
    fn name(&self) -> &str;

    /// Produces actions until completion, fault, or cancellation.
    ///
    /// Must release every external subscription before returning. Returning
    /// `Err(SourceError::Canceled)` is treated as a graceful exit.
    async fn run(&self, ctx: CancellationToken, emitter: Emitter) -> Result<(), SourceError>;
}

/// Shared handle to a source.
pub type SourceRef = Arc<dyn Source>;
