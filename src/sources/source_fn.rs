//! # Function-backed source (`SourceFn`)
//!
//! [`SourceFn`] wraps a closure `F: Fn(CancellationToken, Emitter) -> Fut`, producing
//! a fresh future per run. State shared across runs must be put behind `Arc<...>`
//! explicitly inside the closure.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use actionvisor::{Action, Emitter, SourceFn, SourceRef};
//!
//! let s: SourceRef = SourceFn::arc("menu", |ctx: CancellationToken, emitter: Emitter| async move {
//!     emitter.emit(Action::show_menu(true));
//!     ctx.cancelled().await;
//!     Ok(())
//! });
//!
//! assert_eq!(s.name(), "menu");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{core::Emitter, error::SourceError, sources::source::Source};

/// Function-backed source implementation.
pub struct SourceFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F, Fut> SourceFn<F>
where
    F: Fn(CancellationToken, Emitter) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), SourceError>> + Send + 'static,
{
    /// Creates a new function-backed source.
    ///
    /// Prefer [`SourceFn::arc`] when you immediately need a [`SourceRef`](crate::SourceRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the source and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Source for SourceFn<F>
where
    F: Fn(CancellationToken, Emitter) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), SourceError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: CancellationToken, emitter: Emitter) -> Result<(), SourceError> {
        (self.f)(ctx, emitter).await
    }
}
