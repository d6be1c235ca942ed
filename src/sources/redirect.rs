//! # Redirect sign-in adapter.
//!
//! Collects, once per run, the result of a sign-in that completed through page
//! redirection. Only part of runs in [`ExecutionContext::Client`](crate::ExecutionContext).
//!
//! ```text
//! get_redirect_result()
//!   ├─ Ok { user: Some(u) } ──► sign-in-done(u)
//!   ├─ Ok { user: None }    ──► nothing
//!   ├─ Err(e)               ──► sign-in-fail(e)
//!   └─ cancelled first      ──► future dropped, nothing (late results are discarded)
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{
    actions::Action,
    core::Emitter,
    error::SourceError,
    sources::{
        collaborators::{IdentityProvider, RedirectResult},
        source::Source,
    },
};

/// `redirect-sign-in` source.
pub struct RedirectSignIn {
    provider: Arc<dyn IdentityProvider>,
}

impl RedirectSignIn {
    /// Source name used in logs and attach tracking.
    pub const NAME: &'static str = "redirect-sign-in";

    /// Creates the adapter; `provider` is asked once per run for a pending redirect result.
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Source for RedirectSignIn {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn run(&self, ctx: CancellationToken, emitter: Emitter) -> Result<(), SourceError> {
        let outcome = tokio::select! {
            biased;
            _ = ctx.cancelled() => return Ok(()),
            res = self.provider.get_redirect_result() => res,
        };
        if ctx.is_cancelled() || !emitter.is_live() {
            tracing::debug!(run = emitter.run(), "redirect result arrived after stop; discarded");
            return Ok(());
        }

        match outcome {
            Ok(RedirectResult { user: Some(user) }) => {
                emitter.emit(Action::sign_in_done(user));
            }
            Ok(RedirectResult { user: None }) => {
                tracing::debug!("no pending redirect sign-in");
            }
            Err(err) => {
                tracing::warn!(label = err.as_label(), error = %err, "redirect sign-in failed");
                emitter.emit(Action::sign_in_fail(&err));
            }
        }
        Ok(())
    }
}
