//! # Run one source inside the merged group.
//!
//! Executes a single [`Source`] with its own child token, records attach/detach, and
//! turns a panic into an ordinary fault.
//!
//! ## Flow
//! ```text
//! token already cancelled ──► return Ok (never attaches)
//! attach(run, name)
//! source.run(ctx, emitter)       (panic caught → SourceError::Listener)
//! detach(run, name)
//!   ├─ Ok / Err(Canceled)     ──► Ok
//!   ├─ Err(_) after cancel    ──► Ok (teardown noise, not a fault)
//!   └─ Err(e)                 ──► Err(e) for the error boundary
//! ```

use std::{panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::{
    core::{attached::AttachedSources, emitter::Emitter},
    error::SourceError,
    sources::SourceRef,
};

/// Outcome of one source: its name and how it ended.
pub(crate) struct SourceExit {
    pub(crate) name: String,
    pub(crate) result: Result<(), SourceError>,
}

/// Runs `source` until it completes, faults, or `ctx` is cancelled.
pub(crate) async fn run_source(
    source: SourceRef,
    ctx: CancellationToken,
    emitter: Emitter,
    attached: Arc<AttachedSources>,
) -> SourceExit {
    let name = source.name().to_string();
    if ctx.is_cancelled() {
        return SourceExit {
            name,
            result: Ok(()),
        };
    }

    let run = emitter.run();
    attached.attach(run, &name).await;
    tracing::debug!(source = %name, run, "attached");

    let res = AssertUnwindSafe(source.run(ctx.clone(), emitter))
        .catch_unwind()
        .await
        .unwrap_or_else(|panic_err| {
            let any = &*panic_err;
            let info = if let Some(msg) = any.downcast_ref::<&'static str>() {
                (*msg).to_string()
            } else if let Some(msg) = any.downcast_ref::<String>() {
                msg.clone()
            } else {
                "unknown panic".to_string()
            };
            Err(SourceError::listener(format!("panicked: {info}")))
        });

    attached.detach(run, &name).await;
    tracing::debug!(source = %name, run, "detached");

    let result = match res {
        Ok(()) | Err(SourceError::Canceled) => Ok(()),
        Err(_) if ctx.is_cancelled() => Ok(()),
        Err(e) => Err(e),
    };
    SourceExit { name, result }
}
