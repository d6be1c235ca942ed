//! # LogWriter: structured action logger
//!
//! A minimal subscriber that writes every incoming [`Action`] through `tracing`.
//! Install any `tracing` subscriber in the host to see the output.
//!
//! ## Example output (with a fmt subscriber)
//! ```text
//! INFO actionvisor: [start]
//! INFO actionvisor: [storage-loaded] payload={"state":{"theme":"dark"}}
//! INFO actionvisor: [started]
//! INFO actionvisor: [online] payload={"online":true}
//! WARN actionvisor: [error] payload={"error":{"kind":"source_listener","message":"listener: revoked"}}
//! INFO actionvisor: [stop]
//! ```

use async_trait::async_trait;

use crate::actions::{Action, ActionKind};
use crate::subscribers::Subscribe;

/// Action writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_action(&self, a: &Action) {
        let kind = a.kind();
        match (kind, a.payload()) {
            (ActionKind::Error | ActionKind::SignInFail, Some(payload)) => {
                tracing::warn!(target: "actionvisor", "[{kind}] payload={payload}");
            }
            (_, Some(payload)) => {
                tracing::info!(target: "actionvisor", "[{kind}] payload={payload}");
            }
            (_, None) => {
                tracing::info!(target: "actionvisor", "[{kind}]");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
