//! # Storage load adapter.
//!
//! Wraps the one-shot [`StorageEngine::load`] of a run. The lifecycle controller
//! drives it directly (it is not merged) because its outcome must be published
//! together with `started`.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{actions::Action, core::recover_load, sources::collaborators::StorageEngine};

/// One-shot storage load, cancellable by stop.
#[derive(Clone)]
pub struct StorageLoad {
    engine: Arc<dyn StorageEngine>,
}

impl StorageLoad {
    /// Creates the adapter over `engine`.
    pub fn new(engine: Arc<dyn StorageEngine>) -> Self {
        Self { engine }
    }

    /// Loads once and converts the outcome into `storage-loaded` or `error`.
    ///
    /// Returns `None` when `ctx` is cancelled before the load settles; the pending
    /// load future is dropped and its result never observed.
    pub async fn settle(&self, ctx: &CancellationToken) -> Option<Action> {
        tokio::select! {
            biased;
            _ = ctx.cancelled() => None,
            res = self.engine.load() => Some(recover_load(res)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use serde_json::json;

    use super::*;
    use crate::actions::ActionKind;
    use crate::error::SourceError;
    use crate::sources::fakes::DeferredStorage;

    #[tokio::test]
    async fn success_yields_storage_loaded() {
        let (storage, tx) = DeferredStorage::new();
        let adapter = StorageLoad::new(Arc::new(storage));
        tx.send(Ok(json!({ "theme": "dark" }))).unwrap();

        let action = adapter.settle(&CancellationToken::new()).await;
        assert_eq!(action, Some(Action::storage_loaded(json!({ "theme": "dark" }))));
    }

    #[tokio::test]
    async fn failure_yields_error_action() {
        let (storage, tx) = DeferredStorage::new();
        let adapter = StorageLoad::new(Arc::new(storage));
        tx.send(Err(SourceError::storage("quota"))).unwrap();

        let action = adapter.settle(&CancellationToken::new()).await.unwrap();
        assert_eq!(action.kind(), ActionKind::Error);
    }

    #[tokio::test]
    async fn cancel_abandons_pending_load() {
        let (storage, _tx) = DeferredStorage::new();
        let storage = Arc::new(storage);
        let adapter = StorageLoad::new(storage.clone());
        let ctx = CancellationToken::new();

        let pending = tokio::spawn({
            let ctx = ctx.clone();
            async move { adapter.settle(&ctx).await }
        });
        tokio::task::yield_now().await;
        ctx.cancel();

        assert_eq!(pending.await.unwrap(), None);
        assert!(storage.loads.load(Ordering::SeqCst) <= 1);
    }
}
