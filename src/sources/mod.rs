//! # Sources: cancellable adapters over external asynchronous collaborators.
//!
//! This module provides:
//! - [`Source`] - trait for cancellable action producers
//! - [`SourceFn`] - closure-backed source
//! - the built-in adapters: [`StorageLoad`], [`Connectivity`], [`AuthState`], [`RedirectSignIn`]
//! - the collaborator traits they wrap (see [`collaborators`](self::collaborators))
//!
//! Which runtime sources a run merges is a pure function of the configured
//! collaborators and the [`ExecutionContext`](crate::ExecutionContext); see `SourceSet::runtime`.

mod auth;
mod collaborators;
mod connectivity;
mod redirect;
mod source;
mod source_fn;
mod storage;

#[cfg(test)]
pub(crate) mod fakes;

use std::sync::Arc;

pub use auth::AuthState;
pub use collaborators::{
    ConnectivityService, IdentityProvider, Listener, OnlineStatus, RedirectResult, Reducer,
    StateReader, StorageEngine, Subscription, UserSnapshot,
};
pub use connectivity::Connectivity;
pub use redirect::RedirectSignIn;
pub use source::{Source, SourceRef};
pub use source_fn::SourceFn;
pub use storage::StorageLoad;

use crate::core::EngineConfig;

/// Collaborators a run is assembled from.
#[derive(Clone)]
pub(crate) struct SourceSet {
    pub(crate) storage: Arc<dyn StorageEngine>,
    pub(crate) connectivity: Option<(Arc<dyn ConnectivityService>, Arc<dyn StateReader>)>,
    pub(crate) identity: Option<Arc<dyn IdentityProvider>>,
    pub(crate) extra: Vec<SourceRef>,
}

impl SourceSet {
    /// Storage adapter for the load phase of a run.
    pub(crate) fn storage(&self) -> StorageLoad {
        StorageLoad::new(Arc::clone(&self.storage))
    }

    /// Runtime sources merged after `started`, in attach order.
    pub(crate) fn runtime(&self, cfg: &EngineConfig) -> Vec<SourceRef> {
        let mut sources: Vec<SourceRef> = Vec::with_capacity(3 + self.extra.len());

        if let Some((service, reader)) = &self.connectivity {
            sources.push(Arc::new(Connectivity::new(
                Arc::clone(service),
                Arc::clone(reader),
            )));
        }
        if let Some(provider) = &self.identity {
            sources.push(Arc::new(AuthState::new(Arc::clone(provider))));
            if cfg.includes_redirect() {
                sources.push(Arc::new(RedirectSignIn::new(Arc::clone(provider))));
            }
        }
        sources.extend(self.extra.iter().cloned());
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ExecutionContext;
    use crate::sources::fakes::{DeferredStorage, FakeConnectivity, FakeIdentity};

    fn full_set() -> SourceSet {
        let (storage, _tx) = DeferredStorage::new();
        SourceSet {
            storage: Arc::new(storage),
            connectivity: Some((
                Arc::new(FakeConnectivity::default()),
                Arc::new(OnlineStatus::default()),
            )),
            identity: Some(Arc::new(FakeIdentity::default())),
            extra: Vec::new(),
        }
    }

    fn in_context(context: ExecutionContext) -> EngineConfig {
        EngineConfig {
            context,
            ..EngineConfig::default()
        }
    }

    fn names(sources: &[SourceRef]) -> Vec<&str> {
        sources.iter().map(|s| s.name()).collect()
    }

    #[test]
    fn client_context_includes_redirect() {
        let set = full_set();
        assert_eq!(
            names(&set.runtime(&in_context(ExecutionContext::Client))),
            vec!["connectivity", "auth-state", "redirect-sign-in"]
        );
    }

    #[test]
    fn server_context_excludes_redirect() {
        let set = full_set();
        assert_eq!(
            names(&set.runtime(&in_context(ExecutionContext::Server))),
            vec!["connectivity", "auth-state"]
        );
    }

    #[test]
    fn extra_sources_follow_builtins() {
        let mut set = full_set();
        set.identity = None;
        set.extra.push(SourceFn::arc(
            "menu",
            |_ctx: tokio_util::sync::CancellationToken, _emitter: crate::core::Emitter| async {
                Ok(())
            },
        ));
        assert_eq!(
            names(&set.runtime(&in_context(ExecutionContext::Client))),
            vec!["connectivity", "menu"]
        );
    }
}
