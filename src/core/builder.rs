use std::sync::Arc;

use crate::{
    actions::Bus,
    core::{config::EngineConfig, engine::Engine},
    error::RuntimeError,
    sources::{
        ConnectivityService, IdentityProvider, OnlineStatus, Reducer, SourceRef, SourceSet,
        StateReader, StorageEngine,
    },
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for an [`Engine`] and the collaborators it adapts.
pub struct EngineBuilder {
    cfg: EngineConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
    storage: Option<Arc<dyn StorageEngine>>,
    connectivity: Option<(Arc<dyn ConnectivityService>, Arc<dyn StateReader>)>,
    identity: Option<Arc<dyn IdentityProvider>>,
    reducers: Vec<Arc<dyn Reducer>>,
    extra: Vec<SourceRef>,
}

impl EngineBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: EngineConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            storage: None,
            connectivity: None,
            identity: None,
            reducers: Vec::new(),
            extra: Vec::new(),
        }
    }

    /// Sets action subscribers.
    ///
    /// Subscribers receive every published action through dedicated workers
    /// with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Sets the storage engine loaded once per run. Required.
    pub fn with_storage(mut self, storage: Arc<dyn StorageEngine>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Enables the connectivity source.
    ///
    /// `reader` exposes the host's current `online` flag; `online` actions are
    /// emitted only when a reading differs from it. Whatever backs `reader` must be
    /// updated by a [`Reducer`] (see [`with_reducer`](Self::with_reducer)) for
    /// back-to-back equal readings to be suppressed; [`with_online_status`](Self::with_online_status)
    /// wires both sides at once.
    pub fn with_connectivity(
        mut self,
        service: Arc<dyn ConnectivityService>,
        reader: Arc<dyn StateReader>,
    ) -> Self {
        self.connectivity = Some((service, reader));
        self
    }

    /// Enables the connectivity source backed by `status`.
    ///
    /// `status` is both the reader the source compares against and a reducer that
    /// applies every `online` action as it is published.
    pub fn with_online_status(
        self,
        service: Arc<dyn ConnectivityService>,
        status: OnlineStatus,
    ) -> Self {
        self.with_connectivity(service, Arc::new(status.clone()))
            .with_reducer(Arc::new(status))
    }

    /// Adds a reducer applied synchronously to every published action, in insertion order.
    pub fn with_reducer(mut self, reducer: Arc<dyn Reducer>) -> Self {
        self.reducers.push(reducer);
        self
    }

    /// Enables the auth-state source, and the redirect sign-in check in the client context.
    pub fn with_identity(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(provider);
        self
    }

    /// Adds a custom runtime source, merged after the built-in ones.
    pub fn with_source(mut self, source: SourceRef) -> Self {
        self.extra.push(source);
        self
    }

    /// Builds the engine.
    ///
    /// Must be called inside a Tokio runtime when subscribers are configured.
    ///
    /// # Errors
    /// [`RuntimeError::MissingCollaborator`] if no storage engine was set.
    pub fn build(self) -> Result<Arc<Engine>, RuntimeError> {
        let storage = self
            .storage
            .ok_or(RuntimeError::MissingCollaborator { name: "storage" })?;

        let bus = Bus::with_reducers(self.cfg.bus_capacity_clamped(), self.reducers);
        let subs = SubscriberSet::new(self.subscribers);
        let sources = SourceSet {
            storage,
            connectivity: self.connectivity,
            identity: self.identity,
            extra: self.extra,
        };

        let engine = Arc::new(Engine::new_internal(self.cfg, bus, sources));
        engine.subscriber_listener(subs);
        Ok(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_storage_is_rejected() {
        let err = EngineBuilder::new(EngineConfig::default())
            .build()
            .err()
            .expect("build without storage must fail");
        assert!(matches!(
            err,
            RuntimeError::MissingCollaborator { name: "storage" }
        ));
    }
}
