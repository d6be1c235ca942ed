//! In-memory collaborators for unit tests.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::SourceError;
use crate::sources::collaborators::{
    ConnectivityService, IdentityProvider, Listener, RedirectResult, StorageEngine, Subscription,
    UserSnapshot,
};

type Registered<T> = Arc<Mutex<Vec<(u64, Arc<Listener<T>>)>>>;

/// Listener registry shared by the fake push collaborators.
pub(crate) struct Channel<T> {
    listeners: Registered<T>,
    next: AtomicU64,
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self {
            listeners: Arc::new(Mutex::new(Vec::new())),
            next: AtomicU64::new(0),
        }
    }
}

impl<T: Clone + Send + 'static> Channel<T> {
    fn register(&self, listener: Listener<T>) -> Subscription {
        let id = self.next.fetch_add(1, Ordering::SeqCst);
        self.listeners
            .lock()
            .unwrap()
            .push((id, Arc::new(listener)));

        let listeners = Arc::clone(&self.listeners);
        Subscription::new(move || {
            listeners.lock().unwrap().retain(|(other, _)| *other != id);
        })
    }

    pub(crate) fn push(&self, reading: Result<T, SourceError>) {
        let snapshot: Vec<_> = self
            .listeners
            .lock()
            .unwrap()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in snapshot {
            (*listener)(reading.clone());
        }
    }

    pub(crate) fn active(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }
}

#[derive(Default)]
pub(crate) struct FakeConnectivity {
    pub(crate) channel: Channel<bool>,
}

impl ConnectivityService for FakeConnectivity {
    fn on_connected(&self, listener: Listener<bool>) -> Subscription {
        self.channel.register(listener)
    }
}

#[derive(Default)]
pub(crate) struct FakeIdentity {
    pub(crate) auth: Channel<Option<UserSnapshot>>,
    redirect: Mutex<Option<oneshot::Receiver<Result<RedirectResult, SourceError>>>>,
    pub(crate) redirect_calls: AtomicUsize,
}

impl FakeIdentity {
    /// Makes the next redirect check wait for the returned sender.
    pub(crate) fn defer_redirect(&self) -> oneshot::Sender<Result<RedirectResult, SourceError>> {
        let (tx, rx) = oneshot::channel();
        *self.redirect.lock().unwrap() = Some(rx);
        tx
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    fn on_auth_state_changed(&self, listener: Listener<Option<UserSnapshot>>) -> Subscription {
        self.auth.register(listener)
    }

    async fn get_redirect_result(&self) -> Result<RedirectResult, SourceError> {
        self.redirect_calls.fetch_add(1, Ordering::SeqCst);
        let pending = self.redirect.lock().unwrap().take();
        match pending {
            Some(rx) => rx.await.unwrap_or_else(|_| Ok(RedirectResult::default())),
            None => Ok(RedirectResult::default()),
        }
    }
}

/// Storage that resolves once the test sends on the returned channel.
pub(crate) struct DeferredStorage {
    rx: Mutex<Option<oneshot::Receiver<Result<Value, SourceError>>>>,
    pub(crate) loads: AtomicUsize,
}

impl DeferredStorage {
    pub(crate) fn new() -> (Self, oneshot::Sender<Result<Value, SourceError>>) {
        let (tx, rx) = oneshot::channel();
        let storage = Self {
            rx: Mutex::new(Some(rx)),
            loads: AtomicUsize::new(0),
        };
        (storage, tx)
    }
}

#[async_trait]
impl StorageEngine for DeferredStorage {
    async fn load(&self) -> Result<Value, SourceError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let pending = self.rx.lock().unwrap().take();
        match pending {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(SourceError::storage("sender dropped"))),
            None => Err(SourceError::storage("loaded twice")),
        }
    }
}

/// Storage that resolves immediately with the same state on every load.
pub(crate) struct MemoryStorage {
    state: Result<Value, SourceError>,
    pub(crate) loads: AtomicUsize,
}

impl MemoryStorage {
    pub(crate) fn new(state: Result<Value, SourceError>) -> Self {
        Self {
            state,
            loads: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl StorageEngine for MemoryStorage {
    async fn load(&self) -> Result<Value, SourceError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.state.clone()
    }
}
