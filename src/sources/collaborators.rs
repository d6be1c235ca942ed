//! # External collaborators consumed by the sources.
//!
//! The engine talks to the outside world only through these traits:
//!
//! | Collaborator            | Used by                   | Shape                                   |
//! |-------------------------|---------------------------|-----------------------------------------|
//! | [`StorageEngine`]       | lifecycle (once per run)  | `load() -> Result<Value, _>`            |
//! | [`ConnectivityService`] | `connectivity` source     | listener in, [`Subscription`] out       |
//! | [`IdentityProvider`]    | `auth-state`, `redirect`  | listener in, [`Subscription`] out; one-shot redirect check |
//! | [`StateReader`]         | `connectivity` source     | fresh `online()` read per event         |
//! | [`Reducer`]             | every publish on the bus  | synchronous `reduce(&Action)`           |
//!
//! Push-style collaborators receive a [`Listener`] and hand back a [`Subscription`]
//! guard. Dropping the guard (or calling [`Subscription::unsubscribe`]) runs the
//! collaborator's own detach function exactly once.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::{
    actions::{Action, ActionKind},
    error::SourceError,
};

/// Opaque identity-provider user object, relayed verbatim.
pub type UserSnapshot = Value;

/// Callback a push-style collaborator invokes on every change (or fault).
pub type Listener<T> = Box<dyn Fn(Result<T, SourceError>) + Send + Sync + 'static>;

/// Guard over a registered listener.
///
/// The detach function runs at most once: on [`unsubscribe`](Self::unsubscribe) or on drop.
pub struct Subscription {
    detach: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl Subscription {
    /// Wraps the collaborator's detach function.
    pub fn new(detach: impl FnOnce() + Send + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// A subscription with nothing to release.
    pub fn noop() -> Self {
        Self { detach: None }
    }

    /// Detaches now.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}

/// Persistent-storage engine, loaded once per run.
#[async_trait]
pub trait StorageEngine: Send + Sync + 'static {
    /// Loads the persisted application state.
    async fn load(&self) -> Result<Value, SourceError>;
}

/// Realtime "is connected" channel.
pub trait ConnectivityService: Send + Sync + 'static {
    /// Registers `listener` for every connectivity change.
    fn on_connected(&self, listener: Listener<bool>) -> Subscription;
}

/// Outcome of the post-redirect sign-in check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedirectResult {
    /// The signed-in user, if a redirect sign-in was pending.
    #[serde(default)]
    pub user: Option<UserSnapshot>,
}

/// Identity provider: session notifications and redirect sign-in results.
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// Registers `listener` for every session change; `None` means signed out.
    ///
    /// The returned subscription must carry the provider's own detach function.
    fn on_auth_state_changed(&self, listener: Listener<Option<UserSnapshot>>) -> Subscription;

    /// Resolves the pending redirect sign-in, if any.
    async fn get_redirect_result(&self) -> Result<RedirectResult, SourceError>;
}

/// Read-only accessor for the last known online value held by the consumer.
pub trait StateReader: Send + Sync + 'static {
    /// Returns the online value currently held by application state.
    fn online(&self) -> bool;
}

impl<F> StateReader for F
where
    F: Fn() -> bool + Send + Sync + 'static,
{
    fn online(&self) -> bool {
        self()
    }
}

/// Synchronous application-state update, applied to every published action.
///
/// Runs on the publishing path before the action reaches any receiver; for source
/// emissions that is inside the engine's emission lock. A source that reads state
/// right after emitting therefore observes its own update. Must not block and must
/// not call back into the engine.
///
/// ```
/// use actionvisor::{Action, OnlineStatus, Reducer, StateReader};
///
/// let status = OnlineStatus::new(false);
/// status.reduce(&Action::online(true));
/// assert!(status.online());
/// ```
pub trait Reducer: Send + Sync + 'static {
    /// Applies `action` to application state.
    fn reduce(&self, action: &Action);
}

impl<F> Reducer for F
where
    F: Fn(&Action) + Send + Sync + 'static,
{
    fn reduce(&self, action: &Action) {
        self(action)
    }
}

/// Shared online flag a consumer can keep in its state and hand to the engine.
///
/// ```
/// use actionvisor::{Action, OnlineStatus, StateReader};
///
/// let status = OnlineStatus::new(false);
/// assert!(status.apply(&Action::online(true)));
/// assert!(status.online());
/// ```
#[derive(Clone, Debug, Default)]
pub struct OnlineStatus(Arc<AtomicBool>);

impl OnlineStatus {
    /// Creates a flag holding `initial`.
    pub fn new(initial: bool) -> Self {
        Self(Arc::new(AtomicBool::new(initial)))
    }

    /// Overwrites the held value.
    pub fn set(&self, online: bool) {
        self.0.store(online, Ordering::SeqCst);
    }

    /// Reducer step: applies an `online` action; returns whether it was one.
    pub fn apply(&self, action: &Action) -> bool {
        if action.kind() != ActionKind::Online {
            return false;
        }
        match action.online_value() {
            Some(online) => {
                self.set(online);
                true
            }
            None => false,
        }
    }
}

impl Reducer for OnlineStatus {
    fn reduce(&self, action: &Action) {
        self.apply(action);
    }
}

impl StateReader for OnlineStatus {
    fn online(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Bridges a push [`Listener`] into a channel a source task can `select!` on.
pub(crate) fn bridge<T: Send + 'static>()
-> (Listener<T>, mpsc::UnboundedReceiver<Result<T, SourceError>>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let listener: Listener<T> = Box::new(move |reading| {
        let _ = tx.send(reading);
    });
    (listener, rx)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    #[test]
    fn subscription_detaches_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let sub = Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        sub.unsubscribe();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn subscription_detaches_on_drop() {
        let calls = Arc::new(AtomicUsize::new(0));
        {
            let counter = Arc::clone(&calls);
            let _sub = Subscription::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn closures_are_state_readers() {
        let reader = || true;
        assert!(reader.online());
    }

    #[test]
    fn closures_are_reducers() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let reducer = move |_action: &Action| {
            counter.fetch_add(1, Ordering::SeqCst);
        };
        reducer.reduce(&Action::start());
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn online_status_ignores_other_kinds() {
        let status = OnlineStatus::new(true);
        assert!(!status.apply(&Action::show_menu(false)));
        assert!(status.online());
    }

    #[tokio::test]
    async fn bridge_forwards_readings_in_order() {
        let (listener, mut rx) = bridge::<bool>();
        listener(Ok(true));
        listener(Err(SourceError::listener("gone")));

        assert_eq!(rx.recv().await, Some(Ok(true)));
        assert_eq!(rx.recv().await, Some(Err(SourceError::listener("gone"))));
    }
}
