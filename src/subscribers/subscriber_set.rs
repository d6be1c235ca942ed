//! # Non-blocking action fan-out to multiple subscribers.
//!
//! Provides [`SubscriberSet`], which distributes actions to multiple subscribers
//! concurrently without blocking the publisher.
//!
//! ## Architecture
//! ```text
//! emit(action)
//!     │
//!     ├──► [queue 1] ──► worker 1 ──► subscriber1.on_action()
//!     │    (bounded)         └──────► panic → tracing::error!
//!     ├──► [queue 2] ──► worker 2 ──► subscriber2.on_action()
//!     └──► [queue N] ──► worker N ──► subscriberN.on_action()
//! ```
//!
//! ## Rules
//! - **No cross-subscriber ordering**: subscriber A may process action N while B processes N+5
//! - **Overflow**: action dropped for that subscriber only, warning logged
//! - **Non-blocking**: `emit()` returns immediately (uses `try_send`)
//! - **Per-subscriber FIFO**: each subscriber sees actions in order
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a subscriber uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::actions::Action;
use crate::subscribers::Subscribe;

/// Per-subscriber channel metadata.
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Action>>,
}

/// Fan-out coordinator for multiple action subscribers.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker task per subscriber.
    ///
    /// Must be called inside a Tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let cap = sub.queue_capacity().max(1);
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Action>>(cap);

            let handle = tokio::spawn(async move {
                while let Some(action) = rx.recv().await {
                    let fut = sub.on_action(action.as_ref());

                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        let any = &*panic_err;
                        let info = if let Some(msg) = any.downcast_ref::<&'static str>() {
                            (*msg).to_string()
                        } else if let Some(msg) = any.downcast_ref::<String>() {
                            msg.clone()
                        } else {
                            "unknown panic".to_string()
                        };
                        tracing::error!(subscriber = sub.name(), info = %info, "subscriber panicked");
                    }
                }
            });
            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }
        Self { channels, workers }
    }

    /// Number of subscribers in the set.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// True if the set has no subscribers.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Emits an action to all subscribers (clones the action once).
    ///
    /// On a full or closed queue the action is dropped for that subscriber and a
    /// warning is logged.
    pub fn emit(&self, action: &Action) {
        if self.channels.is_empty() {
            return;
        }
        let action = Arc::new(action.clone());
        for channel in &self.channels {
            match channel.sender.try_send(Arc::clone(&action)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(subscriber = channel.name, kind = %action.kind(), reason = "full", "subscriber overflow");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::warn!(subscriber = channel.name, kind = %action.kind(), reason = "closed", "subscriber overflow");
                }
            }
        }
    }

    /// Gracefully shuts down all subscriber workers.
    ///
    /// 1. Drops all channel senders (workers see channel closed)
    /// 2. Awaits all worker tasks to finish
    pub async fn shutdown(self) {
        drop(self.channels);

        for h in self.workers {
            let _ = h.await;
        }
    }
}
