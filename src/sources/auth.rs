//! # Auth-state adapter.
//!
//! One `auth-changed` per identity-provider session notification, signed-out
//! (`None`) included. Detaching goes through the provider's own unsubscribe
//! function carried by the [`Subscription`](super::Subscription).

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{
    actions::Action,
    core::Emitter,
    error::SourceError,
    sources::{
        collaborators::{IdentityProvider, UserSnapshot, bridge},
        source::Source,
    },
};

/// `auth-state` source.
pub struct AuthState {
    provider: Arc<dyn IdentityProvider>,
}

impl AuthState {
    /// Source name used in logs and attach tracking.
    pub const NAME: &'static str = "auth-state";

    /// Creates the adapter over `provider`'s session notifications.
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Source for AuthState {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn run(&self, ctx: CancellationToken, emitter: Emitter) -> Result<(), SourceError> {
        let (listener, mut changes) = bridge::<Option<UserSnapshot>>();
        let subscription = self.provider.on_auth_state_changed(listener);

        let res = loop {
            tokio::select! {
                biased;
                _ = ctx.cancelled() => break Ok(()),
                change = changes.recv() => match change {
                    Some(Ok(user)) => {
                        emitter.emit(Action::auth_changed(user));
                    }
                    Some(Err(err)) => break Err(err),
                    None => break Ok(()),
                },
            }
        };

        subscription.unsubscribe();
        res
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::actions::Bus;
    use crate::core::live_emitter;
    use crate::sources::fakes::FakeIdentity;

    #[tokio::test(start_paused = true)]
    async fn relays_every_notification_including_sign_out() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let (_gate, emitter) = live_emitter(&bus);
        let provider = Arc::new(FakeIdentity::default());
        let source = AuthState::new(provider.clone());
        let ctx = CancellationToken::new();

        let task = tokio::spawn({
            let ctx = ctx.clone();
            async move { source.run(ctx, emitter).await }
        });
        tokio::time::sleep(Duration::from_millis(1)).await;

        let user = json!({ "uid": "u1", "email": "a@example.com" });
        provider.auth.push(Ok(Some(user.clone())));
        provider.auth.push(Ok(Some(user.clone())));
        provider.auth.push(Ok(None));

        assert_eq!(rx.recv().await.unwrap(), Action::auth_changed(Some(user.clone())));
        assert_eq!(rx.recv().await.unwrap(), Action::auth_changed(Some(user)));
        assert_eq!(rx.recv().await.unwrap(), Action::auth_changed(None));

        ctx.cancel();
        task.await.unwrap().unwrap();
        assert_eq!(provider.auth.active(), 0);
    }
}
