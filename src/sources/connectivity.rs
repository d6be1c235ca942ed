//! # Connectivity adapter.
//!
//! Relays the realtime "is connected" channel as `online` actions, suppressing
//! readings equal to the value application state already holds.
//!
//! ## Rules
//! - The comparison value is read from the [`StateReader`] on **every** reading,
//!   never remembered by the adapter
//! - A listener fault ends the adapter with [`SourceError::Listener`]
//! - The listener is deregistered on cancel, fault, and drop

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{
    actions::Action,
    core::Emitter,
    error::SourceError,
    sources::{
        collaborators::{ConnectivityService, StateReader, bridge},
        source::Source,
    },
};

/// `connectivity` source.
pub struct Connectivity {
    service: Arc<dyn ConnectivityService>,
    reader: Arc<dyn StateReader>,
}

impl Connectivity {
    /// Source name used in logs and attach tracking.
    pub const NAME: &'static str = "connectivity";

    /// Creates the adapter; `reader` supplies the last known online value.
    pub fn new(service: Arc<dyn ConnectivityService>, reader: Arc<dyn StateReader>) -> Self {
        Self { service, reader }
    }
}

#[async_trait]
impl Source for Connectivity {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn run(&self, ctx: CancellationToken, emitter: Emitter) -> Result<(), SourceError> {
        let (listener, mut readings) = bridge::<bool>();
        let subscription = self.service.on_connected(listener);

        let res = loop {
            tokio::select! {
                biased;
                _ = ctx.cancelled() => break Ok(()),
                reading = readings.recv() => match reading {
                    Some(Ok(online)) => {
                        if online != self.reader.online() {
                            emitter.emit(Action::online(online));
                        }
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
