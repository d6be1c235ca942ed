//! # Multiplexer: merge runtime sources under one cancellable group.
//!
//! After `started`, every runtime source of the run is spawned as a child task of a
//! single [`JoinSet`], each with a child token of the group token. All of them publish
//! through clones of the same [`Emitter`], so the merged stream keeps each source's
//! own order and interleaves sources in arrival order.
//!
//! ## Architecture
//! ```text
//!                    group token (child of the run token)
//!          ┌─────────────────┬───────────────┴───┬──────────────────┐
//!          ▼                 ▼                   ▼                  ▼
//!   connectivity        auth-state       redirect-sign-in     custom sources
//!   (child token)       (child token)     (client only)        (with_source)
//!          └─────────────────┴─────── Emitter ───┴──────────────────┘
//!                                        ▼
//!                                       Bus
//! ```
//!
//! ## Rules
//! - Cancelling the group cancels every child; cancelling twice is a no-op
//! - Dropping the multiplexer future drops the `JoinSet`, which aborts every child
//! - A source fault goes through the [`ErrorBoundary`](super::boundary::ErrorBoundary)

use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        attached::AttachedSources,
        boundary::ErrorBoundary,
        emitter::Emitter,
        runner::{SourceExit, run_source},
    },
    error::SourceError,
    sources::SourceRef,
};

/// Merges the runtime sources of one run.
pub(crate) struct Multiplexer {
    sources: Vec<SourceRef>,
    boundary: ErrorBoundary,
    attached: Arc<AttachedSources>,
}

impl Multiplexer {
    pub(crate) fn new(
        sources: Vec<SourceRef>,
        boundary: ErrorBoundary,
        attached: Arc<AttachedSources>,
    ) -> Self {
        Self {
            sources,
            boundary,
            attached,
        }
    }

    /// Runs every source until all of them have finished.
    ///
    /// Returns once the group is cancelled and every child has detached, or when all
    /// sources completed on their own.
    pub(crate) async fn run(self, group: CancellationToken, emitter: Emitter) {
        let mut set = JoinSet::new();
        for source in self.sources {
            set.spawn(run_source(
                source,
                group.child_token(),
                emitter.clone(),
                Arc::clone(&self.attached),
            ));
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(SourceExit { name, result: Ok(()) }) => {
                    tracing::debug!(source = %name, "source finished");
                }
                Ok(SourceExit {
                    name,
                    result: Err(err),
                }) => {
                    self.boundary.absorb(&name, &err, &emitter, &group);
                }
                Err(join_err) if join_err.is_cancelled() => {}
                Err(join_err) => {
                    let err = SourceError::listener(format!("source task failed: {join_err}"));
                    self.boundary.absorb("unknown", &err, &emitter, &group);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::actions::{Action, ActionKind, Bus};
    use crate::core::boundary::FaultPolicy;
    use crate::core::lifecycle::Gate;
    use crate::sources::SourceFn;

    fn pending_source(name: &'static str) -> SourceRef {
        SourceFn::arc(name, |ctx: CancellationToken, _emitter: Emitter| async move {
            ctx.cancelled().await;
            Ok(())
        })
    }

    fn failing_source(name: &'static str) -> SourceRef {
        SourceFn::arc(name, |_ctx: CancellationToken, _emitter: Emitter| async move {
            Err(SourceError::listener("permission denied"))
        })
    }

    fn live(bus: &Bus) -> (Arc<Gate>, Emitter) {
        let gate = Arc::new(Gate::new());
        let run = gate.open().unwrap();
        let emitter = Emitter::new(Arc::clone(&gate), bus.clone(), run);
        (gate, emitter)
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_detaches_every_source() {
        let bus = Bus::new(8);
        let (_gate, emitter) = live(&bus);
        let attached = Arc::new(AttachedSources::new());
        let group = CancellationToken::new();

        let mux = Multiplexer::new(
            vec![pending_source("a"), pending_source("b")],
            ErrorBoundary::default(),
            Arc::clone(&attached),
        );
        let handle = tokio::spawn(mux.run(group.clone(), emitter));

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(attached.snapshot().await, vec!["a", "b"]);

        group.cancel();
        group.cancel();
        handle.await.unwrap();
        assert!(attached.snapshot().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn isolate_keeps_siblings_attached() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let (_gate, emitter) = live(&bus);
        let attached = Arc::new(AttachedSources::new());
        let group = CancellationToken::new();

        let mux = Multiplexer::new(
            vec![failing_source("auth-state"), pending_source("connectivity")],
            ErrorBoundary::new(FaultPolicy::Isolate),
            Arc::clone(&attached),
        );
        let handle = tokio::spawn(mux.run(group.clone(), emitter));

        let action = rx.recv().await.unwrap();
        assert_eq!(action.kind(), ActionKind::Error);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(attached.snapshot().await, vec!["connectivity"]);
        assert!(!group.is_cancelled());

        group.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn propagate_ends_the_merged_stream() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let (_gate, emitter) = live(&bus);
        let attached = Arc::new(AttachedSources::new());
        let group = CancellationToken::new();

        let mux = Multiplexer::new(
            vec![failing_source("auth-state"), pending_source("connectivity")],
            ErrorBoundary::new(FaultPolicy::Propagate),
            Arc::clone(&attached),
        );
        mux.run(group.clone(), emitter).await;

        assert!(group.is_cancelled());
        assert!(attached.snapshot().await.is_empty());
        assert_eq!(rx.recv().await.unwrap().kind(), ActionKind::Error);
    }

    #[tokio::test]
    async fn per_source_order_is_preserved() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let (_gate, emitter) = live(&bus);

        let burst: SourceRef =
            SourceFn::arc("burst", |_ctx: CancellationToken, emitter: Emitter| async move {
                for show in [true, false, true] {
                    emitter.emit(Action::show_menu(show));
                }
                Ok(())
            });

        Multiplexer::new(
            vec![burst],
            ErrorBoundary::default(),
            Arc::new(AttachedSources::new()),
        )
        .run(CancellationToken::new(), emitter)
        .await;

        for show in [true, false, true] {
            assert_eq!(rx.recv().await.unwrap(), Action::show_menu(show));
        }
    }
}
