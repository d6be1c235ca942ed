//! # Tracker of currently attached sources.
//!
//! Maintains which runtime sources currently hold a subscription, per run, so that a
//! stop which overruns its grace period can report (and forget) exactly the stuck
//! sources of the run being stopped, even if a new run has started meanwhile.
//!
//! ## Architecture
//! ```text
//! runner::run_source ──► attach(run, name) ──► Source::run ──► detach(run, name)
//!                                                                    │
//!                                                                    ▼
//!                                              HashMap<u64, HashMap<String, usize>>
//!                                              (run → name → attached instances)
//! ```
//!
//! ## Rules
//! - Names are counted, so two sources sharing a name are tracked independently
//! - `detach` of an unknown run or name is a no-op
//! - Reads are eventually consistent with the running tasks

use std::collections::{BTreeSet, HashMap};

use tokio::sync::RwLock;

type Counts = HashMap<String, usize>;

/// Attach bookkeeping shared by every run of one engine.
#[derive(Debug, Default)]
pub(crate) struct AttachedSources {
    runs: RwLock<HashMap<u64, Counts>>,
}

impl AttachedSources {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records one attached instance of `name` for `run`.
    pub(crate) async fn attach(&self, run: u64, name: &str) {
        let mut runs = self.runs.write().await;
        *runs
            .entry(run)
            .or_default()
            .entry(name.to_string())
            .or_insert(0) += 1;
    }

    /// Removes one attached instance of `name` for `run`.
    pub(crate) async fn detach(&self, run: u64, name: &str) {
        let mut runs = self.runs.write().await;
        let Some(counts) = runs.get_mut(&run) else {
            return;
        };
        if let Some(count) = counts.get_mut(name) {
            *count -= 1;
            if *count == 0 {
                counts.remove(name);
            }
        }
        if counts.is_empty() {
            runs.remove(&run);
        }
    }

    /// Sorted, de-duplicated names attached across all runs.
    pub(crate) async fn snapshot(&self) -> Vec<String> {
        let runs = self.runs.read().await;
        runs.values()
            .flat_map(|counts| counts.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted names still attached for `run`.
    pub(crate) async fn snapshot_run(&self, run: u64) -> Vec<String> {
        let runs = self.runs.read().await;
        let mut names: Vec<String> = runs
            .get(&run)
            .map(|counts| counts.keys().cloned().collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    /// Forgets everything recorded for `run`; other runs are untouched.
    pub(crate) async fn clear_run(&self, run: u64) {
        self.runs.write().await.remove(&run);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_instances_per_name() {
        let attached = AttachedSources::new();
        attached.attach(1, "auth-state").await;
        attached.attach(1, "connectivity").await;
        attached.attach(1, "connectivity").await;

        attached.detach(1, "connectivity").await;
        assert_eq!(attached.snapshot().await, vec!["auth-state", "connectivity"]);

        attached.detach(1, "connectivity").await;
        attached.detach(1, "unknown").await;
        attached.detach(7, "auth-state").await;
        assert_eq!(attached.snapshot().await, vec!["auth-state"]);

        attached.detach(1, "auth-state").await;
        assert!(attached.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn clearing_one_run_keeps_the_next() {
        let attached = AttachedSources::new();
        attached.attach(1, "stubborn").await;
        attached.attach(2, "stubborn").await;
        attached.attach(2, "auth-state").await;

        assert_eq!(attached.snapshot_run(1).await, vec!["stubborn"]);
        attached.clear_run(1).await;

        assert!(attached.snapshot_run(1).await.is_empty());
        assert_eq!(
            attached.snapshot_run(2).await,
            vec!["auth-state", "stubborn"]
        );
        assert_eq!(attached.snapshot().await, vec!["auth-state", "stubborn"]);
    }
}
