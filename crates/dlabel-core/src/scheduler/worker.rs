use std::{collections::BTreeMap, sync::Arc};

use dlabel_model::LabelSpec;
use tokio::{sync::Mutex, time::Instant};
use tracing::{debug, trace, warn};

use crate::{
    metrics::MetricsHandle,
    runner::{ExecOutcome, RunnerHandle},
    store::ResultStore,
};

/// Everything a label task needs to refresh one label.
///
/// Cheap to clone; each background loop owns its own copy.
/// Clones share one lane per label, so a label runs at most once at a time
/// whether it was triggered by `sync` or by its periodic loop.
#[derive(Clone)]
pub(super) struct Worker {
    store: ResultStore,
    runner: RunnerHandle,
    metrics: MetricsHandle,
    lanes: Arc<BTreeMap<String, Mutex<()>>>,
}

impl Worker {
    pub(super) fn new<I>(
        names: I,
        store: ResultStore,
        runner: RunnerHandle,
        metrics: MetricsHandle,
    ) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            store,
            runner,
            metrics,
            lanes: Arc::new(names.into_iter().map(|n| (n, Mutex::new(()))).collect()),
        }
    }

    /// Run the label command once and store its outcome.
    ///
    /// Waits for an in-flight execution of the same label to finish first.
    pub(super) async fn execute(&self, spec: &LabelSpec) {
        let name = spec.name();
        let _lane = match self.lanes.get(name) {
            Some(lane) => Some(lane.lock().await),
            None => None,
        };
        trace!(label = name, runner = self.runner.name(), "executing label command");
        self.metrics.record_label_started(name);

        let started = Instant::now();
        let outcome = self.runner.run(spec).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match &outcome {
            ExecOutcome::Success(value) => {
                debug!(label = name, duration_ms, value = %value, "label updated");
            }
            ExecOutcome::Failed(reason) | ExecOutcome::TimedOut(reason) => {
                warn!(label = name, duration_ms, reason = %reason, "label command failed");
            }
        }

        let kind = outcome.kind();
        self.store.set(name, outcome.into_result());
        self.metrics.record_label_completed(name, kind, duration_ms);
    }

    pub(super) fn loop_stopped(&self, spec: &LabelSpec) {
        self.metrics.record_loop_stopped(spec.name());
    }
}
