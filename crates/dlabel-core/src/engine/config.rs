use std::{collections::BTreeMap, fmt};

use dlabel_model::CommandLabel;
use tokio_util::sync::CancellationToken;

use crate::{
    metrics::{MetricsHandle, noop_metrics},
    runner::RunnerHandle,
};

/// Construction parameters for [`crate::DynamicLabels`].
#[derive(Clone)]
pub struct DynamicLabelsConfig {
    /// Label name to command configuration.
    pub labels: BTreeMap<String, CommandLabel>,
    /// Lifetime of the engine: cancelling it stops all background refresh.
    pub close: CancellationToken,
    /// Executes label commands.
    pub runner: RunnerHandle,
    /// Receives per-execution metrics. Defaults to no-op.
    pub metrics: MetricsHandle,
}

impl DynamicLabelsConfig {
    pub fn new(
        labels: BTreeMap<String, CommandLabel>,
        close: CancellationToken,
        runner: RunnerHandle,
    ) -> Self {
        Self {
            labels,
            close,
            runner,
            metrics: noop_metrics(),
        }
    }

    /// Replace the metrics backend.
    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }
}

impl fmt::Debug for DynamicLabelsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicLabelsConfig")
            .field("labels", &self.labels)
            .field("close", &self.close.is_cancelled())
            .field("runner", &self.runner.name())
            .field("metrics", &"<handle>")
            .finish()
    }
}
