use std::sync::Arc;

/// Execution outcome for metrics classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelOutcome {
    /// Command exited with status 0.
    Success,
    /// Command could not run or exited unsuccessfully.
    Failure,
    /// Command exceeded its timeout.
    Timeout,
}

impl LabelOutcome {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            LabelOutcome::Success => "success",
            LabelOutcome::Failure => "failure",
            LabelOutcome::Timeout => "timeout",
        }
    }
}

/// Backend metrics collection interface.
///
/// Called by the scheduler around every command execution.
pub trait MetricsBackend: Send + Sync + 'static {
    /// Record that a command for `label` is about to be spawned.
    fn record_label_started(&self, label: &str);
    /// Record command completion with outcome and duration.
    ///
    /// # Arguments
    /// - `label`: Label name
    /// - `outcome`: How the execution ended
    /// - `duration_ms`: Execution time in milliseconds
    fn record_label_completed(&self, label: &str, outcome: LabelOutcome, duration_ms: u64);
    /// Record that the periodic loop of `label` exited after cancellation.
    fn record_loop_stopped(&self, label: &str);
}

/// Shared handle to metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
