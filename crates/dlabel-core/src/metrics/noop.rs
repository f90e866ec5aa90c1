use crate::metrics::backend::{LabelOutcome, MetricsBackend};

/// No-op metrics backend that compiles to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl MetricsBackend for NoOpMetrics {
    #[inline(always)]
    fn record_label_started(&self, _: &str) {}

    #[inline(always)]
    fn record_label_completed(&self, _: &str, _: LabelOutcome, _: u64) {}

    #[inline(always)]
    fn record_loop_stopped(&self, _: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_metrics_is_zero_size() {
        assert_eq!(std::mem::size_of::<NoOpMetrics>(), 0);
    }

    #[test]
    fn outcome_labels_are_stable() {
        assert_eq!(LabelOutcome::Success.as_label(), "success");
        assert_eq!(LabelOutcome::Failure.as_label(), "failure");
        assert_eq!(LabelOutcome::Timeout.as_label(), "timeout");
    }
}
