use std::sync::Arc;

use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts, Registry, proto::MetricFamily};

use dlabel_core::{LabelOutcome, MetricsBackend};

const NAMESPACE: &str = "dlabel";

/// Prometheus metrics backend for label execution.
///
/// Label cardinality is bounded by the configured label set:
/// - `label`: configured label names
/// - `outcome`: "success", "failure", "timeout"
#[derive(Clone)]
pub struct PrometheusMetrics {
    runs_started: CounterVec,
    runs_completed: CounterVec,
    run_duration: HistogramVec,
    loops_stopped: CounterVec,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    /// Create a backend registering its collectors in `registry`.
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let runs_started = CounterVec::new(
            Opts::new("label_runs_started_total", "Label commands spawned").namespace(NAMESPACE),
            &["label"],
        )?;
        registry.register(Box::new(runs_started.clone()))?;

        let runs_completed = CounterVec::new(
            Opts::new("label_runs_completed_total", "Label commands finished").namespace(NAMESPACE),
            &["label", "outcome"],
        )?;
        registry.register(Box::new(runs_completed.clone()))?;

        let run_duration = HistogramVec::new(
            HistogramOpts::new("label_run_duration_seconds", "Label command duration in seconds")
                .namespace(NAMESPACE)
                .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 15.0, 60.0]),
            &["label"],
        )?;
        registry.register(Box::new(run_duration.clone()))?;

        let loops_stopped = CounterVec::new(
            Opts::new("label_loops_stopped_total", "Label refresh loops stopped").namespace(NAMESPACE),
            &["label"],
        )?;
        registry.register(Box::new(loops_stopped.clone()))?;

        Ok(Self {
            runs_started,
            runs_completed,
            run_duration,
            loops_stopped,
            registry,
        })
    }

    /// Create a backend with its own registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    /// Gather all metrics for exposition.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_label_started(&self, label: &str) {
        self.runs_started.with_label_values(&[label]).inc();
    }

    fn record_label_completed(&self, label: &str, outcome: LabelOutcome, duration_ms: u64) {
        self.runs_completed
            .with_label_values(&[label, outcome.as_label()])
            .inc();
        self.run_duration
            .with_label_values(&[label])
            .observe(duration_ms as f64 / 1000.0);
    }

    fn record_loop_stopped(&self, label: &str) {
        self.loops_stopped.with_label_values(&[label]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family<'a>(families: &'a [MetricFamily], name: &str) -> &'a MetricFamily {
        families
            .iter()
            .find(|f| f.name() == name)
            .unwrap_or_else(|| panic!("metric {name} not found"))
    }

    #[test]
    fn started_is_counted_per_label() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.record_label_started("arch");
        metrics.record_label_started("arch");
        metrics.record_label_started("uptime");

        let families = metrics.gather();
        let started = family(&families, "dlabel_label_runs_started_total");
        assert_eq!(started.get_metric().len(), 2);
    }

    #[test]
    fn completed_records_outcome_and_duration() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.record_label_completed("arch", LabelOutcome::Success, 12);
        metrics.record_label_completed("arch", LabelOutcome::Timeout, 5_000);

        let families = metrics.gather();
        assert_eq!(
            family(&families, "dlabel_label_runs_completed_total").get_metric().len(),
            2
        );
        assert_eq!(
            family(&families, "dlabel_label_run_duration_seconds").get_metric().len(),
            1
        );
    }

    #[test]
    fn loop_stops_are_counted() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.record_loop_stopped("arch");

        let families = metrics.gather();
        assert_eq!(
            family(&families, "dlabel_label_loops_stopped_total").get_metric().len(),
            1
        );
    }

    #[test]
    fn shares_custom_registry() {
        let registry = Arc::new(Registry::new());
        let metrics = PrometheusMetrics::new_with_registry(registry.clone()).unwrap();

        metrics.record_label_started("arch");
        assert!(!registry.gather().is_empty());
    }

    #[test]
    fn registering_twice_in_one_registry_fails() {
        let registry = Arc::new(Registry::new());
        PrometheusMetrics::new_with_registry(registry.clone()).unwrap();
        assert!(PrometheusMetrics::new_with_registry(registry).is_err());
    }
}
