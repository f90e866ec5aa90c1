use std::{ffi::OsString, fs, path::Path};

use anyhow::Context;
use dlabel_prometheus::{Encoder, PrometheusMetrics, TextEncoder};

/// Prometheus text exposition of every registered metric.
pub fn render(metrics: &PrometheusMetrics) -> anyhow::Result<String> {
    let mut buf = Vec::new();
    TextEncoder::new()
        .encode(&metrics.gather(), &mut buf)
        .context("encode metrics")?;
    String::from_utf8(buf).context("metrics are not utf-8")
}

/// Write the exposition for a node-exporter textfile collector.
///
/// Goes through a sibling `.tmp` file and a rename so scrapers never read a partial file.
pub fn write_textfile(metrics: &PrometheusMetrics, path: &Path) -> anyhow::Result<()> {
    let body = render(metrics)?;

    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(".tmp");
    fs::write(&tmp, body).with_context(|| format!("write {}", Path::new(&tmp).display()))?;
    fs::rename(&tmp, path).with_context(|| format!("replace {}", path.display()))
}

#[cfg(test)]
mod tests {
    use dlabel_core::{LabelOutcome, MetricsBackend};

    use super::*;

    #[test]
    fn render_includes_label_series() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.record_label_started("arch");
        metrics.record_label_completed("arch", LabelOutcome::Failure, 40);

        let text = render(&metrics).unwrap();
        assert!(text.contains(r#"dlabel_label_runs_started_total{label="arch"} 1"#), "{text}");
        assert!(text.contains(r#"outcome="failure""#));
        assert!(text.contains("dlabel_label_run_duration_seconds_bucket"));
    }

    #[test]
    fn textfile_is_replaced_in_place() {
        let path = std::env::temp_dir().join(format!("dlabel-{}.prom", uuid::Uuid::new_v4()));
        let metrics = PrometheusMetrics::new().unwrap();

        metrics.record_loop_stopped("arch");
        write_textfile(&metrics, &path).unwrap();
        metrics.record_loop_stopped("arch");
        write_textfile(&metrics, &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert!(text.contains(r#"dlabel_label_loops_stopped_total{label="arch"} 2"#), "{text}");
    }

    #[test]
    fn textfile_reports_missing_directory() {
        let metrics = PrometheusMetrics::new().unwrap();
        let err = write_textfile(&metrics, Path::new("/nonexistent/dir/dlabel.prom")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/dir/dlabel.prom"));
    }
}
