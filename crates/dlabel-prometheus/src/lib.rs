//! Prometheus metrics backend for the dynamic label engine.
//!
//! Provides [`PrometheusMetrics`], an implementation of [`dlabel_core::MetricsBackend`].
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use dlabel_prometheus::PrometheusMetrics;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let handle: dlabel_core::MetricsHandle = Arc::new(metrics.clone());
//! // DynamicLabelsConfig::new(labels, close, runner).with_metrics(handle)
//! # let _ = handle;
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `dlabel_label_runs_started_total{label}` - Counter
//! - `dlabel_label_runs_completed_total{label, outcome}` - Counter
//! - `dlabel_label_run_duration_seconds{label}` - Histogram
//! - `dlabel_label_loops_stopped_total{label}` - Counter
//!
//! Serving `/metrics` is left to the host application.

mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
