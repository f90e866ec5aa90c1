use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;

use dlabel_model::CommandLabel;
use dlabel_observe::LoggerConfig;

const DEFAULT_ADVERTISE_MS: u64 = 10_000;
const DEFAULT_SHUTDOWN_GRACE_MS: u64 = 30_000;

/// Agent configuration file.
///
/// ```json
/// {
///   "logger": { "format": "json", "level": "info" },
///   "advertiseMs": 30000,
///   "metricsFile": "/var/lib/node_exporter/dlabel.prom",
///   "labels": {
///     "arch": { "periodMs": 3600000, "command": ["uname", "-m"] }
///   }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    #[serde(default)]
    pub logger: LoggerConfig,
    /// How often the current label set is logged.
    #[serde(default = "default_advertise_ms")]
    pub advertise_ms: u64,
    #[serde(default)]
    pub labels: BTreeMap<String, CommandLabel>,
    /// Prometheus textfile rewritten on every advertise tick and at exit.
    #[serde(default)]
    pub metrics_file: Option<PathBuf>,
    /// Upper bound on waiting for in-flight label commands at shutdown.
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

fn default_advertise_ms() -> u64 {
    DEFAULT_ADVERTISE_MS
}

fn default_shutdown_grace_ms() -> u64 {
    DEFAULT_SHUTDOWN_GRACE_MS
}

impl AgentConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let cfg: Self = serde_json::from_str(raw)?;
        anyhow::ensure!(cfg.advertise_ms > 0, "advertiseMs must be > 0");
        Ok(cfg)
    }

    pub fn advertise_every(&self) -> Duration {
        Duration::from_millis(self.advertise_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlabel_observe::LoggerFormat;

    #[test]
    fn parses_full_config() {
        let cfg = AgentConfig::from_json(
            r#"{
                "logger": { "format": "json", "level": "debug" },
                "advertiseMs": 500,
                "metricsFile": "/tmp/dlabel.prom",
                "shutdownGraceMs": 2000,
                "labels": {
                    "foo": { "periodMs": 1000, "command": ["expr", "1", "+", "3"] },
                    "slow": { "periodMs": 60000, "command": ["sleep", "5"], "timeoutMs": 2000 }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(cfg.logger.format, LoggerFormat::Json);
        assert_eq!(cfg.advertise_every(), Duration::from_millis(500));
        assert_eq!(cfg.labels.len(), 2);
        assert_eq!(cfg.labels["foo"].command, vec!["expr", "1", "+", "3"]);
        assert_eq!(cfg.labels["slow"].timeout_ms, Some(2000));
        assert_eq!(cfg.metrics_file, Some(PathBuf::from("/tmp/dlabel.prom")));
        assert_eq!(cfg.shutdown_grace(), Duration::from_secs(2));
    }

    #[test]
    fn empty_object_uses_defaults() {
        let cfg = AgentConfig::from_json("{}").unwrap();
        assert_eq!(cfg.advertise_ms, DEFAULT_ADVERTISE_MS);
        assert!(cfg.labels.is_empty());
        assert!(cfg.metrics_file.is_none());
        assert_eq!(cfg.shutdown_grace_ms, DEFAULT_SHUTDOWN_GRACE_MS);
        assert_eq!(cfg.logger.format, LoggerFormat::Text);
    }

    #[test]
    fn rejects_zero_advertise_interval() {
        let err = AgentConfig::from_json(r#"{ "advertiseMs": 0 }"#).unwrap_err();
        assert!(err.to_string().contains("advertiseMs"));
    }

    #[test]
    fn rejects_invalid_log_level() {
        assert!(AgentConfig::from_json(r#"{ "logger": { "level": "[" } }"#).is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = AgentConfig::load(Path::new("/nonexistent/dlabel.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/dlabel.json"));
    }
}
