use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use dlabel_core::{DynamicLabels, DynamicLabelsConfig, MetricsHandle};
use dlabel_exec::subprocess::subprocess_runner;
use dlabel_observe::{LoggerLevel, init_logger};
use dlabel_prometheus::PrometheusMetrics;

mod cli;
mod config;
mod export;

use cli::Cli;
use config::AgentConfig;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1) config + logger
    let mut cfg = AgentConfig::load(&cli.config)?;
    if let Some(level) = cli.log_level.as_deref() {
        cfg.logger.level = LoggerLevel::new(level)?;
    }
    init_logger(&cfg.logger)?;
    info!(config = %cli.config.display(), labels = cfg.labels.len(), "agent starting");

    // 2) engine
    let metrics = PrometheusMetrics::new().context("register metrics")?;
    let close = CancellationToken::new();
    let engine = DynamicLabels::new(
        DynamicLabelsConfig::new(cfg.labels.clone(), close.clone(), subprocess_runner())
            .with_metrics(Arc::new(metrics.clone()) as MetricsHandle),
    )?;

    // 3) initial values, then background refresh
    engine.sync().await;
    engine.run();
    advertise(&engine, &metrics, &cfg);

    let mut ticker = time::interval(cfg.advertise_every());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            res = &mut ctrl_c => {
                if let Err(e) = res {
                    warn!(error = %e, "ctrl-c handler failed");
                }
                break;
            }
            _ = ticker.tick() => advertise(&engine, &metrics, &cfg),
        }
    }

    // 4) shutdown
    info!("shutdown requested");
    close.cancel();
    if time::timeout(cfg.shutdown_grace(), engine.shutdown()).await.is_err() {
        warn!(
            grace_ms = cfg.shutdown_grace_ms,
            "label commands still running at shutdown; abandoning them"
        );
    }
    publish_metrics(&metrics, &cfg);
    info!("agent stopped");
    Ok(())
}

fn advertise(engine: &DynamicLabels, metrics: &PrometheusMetrics, cfg: &AgentConfig) {
    let snapshot = engine.get();
    for (name, result) in snapshot.iter() {
        if result.is_failed() {
            warn!(label = %name, value = %result.value(), "label failing");
        }
    }
    info!(labels = ?snapshot.to_labels(), "advertising labels");
    publish_metrics(metrics, cfg);
}

fn publish_metrics(metrics: &PrometheusMetrics, cfg: &AgentConfig) {
    let Some(path) = cfg.metrics_file.as_deref() else {
        return;
    };
    match export::write_textfile(metrics, path) {
        Ok(()) => debug!(path = %path.display(), "metrics written"),
        Err(e) => warn!(path = %path.display(), error = %format!("{e:#}"), "metrics write failed"),
    }
}
