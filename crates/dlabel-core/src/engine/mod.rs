//! Entry point tying label specs, the result store and the scheduler together.
mod config;
pub use config::DynamicLabelsConfig;

use std::sync::Arc;

use dlabel_model::{LabelSpec, Labels};
use tracing::{debug, info, instrument};

use crate::{error::CoreError, scheduler::Scheduler, store::LabelSet, store::ResultStore};

/// Set of command-backed labels kept current in the background.
///
/// Cloning is cheap and every clone refers to the same engine.
///
/// # Example
/// ```rust,ignore
/// let labels = DynamicLabels::new(DynamicLabelsConfig::new(cfg, close.clone(), runner))?;
/// labels.sync().await;   // initial, immediately consistent values
/// labels.run();          // keep them fresh until `close` is cancelled
/// let current = labels.get();
/// ```
#[derive(Clone)]
pub struct DynamicLabels {
    scheduler: Arc<Scheduler>,
    store: ResultStore,
}

impl DynamicLabels {
    /// Validate every label and build the engine.
    ///
    /// Returns the first configuration error (in label name order) before any
    /// process is spawned. An empty label map is allowed.
    #[instrument(level = "debug", skip(cfg), fields(labels = cfg.labels.len(), runner = cfg.runner.name()))]
    pub fn new(cfg: DynamicLabelsConfig) -> Result<Self, CoreError> {
        let specs = cfg
            .labels
            .iter()
            .map(|(name, label)| LabelSpec::new(name.as_str(), label))
            .collect::<Result<Vec<_>, _>>()?;

        for spec in &specs {
            debug!(%spec, "label configured");
        }

        let store = ResultStore::new(specs.iter().map(|s| s.name().to_string()));
        let scheduler = Scheduler::new(specs, store.clone(), cfg.runner, cfg.metrics, &cfg.close);

        info!(labels = store.len(), "dynamic labels initialized");
        Ok(Self {
            scheduler: Arc::new(scheduler),
            store,
        })
    }

    /// Refresh every label once; returns after all results are stored.
    pub async fn sync(&self) {
        self.scheduler.sync().await
    }

    /// Start background refresh of every label on its own period.
    ///
    /// Non-blocking; repeated calls are ignored. Must be called within a tokio runtime.
    pub fn run(&self) {
        self.scheduler.run()
    }

    /// Snapshot of every label result.
    ///
    /// Labels that have not completed a run yet are present with an empty value.
    pub fn get(&self) -> LabelSet {
        self.store.snapshot()
    }

    /// Current `name -> value` set as advertised to clients.
    pub fn labels(&self) -> Labels {
        self.get().to_labels()
    }

    pub fn specs(&self) -> &[LabelSpec] {
        self.scheduler.specs()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Wait until all background loops have exited after cancellation.
    pub async fn closed(&self) {
        self.scheduler.closed().await
    }

    /// Stop this engine without cancelling the caller's token, then wait for its loops.
    ///
    /// Waits for in-flight commands; see [`Scheduler::shutdown`] for bounding that wait.
    pub async fn shutdown(&self) {
        self.scheduler.shutdown().await
    }
}
