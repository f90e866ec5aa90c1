pub mod engine;
pub mod error;
pub mod metrics;
pub mod runner;
pub mod scheduler;
pub mod store;

pub use engine::{DynamicLabels, DynamicLabelsConfig};
pub use error::CoreError;
pub use metrics::{LabelOutcome, MetricsBackend, MetricsHandle, NoOpMetrics, noop_metrics};
pub use runner::{CommandRunner, ExecOutcome, RunnerHandle};
pub use scheduler::Scheduler;
pub use store::{LabelSet, ResultStore};

pub mod prelude {
    pub use crate::engine::{DynamicLabels, DynamicLabelsConfig};
    pub use crate::error::CoreError;
    pub use crate::runner::{CommandRunner, ExecOutcome, RunnerHandle};
    pub use crate::store::LabelSet;
}
