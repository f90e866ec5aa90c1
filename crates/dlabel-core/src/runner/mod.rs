//! Command runner seam used by the scheduler.
//!
//! The core never spawns processes itself: it asks a [`CommandRunner`] to
//! execute a [`LabelSpec`] and stores whatever text comes back. Concrete
//! runners live in other crates (see `dlabel-exec`); tests plug in fakes.
mod outcome;
pub use outcome::ExecOutcome;

use std::sync::Arc;

use async_trait::async_trait;
use dlabel_model::LabelSpec;

/// Executes the command line of one label and reports the outcome.
///
/// Implementations must not fail: spawn errors, non-zero exits and timeouts
/// are reported as [`ExecOutcome::Failed`] / [`ExecOutcome::TimedOut`] text.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runner name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Run `spec.command()` once and wait for it to finish.
    async fn run(&self, spec: &LabelSpec) -> ExecOutcome;
}

/// Shared handle to a runner implementation.
pub type RunnerHandle = Arc<dyn CommandRunner>;
