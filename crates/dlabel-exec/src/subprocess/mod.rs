//! Subprocess runner for command-backed labels.
//!
//! Executes `LabelSpec::command()` as a child process via `tokio::process::Command`
//! and turns the exit status into label text.
mod runner;

pub use runner::SubprocessRunner;

use std::sync::Arc;

use dlabel_core::RunnerHandle;

/// Shared handle to the built-in subprocess runner, ready for `DynamicLabelsConfig`.
pub fn subprocess_runner() -> RunnerHandle {
    Arc::new(SubprocessRunner::new())
}
