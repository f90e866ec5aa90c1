use std::io;

use dlabel_core::ExecOutcome;
use thiserror::Error;

/// Why a label command did not produce output.
///
/// `Display` is the text stored as the label value, so it is phrased for a
/// human reading the label rather than for logs.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("exec: \"{program}\": executable file not found in $PATH")]
    NotFound { program: String },

    #[error("exec: \"{program}\": no such file or directory")]
    NoSuchFile { program: String },

    #[error("exec: \"{program}\": permission denied")]
    PermissionDenied { program: String },

    #[error("exec: \"{program}\": {source}")]
    Spawn { program: String, source: io::Error },

    #[error("wait \"{program}\": {source}")]
    Wait { program: String, source: io::Error },

    #[error("exit status {code}{}", stderr_suffix(.stderr))]
    NonZeroExit { code: i32, stderr: String },

    #[error("signal: {signal}")]
    Signal { signal: i32 },

    #[error("process terminated without exit status")]
    Terminated,

    #[error("command timed out after {timeout_ms}ms")]
    TimedOut { timeout_ms: u64 },
}

impl ExecError {
    /// Classify a spawn failure of `program`.
    pub fn spawn(program: &str, err: io::Error) -> Self {
        let program = program.to_string();
        match err.kind() {
            // A bare name is looked up in $PATH; a path is opened directly.
            io::ErrorKind::NotFound if program.contains('/') => ExecError::NoSuchFile { program },
            io::ErrorKind::NotFound => ExecError::NotFound { program },
            io::ErrorKind::PermissionDenied => ExecError::PermissionDenied { program },
            _ => ExecError::Spawn {
                program,
                source: err,
            },
        }
    }

    /// Metric-friendly category.
    pub fn kind(&self) -> &'static str {
        match self {
            ExecError::NotFound { .. } | ExecError::NoSuchFile { .. } => "not_found",
            ExecError::PermissionDenied { .. } => "permission_denied",
            ExecError::Spawn { .. } => "spawn_failed",
            ExecError::Wait { .. } => "wait_failed",
            ExecError::NonZeroExit { .. } => "non_zero_exit",
            ExecError::Signal { .. } | ExecError::Terminated => "terminated",
            ExecError::TimedOut { .. } => "timeout",
        }
    }
}

impl From<ExecError> for ExecOutcome {
    fn from(err: ExecError) -> Self {
        match err {
            ExecError::TimedOut { .. } => ExecOutcome::TimedOut(err.to_string()),
            other => ExecOutcome::Failed(other.to_string()),
        }
    }
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}
