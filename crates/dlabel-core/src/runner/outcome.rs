use std::fmt;

use dlabel_model::LabelResult;

use crate::metrics::LabelOutcome;

/// Result of a single command execution, tagged by how it ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecOutcome {
    /// Exit status 0; carries trimmed stdout.
    Success(String),
    /// Could not spawn, or exited unsuccessfully; carries the error text.
    Failed(String),
    /// Killed after exceeding the label timeout; carries the error text.
    TimedOut(String),
}

impl ExecOutcome {
    /// Text that becomes the label value.
    pub fn text(&self) -> &str {
        match self {
            ExecOutcome::Success(s) | ExecOutcome::Failed(s) | ExecOutcome::TimedOut(s) => s,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecOutcome::Success(_))
    }

    /// Metrics classification.
    pub fn kind(&self) -> LabelOutcome {
        match self {
            ExecOutcome::Success(_) => LabelOutcome::Success,
            ExecOutcome::Failed(_) => LabelOutcome::Failure,
            ExecOutcome::TimedOut(_) => LabelOutcome::Timeout,
        }
    }

    /// Erase the tag into the stored label result.
    pub fn into_result(self) -> LabelResult {
        match self {
            ExecOutcome::Success(out) => LabelResult::ok(out),
            ExecOutcome::Failed(reason) | ExecOutcome::TimedOut(reason) => {
                LabelResult::failed(reason)
            }
        }
    }
}

impl fmt::Display for ExecOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind().as_label(), self.text())
    }
}
