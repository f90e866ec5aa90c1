use serde::{Deserialize, Serialize};

/// How the current value of a label was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelStatus {
    /// Command has not completed yet; value is empty.
    #[default]
    Pending,
    /// Command exited successfully; value is its trimmed stdout.
    Ok,
    /// Command could not run or exited unsuccessfully; value is the error text.
    Failed,
}

/// Latest computed value of one label.
///
/// Failures are carried as text in `value`, so a reader of the label sees the
/// reason directly. `status` tells them apart without parsing the text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LabelResult {
    value: String,
    status: LabelStatus,
}

impl LabelResult {
    /// Placeholder stored before the first execution completes.
    pub fn pending() -> Self {
        Self::default()
    }

    pub fn ok(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            status: LabelStatus::Ok,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            value: reason.into(),
            status: LabelStatus::Failed,
        }
    }

    /// Displayed text: command output or error description.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn status(&self) -> LabelStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status == LabelStatus::Pending
    }

    pub fn is_failed(&self) -> bool {
        self.status == LabelStatus::Failed
    }
}
