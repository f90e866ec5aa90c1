use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{PeriodMs, TimeoutMs};

/// Configuration of one command-backed label, as it appears in config files.
///
/// The label name is the key under which this value is stored; see [`crate::LabelSpec`]
/// for the validated, immutable form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandLabel {
    /// Refresh period in milliseconds. Must be greater than zero.
    pub period_ms: PeriodMs,
    /// Command line: `command[0]` is the executable, the rest are arguments.
    pub command: Vec<String>,
    /// Optional hard limit for a single execution in milliseconds.
    ///
    /// When reached, the child is killed and the label value reports the timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<TimeoutMs>,
}

impl CommandLabel {
    /// Create a label config from a period and a command line.
    pub fn new<I, S>(period: Duration, command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            period_ms: millis_ceil(period),
            command: command.into_iter().map(Into::into).collect(),
            timeout_ms: None,
        }
    }

    /// Attach an execution timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(millis_ceil(timeout));
        self
    }

    /// Refresh period as a [`Duration`].
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

/// Whole milliseconds, rounded up so a positive duration never becomes zero.
fn millis_ceil(d: Duration) -> u64 {
    u64::try_from(d.as_nanos().div_ceil(1_000_000)).unwrap_or(u64::MAX)
}
