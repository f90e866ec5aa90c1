use std::process::{Output, Stdio};

use async_trait::async_trait;
use tokio::{process::Command, time};
use tracing::{debug, trace};

use dlabel_core::{CommandRunner, ExecOutcome};
use dlabel_model::LabelSpec;

use crate::{ExecError, RUNNER_TYPE_SUBPROCESS};

/// Runner that executes label commands as OS subprocesses.
///
/// - stdin is closed, stdout and stderr are captured;
/// - exit status 0 yields trimmed stdout;
/// - anything else yields the [`ExecError`] text.
///
/// The child is killed if the execution future is dropped (e.g. on timeout).
#[derive(Debug, Clone)]
pub struct SubprocessRunner {
    /// Runner name.
    name: &'static str,
}

impl SubprocessRunner {
    pub fn new() -> Self {
        Self {
            name: RUNNER_TYPE_SUBPROCESS,
        }
    }

    /// Same runner reported under a different name in logs.
    pub fn with_name(name: &'static str) -> Self {
        Self { name }
    }

    async fn execute(&self, spec: &LabelSpec) -> Result<String, ExecError> {
        trace!(
            label = spec.name(),
            command = spec.program(),
            args = ?spec.args(),
            timeout = ?spec.timeout(),
            "spawning label command",
        );

        let mut cmd = Command::new(spec.program());
        cmd.args(spec.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .map_err(|e| ExecError::spawn(spec.program(), e))?;

        let waited = match spec.timeout() {
            Some(limit) => time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| ExecError::TimedOut {
                    timeout_ms: limit.as_millis() as u64,
                })?,
            None => child.wait_with_output().await,
        };
        let output = waited.map_err(|source| ExecError::Wait {
            program: spec.program().to_string(),
            source,
        })?;

        interpret(output)
    }
}

impl Default for SubprocessRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for SubprocessRunner {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn run(&self, spec: &LabelSpec) -> ExecOutcome {
        match self.execute(spec).await {
            Ok(stdout) => ExecOutcome::Success(stdout),
            Err(e) => {
                debug!(label = spec.name(), kind = e.kind(), error = %e, "label command failed");
                e.into()
            }
        }
    }
}

/// Map a finished process to its label text.
fn interpret(output: Output) -> Result<String, ExecError> {
    if output.status.success() {
        return Ok(String::from_utf8_lossy(&output.stdout).trim().to_string());
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if let Some(code) = output.status.code() {
        return Err(ExecError::NonZeroExit { code, stderr });
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = output.status.signal() {
            return Err(ExecError::Signal { signal });
        }
    }
    Err(ExecError::Terminated)
}
