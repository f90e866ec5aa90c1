use std::{fmt, time::Duration};

use crate::{
    error::{ModelError, ModelResult},
    spec::CommandLabel,
};

/// Validated, immutable description of one label.
///
/// Built once when the engine is constructed and never mutated afterwards.
/// Guarantees:
/// - `name` is non-empty and uses only `[a-zA-Z0-9/._*-]`;
/// - `period` is greater than zero;
/// - `command` has at least one element and `command[0]` is not blank;
/// - `timeout`, when present, is greater than zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelSpec {
    name: String,
    period: Duration,
    command: Vec<String>,
    timeout: Option<Duration>,
}

impl LabelSpec {
    /// Validate `cfg` and build the spec for label `name`.
    pub fn new(name: impl Into<String>, cfg: &CommandLabel) -> ModelResult<Self> {
        let name = name.into();
        validate_name(&name)?;

        if cfg.period_ms == 0 {
            return Err(ModelError::InvalidPeriod { label: name });
        }
        match cfg.command.first() {
            Some(program) if !program.trim().is_empty() => {}
            _ => return Err(ModelError::EmptyCommand { label: name }),
        }
        if cfg.timeout_ms == Some(0) {
            return Err(ModelError::InvalidTimeout { label: name });
        }

        Ok(Self {
            period: cfg.period(),
            command: cfg.command.clone(),
            timeout: cfg.timeout_ms.map(Duration::from_millis),
            name,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Full command line, executable first.
    pub fn command(&self) -> &[String] {
        &self.command
    }

    /// Executable (`command[0]`).
    pub fn program(&self) -> &str {
        // Non-empty by construction.
        self.command.first().map(String::as_str).unwrap_or_default()
    }

    /// Arguments passed to the executable.
    pub fn args(&self) -> &[String] {
        self.command.get(1..).unwrap_or_default()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl fmt::Display for LabelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LabelSpec(name='{}', period={:?}, cmd='{}', args={}, timeout={:?})",
            self.name,
            self.period,
            self.program(),
            self.args().len(),
            self.timeout,
        )
    }
}

fn validate_name(name: &str) -> ModelResult<()> {
    if name.is_empty() {
        return Err(ModelError::EmptyName);
    }
    let valid = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-' | '*'));
    if !valid {
        return Err(ModelError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}
