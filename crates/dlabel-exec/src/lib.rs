mod error;
pub use error::ExecError;

/// Runner name reported by [`subprocess::SubprocessRunner`].
pub const RUNNER_TYPE_SUBPROCESS: &str = "subprocess";

#[cfg(feature = "subprocess")]
pub mod subprocess;
