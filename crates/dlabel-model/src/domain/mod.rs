mod labels;
pub use labels::Labels;

/// Unique label key within one engine instance.
pub type LabelName = String;

/// Refresh period value in milliseconds.
pub type PeriodMs = u64;

/// Timeout value in milliseconds.
///
/// Bounds a single command execution.
pub type TimeoutMs = u64;
