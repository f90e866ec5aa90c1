//! Logging setup for the label agent.
//!
//! Installs a global `tracing` subscriber according to a [`LoggerConfig`]
//! that can be embedded in the agent's configuration file.
mod logger;
pub use logger::*;
