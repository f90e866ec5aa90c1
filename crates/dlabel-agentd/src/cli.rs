use std::path::PathBuf;

use clap::Parser;

/// Host agent advertising command-derived labels.
#[derive(Debug, Parser)]
#[command(name = "dlabel-agentd", version, about)]
pub struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, env = "DLABEL_CONFIG", default_value = "dlabel.json")]
    pub config: PathBuf,

    /// Overrides `logger.level` from the config file (EnvFilter syntax).
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,
}
