//! rootline CLI library
//!
//! Reads files line by line, builds one merkle tree per file and reports
//! roots, level ladders and target-root matches.

pub mod cli;
pub mod commands;
pub mod config;

pub use cli::{Cli, Commands};
pub use commands::{execute, Report};
pub use config::{CliConfig, ConfigError};

use tracing_subscriber::EnvFilter;

/// Resolve the effective configuration: file and environment, then flags.
pub fn resolve_config(cli: &Cli) -> anyhow::Result<CliConfig> {
    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(algorithm) = cli.algorithm {
        config.algorithm = algorithm;
    }
    if let Some(filter) = cli.verbosity_filter() {
        config.log_level = filter.to_string();
    }
    config.validate()?;
    Ok(config)
}

/// Install the global tracing subscriber. Logs go to stderr so that stdout
/// stays machine-readable with `--json`.
pub fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
