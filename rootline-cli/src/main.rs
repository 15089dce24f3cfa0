//! rootline - merkle roots for line-oriented files

use clap::Parser;
use colored::Colorize;
use rootline_cli::{execute, init_logging, resolve_config, Cli};
use std::process::ExitCode;
use tracing::error;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} Error loading configuration: {:#}", "✗".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config.log_level);

    let report = match execute(&cli.command, &config) {
        Ok(report) => report,
        Err(e) => {
            error!("command failed: {:#}", e);
            eprintln!("{} {:#}", "✗".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    match report.render(cli.json) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("{} Failed to render output: {:#}", "✗".red().bold(), e);
            return ExitCode::FAILURE;
        }
    }

    ExitCode::from(report.exit_code())
}
