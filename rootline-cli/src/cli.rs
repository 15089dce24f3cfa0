//! Command-line definitions

use clap::{ArgAction, Parser, Subcommand};
use rootline_merkle::HashAlgorithm;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rootline", version, about = "Merkle roots for line-oriented files")]
pub struct Cli {
    /// Config file (TOML)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Hash algorithm: sha256 or blake3
    #[arg(long, global = true, value_name = "NAME")]
    pub algorithm: Option<HashAlgorithm>,

    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the merkle root of each file
    Root {
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,
    },

    /// Report which files have the target root
    Find {
        /// Target root digest (64 hex characters)
        #[arg(long, value_name = "HEX")]
        target: Option<String>,

        /// Case-sensitive comparison against the uppercase root
        #[arg(long)]
        exact: bool,

        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,
    },

    /// Print the level ladder of a file's tree
    Levels {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Only print this level (0 = leaves)
        #[arg(long, value_name = "INDEX")]
        level: Option<usize>,
    },
}

impl Cli {
    /// Log filter implied by `-v`, if any.
    pub fn verbosity_filter(&self) -> Option<&'static str> {
        match self.verbose {
            0 => None,
            1 => Some("debug"),
            _ => Some("trace"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_find() {
        let cli = Cli::try_parse_from([
            "rootline",
            "--algorithm",
            "blake3",
            "find",
            "--target",
            "ABC",
            "--exact",
            "a.csv",
            "b.csv",
        ])
        .unwrap();

        assert_eq!(cli.algorithm, Some(HashAlgorithm::Blake3));
        match cli.command {
            Commands::Find { target, exact, files } => {
                assert_eq!(target.as_deref(), Some("ABC"));
                assert!(exact);
                assert_eq!(files.len(), 2);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_root_requires_files() {
        assert!(Cli::try_parse_from(["rootline", "root"]).is_err());
    }

    #[test]
    fn test_verbosity() {
        let cli = Cli::try_parse_from(["rootline", "-vv", "root", "x"]).unwrap();
        assert_eq!(cli.verbosity_filter(), Some("trace"));
        let cli = Cli::try_parse_from(["rootline", "root", "x"]).unwrap();
        assert_eq!(cli.verbosity_filter(), None);
    }
}
