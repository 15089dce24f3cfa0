//! `rootline find`: report which files have a known root

use super::FileReport;
use crate::config::CliConfig;
use anyhow::{Context, Result};
use colored::Colorize;
use rootline_merkle::{Digest, HashAlgorithm, MatchMode};
use serde::Serialize;
use std::fmt::Write;
use std::path::PathBuf;
use tracing::info;

/// Exit status when no file matched the target.
pub const NO_MATCH_EXIT_CODE: u8 = 2;

#[derive(Debug, Clone, Serialize)]
pub struct FindEntry {
    #[serde(flatten)]
    pub report: FileReport,
    pub matched: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FindReport {
    pub algorithm: HashAlgorithm,
    pub target: String,
    pub match_mode: MatchMode,
    pub files: Vec<FindEntry>,
    /// Files whose root matched, in input order
    pub matches: Vec<String>,
}

impl FindReport {
    pub fn exit_code(&self) -> u8 {
        if self.matches.is_empty() {
            NO_MATCH_EXIT_CODE
        } else {
            0
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} Target root: {}", "→".cyan().bold(), self.target.cyan());

        for entry in &self.files {
            let f = &entry.report;
            let _ = writeln!(out, "{} {}", "→".cyan().bold(), f.file.cyan());
            match (&f.tree, &f.error) {
                (Some(tree), _) => {
                    let _ = writeln!(out, "  Root: {}", tree.root);
                    if entry.matched {
                        let _ = writeln!(out, "  {} {}", "✓".green().bold(), "match".green());
                    } else {
                        let _ = writeln!(out, "  {} {}", "✗".dimmed(), "no match".dimmed());
                    }
                }
                (None, Some(error)) => {
                    let _ = writeln!(out, "  {} {}", "✗".red().bold(), error.red());
                }
                (None, None) => {}
            }
        }

        if self.matches.is_empty() {
            let _ = write!(out, "{} No file has the target root", "!".yellow().bold());
        } else {
            let _ = write!(
                out,
                "{} Target root found in: {}",
                "✓".green().bold(),
                self.matches.join(", ").green()
            );
        }
        out
    }
}

/// The target comes from `--target`, else from the config.
pub fn handle(
    target: Option<&str>,
    exact: bool,
    files: &[PathBuf],
    config: &CliConfig,
) -> Result<FindReport> {
    let target = target
        .map(str::to_string)
        .or_else(|| config.target_root.clone())
        .context("no target root given (use --target or ROOTLINE_TARGET_ROOT)")?;
    Digest::from_hex(&target).with_context(|| format!("invalid target root '{}'", target))?;

    let match_mode = if exact {
        MatchMode::Exact
    } else {
        config.match_mode
    };

    let files: Vec<FindEntry> = files
        .iter()
        .map(|path| {
            let report = FileReport::build(path, config.algorithm);
            let matched = report
                .root()
                .map_or(false, |root| root.matches_hex(&target, match_mode));
            FindEntry { report, matched }
        })
        .collect();

    let matches: Vec<String> = files
        .iter()
        .filter(|e| e.matched)
        .map(|e| e.report.file.clone())
        .collect();

    info!(
        target = %target,
        files = files.len(),
        matches = matches.len(),
        "target root search finished"
    );

    Ok(FindReport {
        algorithm: config.algorithm,
        target,
        match_mode,
        files,
        matches,
    })
}
