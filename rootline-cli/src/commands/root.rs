//! `rootline root`: print each file's merkle root

use super::FileReport;
use crate::config::CliConfig;
use colored::Colorize;
use rootline_merkle::HashAlgorithm;
use serde::Serialize;
use std::fmt::Write;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct RootReport {
    pub algorithm: HashAlgorithm,
    pub files: Vec<FileReport>,
}

impl RootReport {
    pub fn failed(&self) -> usize {
        self.files.iter().filter(|f| f.error.is_some()).count()
    }

    pub fn exit_code(&self) -> u8 {
        if self.failed() > 0 {
            1
        } else {
            0
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for f in &self.files {
            let _ = writeln!(out, "{} {}", "→".cyan().bold(), f.file.cyan());
            match (&f.tree, &f.error) {
                (Some(tree), _) => {
                    let _ = writeln!(out, "  Root:    {}", tree.root.to_string().green());
                    let _ = writeln!(
                        out,
                        "  Records: {}  Leaves: {}  Levels: {}",
                        tree.record_count, tree.leaf_count, tree.level_count
                    );
                }
                (None, Some(error)) => {
                    let _ = writeln!(out, "  {} {}", "✗".red().bold(), error.red());
                }
                (None, None) => {}
            }
        }
        out.trim_end().to_string()
    }
}

/// Every file is attempted, even after an earlier failure.
pub fn handle(files: &[PathBuf], config: &CliConfig) -> RootReport {
    let files: Vec<FileReport> = files
        .iter()
        .map(|path| FileReport::build(path, config.algorithm))
        .collect();

    let report = RootReport {
        algorithm: config.algorithm,
        files,
    };
    info!(
        files = report.files.len(),
        failed = report.failed(),
        "computed merkle roots"
    );
    report
}
