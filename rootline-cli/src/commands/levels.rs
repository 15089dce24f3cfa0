//! `rootline levels`: print the level ladder of one file's tree

use super::{build_file, TreeSummary};
use crate::config::CliConfig;
use anyhow::Result;
use colored::Colorize;
use rootline_merkle::{Digest, HashAlgorithm, Level, MerkleError};
use serde::Serialize;
use std::fmt::Write;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct LevelView {
    pub index: usize,
    pub len: usize,
    pub padded: bool,
    pub digests: Vec<Digest>,
}

impl LevelView {
    fn new(index: usize, level: &Level) -> Self {
        Self {
            index,
            len: level.len(),
            padded: level.is_padded(),
            digests: level.digests(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LevelsReport {
    pub file: String,
    pub algorithm: HashAlgorithm,
    pub tree: TreeSummary,
    pub levels: Vec<LevelView>,
}

impl LevelsReport {
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} {}", "→".cyan().bold(), self.file.cyan());
        let _ = writeln!(out, "  Root:   {}", self.tree.root.to_string().green());
        let _ = writeln!(out, "  Levels: {}", self.tree.level_count);

        for view in &self.levels {
            let padded = if view.padded { " (padded)" } else { "" };
            let _ = writeln!(
                out,
                "{}",
                format!("Level {} [{} digests{}]", view.index, view.len, padded).bold()
            );
            for (i, digest) in view.digests.iter().enumerate() {
                let _ = writeln!(out, "  {:>6}  {}", i, digest);
            }
        }
        out.trim_end().to_string()
    }
}

/// Errors, including an out-of-range `--level`, abort the command.
pub fn handle(file: &Path, level: Option<usize>, config: &CliConfig) -> Result<LevelsReport> {
    let (tree, levels) = build_file(file, config.algorithm)?;

    let views = match level {
        Some(index) => {
            let selected = levels.get(index).ok_or(MerkleError::IndexOutOfRange {
                index,
                level_count: levels.len(),
            })?;
            vec![LevelView::new(index, selected)]
        }
        None => levels
            .iter()
            .enumerate()
            .map(|(i, l)| LevelView::new(i, l))
            .collect(),
    };

    Ok(LevelsReport {
        file: file.display().to_string(),
        algorithm: config.algorithm,
        tree,
        levels: views,
    })
}
