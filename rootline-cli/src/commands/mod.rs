//! Command handlers
//!
//! Each handler builds one tree per input file and returns a report. Rendering
//! (text or JSON) and the exit status are decided by [`Report`].

pub mod find;
pub mod levels;
pub mod root;

use crate::cli::Commands;
use crate::config::CliConfig;
use anyhow::Result;
use rootline_merkle::{
    Blake3Hasher, Digest, FileSource, HashAlgorithm, Level, MerkleHasher, MerkleResult,
    MerkleTree, Sha256Hasher,
};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

/// Shape of one built tree, without its digests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeSummary {
    pub root: Digest,
    pub record_count: usize,
    pub leaf_count: usize,
    pub level_count: usize,
}

/// Result of building one file's tree.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree: Option<TreeSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    /// Build the tree for `path`. Failures are recorded, not returned.
    pub(crate) fn build(path: &Path, algorithm: HashAlgorithm) -> Self {
        let file = path.display().to_string();
        match build_file(path, algorithm) {
            Ok((tree, _)) => Self {
                file,
                tree: Some(tree),
                error: None,
            },
            Err(e) => {
                warn!(file = %file, error = %e, "failed to build merkle tree");
                Self {
                    file,
                    tree: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    pub fn root(&self) -> Option<Digest> {
        self.tree.as_ref().map(|t| t.root)
    }
}

/// Output of a command.
#[derive(Debug, Clone)]
pub enum Report {
    Root(root::RootReport),
    Find(find::FindReport),
    Levels(levels::LevelsReport),
}

impl Report {
    /// Process exit status for this report.
    pub fn exit_code(&self) -> u8 {
        match self {
            Report::Root(r) => r.exit_code(),
            Report::Find(r) => r.exit_code(),
            Report::Levels(_) => 0,
        }
    }

    pub fn render(&self, json: bool) -> Result<String> {
        if json {
            let value = match self {
                Report::Root(r) => serde_json::to_string_pretty(r)?,
                Report::Find(r) => serde_json::to_string_pretty(r)?,
                Report::Levels(r) => serde_json::to_string_pretty(r)?,
            };
            return Ok(value);
        }

        Ok(match self {
            Report::Root(r) => r.render_text(),
            Report::Find(r) => r.render_text(),
            Report::Levels(r) => r.render_text(),
        })
    }
}

/// Dispatch a parsed command.
pub fn execute(command: &Commands, config: &CliConfig) -> Result<Report> {
    debug!(?command, algorithm = %config.algorithm, "executing command");
    match command {
        Commands::Root { files } => Ok(Report::Root(root::handle(files, config))),
        Commands::Find {
            target,
            exact,
            files,
        } => find::handle(target.as_deref(), *exact, files, config).map(Report::Find),
        Commands::Levels { file, level } => {
            levels::handle(file, *level, config).map(Report::Levels)
        }
    }
}

/// Read `path` line by line and build its tree with the selected algorithm.
pub(crate) fn build_file(
    path: &Path,
    algorithm: HashAlgorithm,
) -> MerkleResult<(TreeSummary, Vec<Level>)> {
    match algorithm {
        HashAlgorithm::Sha256 => build_file_with::<Sha256Hasher>(path),
        HashAlgorithm::Blake3 => build_file_with::<Blake3Hasher>(path),
    }
}

fn build_file_with<H: MerkleHasher>(path: &Path) -> MerkleResult<(TreeSummary, Vec<Level>)> {
    let tree: MerkleTree<H> = MerkleTree::from_source(&FileSource::new(path))?;
    let summary = TreeSummary {
        root: tree.root(),
        record_count: tree.record_count(),
        leaf_count: tree.leaf_count(),
        level_count: tree.level_count(),
    };
    Ok((summary, tree.into_levels()))
}
