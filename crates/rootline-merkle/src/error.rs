//! Error types for tree construction and queries.

use thiserror::Error;

/// Errors surfaced by record sources, tree construction and tree queries.
///
/// Every variant is returned to the caller. Nothing is logged and swallowed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MerkleError {
    /// Zero records were supplied, so there is nothing to hash.
    #[error("cannot build a merkle tree from zero records")]
    EmptyInput,

    /// The record source could not be read. Construction stops before any hashing.
    #[error("record source '{source_name}' is unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    /// A level index at or beyond `level_count`.
    #[error("level index {index} out of range (tree has {level_count} levels)")]
    IndexOutOfRange { index: usize, level_count: usize },

    /// A query on a builder that never reached the `Built` state.
    #[error("merkle tree has not been built")]
    NotBuilt,

    /// The builder already reached a terminal state.
    #[error("tree builder is already finalized")]
    AlreadyFinalized,

    #[error("invalid digest length: expected {expected}, got {got}")]
    InvalidDigestLength { expected: usize, got: usize },

    #[error("invalid digest: {0}")]
    InvalidDigest(String),

    /// An unrecognised option name, such as an unknown hash algorithm.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result alias used throughout the crate.
pub type MerkleResult<T> = Result<T, MerkleError>;

impl MerkleError {
    /// Build a `SourceUnavailable` from anything displayable, typically an `io::Error`.
    pub fn source_unavailable(source_name: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        MerkleError::SourceUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    /// True for errors raised before any hashing happened.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            MerkleError::EmptyInput | MerkleError::SourceUnavailable { .. }
        )
    }
}
