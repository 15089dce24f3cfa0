//! Incremental record collection with an explicit build lifecycle.
//!
//! ```text
//! Uninitialized --build()--> Building --+--> Built           (terminal)
//!                                       +--> Failed(reason)  (terminal)
//! ```
//!
//! `Building` is only observable from inside `build()`. A failed builder
//! cannot be retried. Construct a new one instead.

use crate::error::{MerkleError, MerkleResult};
use crate::hash::{Digest, MerkleHasher, Sha256Hasher};
use crate::source::Record;
use crate::tree::MerkleTree;

/// Lifecycle of a [`TreeBuilder`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuildState {
    Uninitialized,
    Building,
    Built,
    Failed(MerkleError),
}

impl BuildState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BuildState::Built | BuildState::Failed(_))
    }
}

/// Collects records, then builds a [`MerkleTree`] exactly once.
#[derive(Debug)]
pub struct TreeBuilder<H: MerkleHasher = Sha256Hasher> {
    records: Vec<Record>,
    state: BuildState,
    tree: Option<MerkleTree<H>>,
}

impl<H: MerkleHasher> Default for TreeBuilder<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: MerkleHasher> TreeBuilder<H> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            state: BuildState::Uninitialized,
            tree: None,
        }
    }

    pub fn state(&self) -> &BuildState {
        &self.state
    }

    /// Append one record.
    pub fn push(&mut self, record: impl Into<Record>) -> MerkleResult<()> {
        self.ensure_open()?;
        self.records.push(record.into());
        Ok(())
    }

    /// Append records in order.
    pub fn extend<I, R>(&mut self, records: I) -> MerkleResult<()>
    where
        I: IntoIterator<Item = R>,
        R: Into<Record>,
    {
        self.ensure_open()?;
        self.records.extend(records.into_iter().map(Into::into));
        Ok(())
    }

    /// Number of records collected so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Build the tree from the collected records.
    ///
    /// On failure the builder moves to `Failed` and the error is returned.
    pub fn build(&mut self) -> MerkleResult<&MerkleTree<H>> {
        self.ensure_open()?;
        self.state = BuildState::Building;

        let records = std::mem::take(&mut self.records);
        match MerkleTree::build(records) {
            Ok(tree) => {
                self.state = BuildState::Built;
                Ok(self.tree.insert(tree))
            }
            Err(e) => {
                self.state = BuildState::Failed(e.clone());
                Err(e)
            }
        }
    }

    /// The built tree, or `NotBuilt`.
    pub fn tree(&self) -> MerkleResult<&MerkleTree<H>> {
        self.tree.as_ref().ok_or(MerkleError::NotBuilt)
    }

    /// The root digest, or `NotBuilt`.
    pub fn root(&self) -> MerkleResult<Digest> {
        self.tree().map(MerkleTree::root)
    }

    /// Take ownership of the built tree.
    pub fn into_tree(self) -> MerkleResult<MerkleTree<H>> {
        self.tree.ok_or(MerkleError::NotBuilt)
    }

    fn ensure_open(&self) -> MerkleResult<()> {
        if self.state.is_terminal() {
            return Err(MerkleError::AlreadyFinalized);
        }
        Ok(())
    }
}
