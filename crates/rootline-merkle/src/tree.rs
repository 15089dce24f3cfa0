//! Merkle tree over an ordered list of records.
//!
//! A tree is built once by [`MerkleTree::build`] and is immutable afterwards.
//! Construction either returns a fully built tree or an error. There is no
//! partially built value to query.
//!
//! # Padding
//!
//! An odd record count duplicates the last *record* before hashing. Every
//! intermediate level with an odd count greater than one duplicates its last
//! *digest* before the next pass. A single-entry level is the root and is never
//! padded.
//!
//! # Example
//!
//! ```
//! use rootline_merkle::MerkleTree;
//!
//! let tree: MerkleTree = MerkleTree::build(vec!["a", "b", "c"]).unwrap();
//! assert_eq!(tree.leaf_count(), 4);
//! assert_eq!(tree.level_count(), 3);
//! assert_eq!(
//!     tree.root().to_string(),
//!     "347C6AE620D4AE042506D67484FC3BE5D4DEE2FF060E8F92D6149C579D172708"
//! );
//! ```

use std::fmt;
use std::marker::PhantomData;

use tracing::{debug, trace};

use crate::error::{MerkleError, MerkleResult};
use crate::hash::{Digest, MatchMode, MerkleHasher, Sha256Hasher};
use crate::level::{pad_records, Level};
use crate::source::{Record, RecordSource};

/// A fully built merkle tree.
pub struct MerkleTree<H: MerkleHasher = Sha256Hasher> {
    /// Input records, including the padding duplicate if one was added.
    records: Vec<Record>,
    /// Number of records before padding.
    record_count: usize,
    /// Levels from leaves (index 0) to root (last).
    levels: Vec<Level>,
    root: Digest,
    _hasher: PhantomData<fn() -> H>,
}

impl<H: MerkleHasher> MerkleTree<H> {
    /// Build a tree from an ordered sequence of records.
    ///
    /// Fails with [`MerkleError::EmptyInput`] when there are no records.
    pub fn build<I, R>(records: I) -> MerkleResult<Self>
    where
        I: IntoIterator<Item = R>,
        R: Into<Record>,
    {
        let records: Vec<Record> = records.into_iter().map(Into::into).collect();
        Self::from_records(records)
    }

    /// Read `source` in full, then build.
    ///
    /// A read failure aborts before any hashing.
    pub fn from_source<S: RecordSource + ?Sized>(source: &S) -> MerkleResult<Self> {
        let records = source.read_records()?;
        debug!(source = %source.name(), records = records.len(), "building tree from source");
        Self::from_records(records)
    }

    fn from_records(mut records: Vec<Record>) -> MerkleResult<Self> {
        if records.is_empty() {
            return Err(MerkleError::EmptyInput);
        }

        let record_count = records.len();
        let padded = pad_records(&mut records);
        let leaves = Level::from_records::<H, _>(&records, padded);

        let levels = reduce_to_root::<H>(leaves);
        let root = levels
            .last()
            .and_then(Level::root)
            .ok_or(MerkleError::NotBuilt)?;

        debug!(
            algorithm = H::NAME,
            records = record_count,
            leaves = levels[0].len(),
            levels = levels.len(),
            root = %root,
            "merkle tree built"
        );

        Ok(Self {
            records,
            record_count,
            levels,
            root,
            _hasher: PhantomData,
        })
    }

    /// The root digest.
    pub fn root(&self) -> Digest {
        self.root
    }

    /// Number of leaf digests, after padding. Always even.
    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Number of records supplied, before padding.
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Number of levels from leaves to root, inclusive.
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// The level at `index`, where 0 is the leaf level.
    pub fn level_at(&self, index: usize) -> MerkleResult<&Level> {
        self.levels.get(index).ok_or(MerkleError::IndexOutOfRange {
            index,
            level_count: self.levels.len(),
        })
    }

    /// All levels, leaves first.
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// The leaf level.
    pub fn leaves(&self) -> &Level {
        &self.levels[0]
    }

    /// Records the leaves were hashed from, including any padding duplicate.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Compare the root against a target digest string.
    pub fn matches_root(&self, target: &str, mode: MatchMode) -> bool {
        self.root.matches_hex(target, mode)
    }

    /// Consume the tree, keeping only its levels.
    pub fn into_levels(self) -> Vec<Level> {
        self.levels
    }

    /// Name of the hash algorithm the tree was built with.
    pub fn algorithm(&self) -> &'static str {
        H::NAME
    }
}

/// Run reduction passes until a single digest remains.
///
/// Returns every level, leaves first. `leaves` must be non-empty and even.
fn reduce_to_root<H: MerkleHasher>(leaves: Level) -> Vec<Level> {
    let mut levels = vec![leaves];

    loop {
        let current = &levels[levels.len() - 1];
        if current.len() <= 1 {
            break;
        }

        let mut next = current.reduce::<H>();
        let padded = next.pad_to_even();
        trace!(
            pass = levels.len(),
            input = current.len(),
            output = next.len(),
            padded,
            "reduction pass"
        );
        levels.push(next);
    }

    levels
}

impl<H: MerkleHasher> Clone for MerkleTree<H> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
            record_count: self.record_count,
            levels: self.levels.clone(),
            root: self.root,
            _hasher: PhantomData,
        }
    }
}

impl<H: MerkleHasher> fmt::Debug for MerkleTree<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerkleTree")
            .field("algorithm", &H::NAME)
            .field("root", &self.root)
            .field("record_count", &self.record_count)
            .field("leaf_count", &self.leaf_count())
            .field("level_count", &self.level_count())
            .finish()
    }
}
