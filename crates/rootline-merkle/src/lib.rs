//! # rootline-merkle
//!
//! Merkle tree construction over an ordered sequence of byte records.
//!
//! - [`hash`]: the [`Digest`] type and the [`MerkleHasher`] functions (SHA-256, BLAKE3)
//! - [`level`]: one depth-layer of digests and the reduction pass
//! - [`tree::MerkleTree`]: atomic construction and the read-only query surface
//! - [`builder::TreeBuilder`]: record collection with an explicit build lifecycle
//! - [`source`]: record sources (files read line by line, in-memory records)
//!
//! ## Construction
//!
//! Records are hashed into leaves in input order. Parents are hashed from the
//! uppercase hex text of their two children. Whenever a level has an odd number
//! of entries (more than one), its last entry is duplicated. For the leaf level
//! the duplication happens on the record before hashing.

pub mod builder;
pub mod error;
pub mod hash;
pub mod level;
pub mod source;
pub mod tree;

pub use builder::{BuildState, TreeBuilder};
pub use error::{MerkleError, MerkleResult};
pub use hash::{Blake3Hasher, Digest, HashAlgorithm, MatchMode, MerkleHasher, Sha256Hasher};
pub use level::Level;
pub use source::{FileSource, MemorySource, Record, RecordSource};
pub use tree::MerkleTree;

/// The length of hash digests used in merkle trees (32 bytes = 256 bits)
pub const HASH_LENGTH: usize = 32;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_basic() {
        let records: Vec<Vec<u8>> = vec![
            b"leaf0".to_vec(),
            b"leaf1".to_vec(),
            b"leaf2".to_vec(),
            b"leaf3".to_vec(),
        ];

        let tree: MerkleTree = MerkleTree::build(records).unwrap();
        assert_eq!(tree.leaf_count(), 4);
        assert_eq!(tree.level_count(), 3);

        let level1 = tree.level_at(1).unwrap();
        assert_eq!(tree.root(), Sha256Hasher::hash_pair(&level1[0], &level1[1]));
    }

    #[test]
    fn test_independent_trees_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                std::thread::spawn(move || {
                    let records: Vec<String> = (0..=i * 3).map(|n| format!("{}:{}", i, n)).collect();
                    let tree: MerkleTree = MerkleTree::build(records.clone()).unwrap();
                    (records, tree)
                })
            })
            .collect();

        for handle in handles {
            let (records, tree) = handle.join().unwrap();
            let again: MerkleTree = MerkleTree::build(records).unwrap();
            assert_eq!(tree.root(), again.root());
        }
    }
}
