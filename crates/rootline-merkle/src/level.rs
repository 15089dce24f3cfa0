//! One depth-layer of a merkle tree.
//!
//! Levels only ever grow by the duplicate-last rule and shrink by a reduction
//! pass, which halves an even-length level:
//!
//! ```text
//! level 0  [h(a) h(b) h(c) h(c)]        <- "c" duplicated before hashing
//! level 1  [h(h(a)+h(b)) h(h(c)+h(c))]
//! level 2  [root]
//! ```

use serde::Serialize;
use std::ops::Index;

use crate::hash::{Digest, MerkleHasher};

/// An ordered sequence of digests at one depth of the tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Level {
    digests: Vec<Digest>,
    /// The last entry is a copy added by [`Level::pad_to_even`] or by leaf padding.
    padded: bool,
}

impl Level {
    pub(crate) fn new(digests: Vec<Digest>) -> Self {
        Self {
            digests,
            padded: false,
        }
    }

    /// Hash records into a leaf level, one digest per record, in order.
    ///
    /// `padded` marks that the caller already duplicated the last record.
    pub(crate) fn from_records<H, R>(records: &[R], padded: bool) -> Self
    where
        H: MerkleHasher,
        R: AsRef<[u8]>,
    {
        let digests = records.iter().map(|r| H::hash_leaf(r.as_ref())).collect();
        Self { digests, padded }
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Digest> {
        self.digests.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Digest> {
        self.digests.iter()
    }

    pub fn as_slice(&self) -> &[Digest] {
        &self.digests
    }

    /// Owned copy of the digests.
    pub fn digests(&self) -> Vec<Digest> {
        self.digests.clone()
    }

    /// Whether the final entry is a padding duplicate.
    pub fn is_padded(&self) -> bool {
        self.padded
    }

    /// Length before the padding duplicate was appended.
    pub fn original_len(&self) -> usize {
        if self.padded {
            self.digests.len() - 1
        } else {
            self.digests.len()
        }
    }

    /// The root digest, if this is a single-entry level.
    pub fn root(&self) -> Option<Digest> {
        match self.digests.as_slice() {
            [root] => Some(*root),
            _ => None,
        }
    }

    /// Repeat the final digest if the length is odd and greater than one.
    ///
    /// Returns `true` when a duplicate was appended.
    pub(crate) fn pad_to_even(&mut self) -> bool {
        if self.digests.len() > 1 && self.digests.len() % 2 == 1 {
            if let Some(last) = self.digests.last().copied() {
                self.digests.push(last);
                self.padded = true;
                return true;
            }
        }
        false
    }

    /// One reduction pass: hash pairs (0,1), (2,3), ... into the parent level.
    ///
    /// The caller pads first. An odd length here is a bug in the caller.
    pub(crate) fn reduce<H: MerkleHasher>(&self) -> Level {
        debug_assert!(
            self.digests.len() >= 2 && self.digests.len() % 2 == 0,
            "reduce requires an even level of at least two entries, got {}",
            self.digests.len()
        );
        Level::new(hash_pairs::<H>(&self.digests))
    }
}

#[cfg(not(feature = "parallel"))]
fn hash_pairs<H: MerkleHasher>(digests: &[Digest]) -> Vec<Digest> {
    digests
        .chunks_exact(2)
        .map(|pair| H::hash_pair(&pair[0], &pair[1]))
        .collect()
}

#[cfg(feature = "parallel")]
fn hash_pairs<H: MerkleHasher>(digests: &[Digest]) -> Vec<Digest> {
    use rayon::prelude::*;

    digests
        .par_chunks_exact(2)
        .map(|pair| H::hash_pair(&pair[0], &pair[1]))
        .collect()
}

/// Duplicate the last record when the count is odd.
///
/// Returns `true` when a duplicate was appended.
pub(crate) fn pad_records<R: Clone>(records: &mut Vec<R>) -> bool {
    if records.len() % 2 == 1 {
        if let Some(last) = records.last().cloned() {
            records.push(last);
            return true;
        }
    }
    false
}

impl Index<usize> for Level {
    type Output = Digest;

    fn index(&self, index: usize) -> &Digest {
        &self.digests[index]
    }
}

impl<'a> IntoIterator for &'a Level {
    type Item = &'a Digest;
    type IntoIter = std::slice::Iter<'a, Digest>;

    fn into_iter(self) -> Self::IntoIter {
        self.digests.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::Sha256Hasher;

    fn leaves(records: &[&str]) -> Level {
        Level::from_records::<Sha256Hasher, _>(records, false)
    }

    #[test]
    fn test_from_records_keeps_order() {
        let level = leaves(&["a", "b"]);
        assert_eq!(level.len(), 2);
        assert_eq!(level[0], Sha256Hasher::hash_leaf(b"a"));
        assert_eq!(level[1], Sha256Hasher::hash_leaf(b"b"));
        assert!(!level.is_padded());
    }

    #[test]
    fn test_pad_to_even() {
        let mut level = leaves(&["a", "b", "c"]);
        assert!(level.pad_to_even());
        assert_eq!(level.len(), 4);
        assert_eq!(level[3], level[2]);
        assert!(level.is_padded());
        assert_eq!(level.original_len(), 3);

        // Already even: untouched.
        assert!(!level.pad_to_even());
        assert_eq!(level.len(), 4);
    }

    #[test]
    fn test_single_entry_level_is_never_padded() {
        let mut level = leaves(&["only"]);
        assert!(!level.pad_to_even());
        assert_eq!(level.len(), 1);
        assert_eq!(level.root(), Some(Sha256Hasher::hash_leaf(b"only")));
    }

    #[test]
    fn test_reduce_halves_in_pair_order() {
        let level = leaves(&["a", "b", "c", "d"]);
        let parent = level.reduce::<Sha256Hasher>();

        assert_eq!(parent.len(), 2);
        assert_eq!(parent[0], Sha256Hasher::hash_pair(&level[0], &level[1]));
        assert_eq!(parent[1], Sha256Hasher::hash_pair(&level[2], &level[3]));
        assert!(parent.root().is_none());
    }

    #[test]
    fn test_pad_records() {
        let mut odd = vec!["a", "b", "c"];
        assert!(pad_records(&mut odd));
        assert_eq!(odd, vec!["a", "b", "c", "c"]);

        let mut even = vec!["a", "b"];
        assert!(!pad_records(&mut even));
        assert_eq!(even.len(), 2);

        let mut empty: Vec<&str> = Vec::new();
        assert!(!pad_records(&mut empty));
    }
}
