//! Digest type and the hash functions used to build trees.
//!
//! Leaves are hashed from the raw record bytes. Parents are hashed from the
//! concatenated *uppercase hex text* of their two children, left first, with no
//! separator:
//!
//! ```text
//! leaf   = H(record)
//! parent = H(hex(left) || hex(right))      // 128 ASCII bytes
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::{MerkleError, MerkleResult, HASH_LENGTH};

/// Length of the canonical hex form of a digest.
pub const HEX_LENGTH: usize = HASH_LENGTH * 2;

/// A 256-bit digest. Displays as 64 uppercase hex characters.
///
/// Serializes as that hex string in human-readable formats, raw bytes otherwise.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Digest([u8; HASH_LENGTH]);

impl Digest {
    /// Create a new Digest from a fixed-size array
    pub fn new(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Create a Digest from a slice
    pub fn from_slice(bytes: &[u8]) -> MerkleResult<Self> {
        if bytes.len() != HASH_LENGTH {
            return Err(MerkleError::InvalidDigestLength {
                expected: HASH_LENGTH,
                got: bytes.len(),
            });
        }
        let mut arr = [0u8; HASH_LENGTH];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Parse a hex string in either case, with or without a `0x` prefix.
    pub fn from_hex(hex_str: &str) -> MerkleResult<Self> {
        let trimmed = strip_hex_prefix(hex_str);
        if trimmed.len() != HEX_LENGTH {
            return Err(MerkleError::InvalidDigest(format!(
                "expected {} hex characters, got {}",
                HEX_LENGTH,
                trimmed.len()
            )));
        }
        let bytes = hex::decode(trimmed)
            .map_err(|e| MerkleError::InvalidDigest(format!("invalid hex: {}", e)))?;
        Self::from_slice(&bytes)
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }

    /// Convert to a Vec<u8>
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Canonical uppercase hex form.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }

    /// Write the canonical hex form into `out` without allocating.
    fn write_hex(&self, out: &mut [u8]) {
        debug_assert_eq!(out.len(), HEX_LENGTH);
        let encoded = hex::encode_to_slice(self.0, out);
        debug_assert!(encoded.is_ok(), "hex buffer must be {} bytes", HEX_LENGTH);
        out.make_ascii_uppercase();
    }

    /// Compare against an externally supplied digest string.
    ///
    /// Surrounding whitespace and a `0x`/`0X` prefix in `target` are ignored in
    /// both modes, matching what [`Digest::from_hex`] accepts.
    pub fn matches_hex(&self, target: &str, mode: MatchMode) -> bool {
        let target = strip_hex_prefix(target);
        match mode {
            MatchMode::Exact => self.to_hex() == target,
            MatchMode::IgnoreCase => self.to_hex().eq_ignore_ascii_case(target),
        }
    }
}

fn strip_hex_prefix(s: &str) -> &str {
    let trimmed = s.trim();
    trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self)
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; HASH_LENGTH]> for Digest {
    fn from(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Digest::from_hex(&s).map_err(serde::de::Error::custom)
        } else {
            <[u8; HASH_LENGTH]>::deserialize(deserializer).map(Digest)
        }
    }
}

impl FromStr for Digest {
    type Err = MerkleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// How a computed root is compared against a target digest string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    /// Case-sensitive comparison against the uppercase hex form.
    Exact,
    /// ASCII case-insensitive comparison.
    #[default]
    IgnoreCase,
}

impl FromStr for MatchMode {
    type Err = MerkleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(MatchMode::Exact),
            "ignore-case" | "ignore_case" | "ignorecase" => Ok(MatchMode::IgnoreCase),
            other => Err(MerkleError::InvalidInput(format!(
                "unknown match mode '{}'",
                other
            ))),
        }
    }
}

/// A stateless 256-bit hash function.
pub trait MerkleHasher {
    /// Short algorithm name, used in logs and reports.
    const NAME: &'static str;

    /// Hash arbitrary bytes. Empty input is valid.
    fn digest(data: &[u8]) -> Digest;

    /// Hash one record into a leaf digest.
    fn hash_leaf(record: &[u8]) -> Digest {
        Self::digest(record)
    }

    /// Hash two children into their parent.
    fn hash_pair(left: &Digest, right: &Digest) -> Digest {
        let mut buf = [0u8; HEX_LENGTH * 2];
        let (l, r) = buf.split_at_mut(HEX_LENGTH);
        left.write_hex(l);
        right.write_hex(r);
        Self::digest(&buf)
    }
}

/// SHA-256, the reference algorithm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sha256Hasher;

impl MerkleHasher for Sha256Hasher {
    const NAME: &'static str = "sha256";

    fn digest(data: &[u8]) -> Digest {
        let mut hasher = Sha256::new();
        hasher.update(data);
        let result = hasher.finalize();
        let mut bytes = [0u8; HASH_LENGTH];
        bytes.copy_from_slice(&result);
        Digest(bytes)
    }
}

/// BLAKE3 with its default 256-bit output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Blake3Hasher;

impl MerkleHasher for Blake3Hasher {
    const NAME: &'static str = "blake3";

    fn digest(data: &[u8]) -> Digest {
        Digest(*blake3::hash(data).as_bytes())
    }
}

/// Runtime selector for the hash function.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Blake3,
}

impl HashAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => Sha256Hasher::NAME,
            HashAlgorithm::Blake3 => Blake3Hasher::NAME,
        }
    }

    /// Hash bytes with the selected algorithm.
    pub fn digest(&self, data: &[u8]) -> Digest {
        match self {
            HashAlgorithm::Sha256 => Sha256Hasher::digest(data),
            HashAlgorithm::Blake3 => Blake3Hasher::digest(data),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = MerkleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            "blake3" => Ok(HashAlgorithm::Blake3),
            other => Err(MerkleError::InvalidInput(format!(
                "unknown hash algorithm '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_SHA256: &str = "E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855";
    const SHA256_A: &str = "CA978112CA1BBDCAFAC231B39A23DC4DA786EFF8147C4E72B9807785AFEE48BB";
    const SHA256_B: &str = "3E23E8160039594A33894F6564E1B1348BBD7A0088D42C4ACB73EEAED59C009D";

    #[test]
    fn test_sha256_known_answers() {
        assert_eq!(Sha256Hasher::digest(b"").to_hex(), EMPTY_SHA256);
        assert_eq!(Sha256Hasher::hash_leaf(b"a").to_hex(), SHA256_A);
        assert_eq!(Sha256Hasher::hash_leaf(b"b").to_hex(), SHA256_B);
    }

    #[test]
    fn test_hash_pair_concatenates_hex_text() {
        let a = Sha256Hasher::hash_leaf(b"a");
        let b = Sha256Hasher::hash_leaf(b"b");

        let text = format!("{}{}", a.to_hex(), b.to_hex());
        assert_eq!(Sha256Hasher::hash_pair(&a, &b), Sha256Hasher::digest(text.as_bytes()));
        assert_eq!(
            Sha256Hasher::hash_pair(&a, &b).to_hex(),
            "6A20F2EE7789E6BB7F404CC2DD729FF308B724D904F6A455B74D4851ADE5AECB"
        );
        // Concatenation order is significant.
        assert_ne!(Sha256Hasher::hash_pair(&a, &b), Sha256Hasher::hash_pair(&b, &a));
    }

    #[test]
    fn test_blake3_pair_uses_same_rule() {
        let a = Blake3Hasher::hash_leaf(b"a");
        let b = Blake3Hasher::hash_leaf(b"b");
        let text = format!("{}{}", a, b);
        assert_eq!(Blake3Hasher::hash_pair(&a, &b), Blake3Hasher::digest(text.as_bytes()));
        assert_ne!(a, Sha256Hasher::hash_leaf(b"a"));
    }

    #[test]
    fn test_display_is_uppercase_hex() {
        let d = Sha256Hasher::digest(b"");
        let shown = d.to_string();
        assert_eq!(shown.len(), HEX_LENGTH);
        assert_eq!(shown, shown.to_ascii_uppercase());
        assert_eq!(format!("{:?}", d), format!("Digest({})", EMPTY_SHA256));
    }

    #[test]
    fn test_from_hex() {
        let upper = Digest::from_hex(EMPTY_SHA256).unwrap();
        let lower = Digest::from_hex(&EMPTY_SHA256.to_lowercase()).unwrap();
        let prefixed = Digest::from_hex(&format!("0x{}", EMPTY_SHA256)).unwrap();
        assert_eq!(upper, lower);
        assert_eq!(upper, prefixed);
        assert_eq!(upper, Sha256Hasher::digest(b""));

        assert!(matches!(
            Digest::from_hex("ABCD"),
            Err(MerkleError::InvalidDigest(_))
        ));
        assert!(matches!(
            Digest::from_hex(&"ZZ".repeat(HASH_LENGTH)),
            Err(MerkleError::InvalidDigest(_))
        ));
    }

    #[test]
    fn test_from_slice_length() {
        assert!(Digest::from_slice(&[7u8; 32]).is_ok());
        assert_eq!(
            Digest::from_slice(&[7u8; 31]),
            Err(MerkleError::InvalidDigestLength {
                expected: 32,
                got: 31
            })
        );
    }

    #[test]
    fn test_matches_hex_modes() {
        let d = Sha256Hasher::digest(b"");
        let lower = EMPTY_SHA256.to_lowercase();

        assert!(d.matches_hex(EMPTY_SHA256, MatchMode::Exact));
        assert!(!d.matches_hex(&lower, MatchMode::Exact));
        assert!(d.matches_hex(&lower, MatchMode::IgnoreCase));
        assert!(d.matches_hex(&format!("  {}\n", EMPTY_SHA256), MatchMode::Exact));
        assert!(!d.matches_hex(SHA256_A, MatchMode::IgnoreCase));
    }

    #[test]
    fn test_matches_hex_with_prefix() {
        let d = Sha256Hasher::digest(b"");
        let prefixed = format!("0x{}", d.to_hex());
        assert!(Digest::from_hex(&prefixed).is_ok());

        assert!(d.matches_hex(&prefixed, MatchMode::IgnoreCase));
        assert!(d.matches_hex(&prefixed, MatchMode::Exact));
        assert!(d.matches_hex(&format!("0X{}", EMPTY_SHA256.to_lowercase()), MatchMode::IgnoreCase));
        assert!(!d.matches_hex(&format!("0x{}", EMPTY_SHA256.to_lowercase()), MatchMode::Exact));
        assert!(!d.matches_hex(&format!("0x{}", SHA256_A), MatchMode::IgnoreCase));
    }

    #[test]
    fn test_algorithm_parsing() {
        assert_eq!("SHA256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert_eq!("sha-256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert_eq!("blake3".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Blake3);
        assert_eq!(
            "md5".parse::<HashAlgorithm>(),
            Err(MerkleError::InvalidInput("unknown hash algorithm 'md5'".to_string()))
        );
        assert!(matches!(
            "fuzzy".parse::<MatchMode>(),
            Err(MerkleError::InvalidInput(_))
        ));

        assert_eq!(HashAlgorithm::Blake3.digest(b"x"), Blake3Hasher::digest(b"x"));
        assert_eq!("exact".parse::<MatchMode>().unwrap(), MatchMode::Exact);
        assert_eq!(MatchMode::default(), MatchMode::IgnoreCase);
    }

    #[test]
    fn test_digest_serde() {
        let d = Sha256Hasher::digest(b"a");
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, format!("\"{}\"", SHA256_A));
        let back: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(d, back);

        let algo: HashAlgorithm = serde_json::from_str("\"blake3\"").unwrap();
        assert_eq!(algo, HashAlgorithm::Blake3);
    }
}
