//! Record sources.
//!
//! A source hands over the complete, ordered list of records before tree
//! construction begins. Any read failure surfaces as
//! [`MerkleError::SourceUnavailable`].

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{MerkleError, MerkleResult};

/// An opaque byte record. Order within a source is significant.
pub type Record = Vec<u8>;

/// Producer of an ordered sequence of byte records.
pub trait RecordSource {
    /// Human-readable name used in errors and reports.
    fn name(&self) -> String;

    /// Read every record, in order.
    fn read_records(&self) -> MerkleResult<Vec<Record>>;
}

/// Reads a file and yields one record per line.
#[derive(Clone, Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for FileSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn read_records(&self) -> MerkleResult<Vec<Record>> {
        let bytes = std::fs::read(&self.path)
            .map_err(|e| MerkleError::source_unavailable(self.name(), e))?;
        let records = split_lines(&bytes);
        debug!(
            source = %self.path.display(),
            bytes = bytes.len(),
            records = records.len(),
            "read record source"
        );
        Ok(records)
    }
}

/// Records held in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    name: String,
    records: Vec<Record>,
}

impl MemorySource {
    pub fn new<I, R>(records: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Record>,
    {
        Self {
            name: "memory".to_string(),
            records: records.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordSource for MemorySource {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn read_records(&self) -> MerkleResult<Vec<Record>> {
        Ok(self.records.clone())
    }
}

/// Split text into lines.
///
/// Terminators are `\n`, `\r\n`, a lone `\r`, and the UTF-8 encodings of
/// U+0085 (NEL), U+2028 (LINE SEPARATOR) and U+2029 (PARAGRAPH SEPARATOR).
/// Terminators are dropped. A trailing terminator does not produce a final
/// empty line, so empty input yields no records.
pub fn split_lines(bytes: &[u8]) -> Vec<Record> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match terminator_len(&bytes[i..]) {
            Some(len) => {
                lines.push(bytes[start..i].to_vec());
                i += len;
                start = i;
            }
            None => i += 1,
        }
    }

    if start < bytes.len() {
        lines.push(bytes[start..].to_vec());
    }
    lines
}

/// Length of the line terminator at the start of `rest`, if any.
fn terminator_len(rest: &[u8]) -> Option<usize> {
    match rest {
        [b'\r', b'\n', ..] => Some(2),
        [b'\n', ..] | [b'\r', ..] => Some(1),
        [0xC2, 0x85, ..] => Some(2),
        [0xE2, 0x80, 0xA8, ..] | [0xE2, 0x80, 0xA9, ..] => Some(3),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn lines(input: &str) -> Vec<String> {
        split_lines(input.as_bytes())
            .into_iter()
            .map(|l| String::from_utf8(l).unwrap())
            .collect()
    }

    #[test]
    fn test_split_lines_terminators() {
        assert_eq!(lines("a\nb\nc"), vec!["a", "b", "c"]);
        assert_eq!(lines("a\r\nb\r\n"), vec!["a", "b"]);
        assert_eq!(lines("a\rb"), vec!["a", "b"]);
        assert_eq!(lines("a\n\nb\n"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_split_lines_edges() {
        assert!(lines("").is_empty());
        assert_eq!(lines("\n"), vec![""]);
        assert_eq!(lines("no newline"), vec!["no newline"]);
    }

    #[test]
    fn test_split_lines_unicode_separators() {
        assert_eq!(lines("a\u{0085}b"), vec!["a", "b"]);
        assert_eq!(lines("a\u{2028}b\u{2029}c\u{2029}"), vec!["a", "b", "c"]);
        assert_eq!(lines("\u{2028}\u{2028}"), vec!["", ""]);
        // Other multi-byte characters stay inside the line.
        assert_eq!(lines("caf\u{e9}\u{2027}x"), vec!["caf\u{e9}\u{2027}x"]);
    }

    #[test]
    fn test_file_source_reads_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "line one\nline two\r\nline three").unwrap();

        let source = FileSource::new(file.path());
        let records = source.read_records().unwrap();
        assert_eq!(
            records,
            vec![
                b"line one".to_vec(),
                b"line two".to_vec(),
                b"line three".to_vec()
            ]
        );
    }

    #[test]
    fn test_missing_file_is_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSource::new(dir.path().join("does-not-exist.csv"));

        match source.read_records() {
            Err(MerkleError::SourceUnavailable { source_name, .. }) => {
                assert!(source_name.ends_with("does-not-exist.csv"));
            }
            other => panic!("expected SourceUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_memory_source() {
        let source = MemorySource::new(vec!["a", "b"]).with_name("inline");
        assert_eq!(source.name(), "inline");
        assert_eq!(source.len(), 2);
        assert_eq!(source.read_records().unwrap()[1], b"b".to_vec());
    }
}
