//! Random access to reference bases by contig and half-open range.
//!
//! Two backends implement [`ReferenceAccessor`]:
//!
//! - [`IndexedFasta`]: queries an uncompressed FASTA through its `.fai` index
//! - [`InMemoryReference`]: loads every sequence (plain or gzip FASTA) up front
//!
//! [`open_reference`] picks the indexed backend whenever `<fasta>.fai` exists.
//! Both are read-only and may be shared across threads.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use noodles::core::{Position, Region};
use noodles::fasta;
use thiserror::Error;
use tracing::debug;

use crate::parsing::{open_text, ParseError};
use crate::utils::validation::is_gzipped;

#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error("Contig '{0}' not found in reference")]
    UnknownContig(String),

    #[error("Range {start}-{end} is outside contig '{contig}' (length {length})")]
    OutOfBounds {
        contig: String,
        start: u64,
        end: u64,
        length: u64,
    },

    #[error("Reference '{0}' contains no sequences")]
    Empty(PathBuf),

    #[error("Reference reader lock poisoned")]
    Poisoned,
}

/// Read-only lookup of reference bases
pub trait ReferenceAccessor: Send + Sync {
    /// Length of a contig, if present
    fn contig_length(&self, contig: &str) -> Option<u64>;

    /// Fetch bases in the 0-based half-open range `[start, end)`, upper case
    ///
    /// # Errors
    ///
    /// Returns `ReferenceError::UnknownContig` for a missing contig, or
    /// `ReferenceError::OutOfBounds` if the range does not fit the contig.
    fn fetch(&self, contig: &str, start: u64, end: u64) -> Result<String, ReferenceError>;

    /// Map a normalized chromosome (`1`, `X`, `M`) to the contig name used by
    /// this reference, trying the UCSC `chr` form first
    fn resolve_contig(&self, chromosome: &str) -> Option<String> {
        let candidates = match chromosome {
            "M" => vec!["chrM".to_string(), "chrMT".to_string(), "MT".to_string(), "M".to_string()],
            _ => vec![format!("chr{chromosome}"), chromosome.to_string()],
        };
        candidates
            .into_iter()
            .find(|name| self.contig_length(name).is_some())
    }
}

fn check_range(contig: &str, start: u64, end: u64, length: u64) -> Result<(), ReferenceError> {
    if start > end || end > length {
        return Err(ReferenceError::OutOfBounds {
            contig: contig.to_string(),
            start,
            end,
            length,
        });
    }
    Ok(())
}

/// Reference held fully in memory
#[derive(Debug, Default)]
pub struct InMemoryReference {
    sequences: HashMap<String, Vec<u8>>,
}

impl InMemoryReference {
    /// Build from (name, sequence) pairs
    pub fn from_sequences<N, S>(sequences: impl IntoIterator<Item = (N, S)>) -> Self
    where
        N: Into<String>,
        S: AsRef<[u8]>,
    {
        let sequences = sequences
            .into_iter()
            .map(|(name, seq)| (name.into(), seq.as_ref().to_ascii_uppercase()))
            .collect();
        Self { sequences }
    }

    /// Load a FASTA file (plain or gzip)
    ///
    /// # Errors
    ///
    /// Returns `ReferenceError::Io` if the file cannot be read, or
    /// `ReferenceError::Noodles` if a record fails to parse.
    pub fn from_path(path: &Path) -> Result<Self, ReferenceError> {
        let reader = open_text(path).map_err(|e| match e {
            ParseError::Io(e) => ReferenceError::Io(e),
            other => ReferenceError::Noodles(other.to_string()),
        })?;
        Self::from_reader(reader)
    }

    /// Load from a buffered FASTA stream
    ///
    /// # Errors
    ///
    /// Returns `ReferenceError::Noodles` if a record fails to parse.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, ReferenceError> {
        let mut fasta_reader = fasta::io::Reader::new(reader);
        let mut sequences = HashMap::new();

        for result in fasta_reader.records() {
            let record = result
                .map_err(|e| ReferenceError::Noodles(format!("Failed to parse FASTA record: {e}")))?;
            let name = String::from_utf8_lossy(record.name()).to_string();
            let sequence = record.sequence().as_ref().to_ascii_uppercase();
            sequences.insert(name, sequence);
        }

        Ok(Self { sequences })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

impl ReferenceAccessor for InMemoryReference {
    fn contig_length(&self, contig: &str) -> Option<u64> {
        self.sequences.get(contig).map(|seq| seq.len() as u64)
    }

    fn fetch(&self, contig: &str, start: u64, end: u64) -> Result<String, ReferenceError> {
        let sequence = self
            .sequences
            .get(contig)
            .ok_or_else(|| ReferenceError::UnknownContig(contig.to_string()))?;
        check_range(contig, start, end, sequence.len() as u64)?;

        #[allow(clippy::cast_possible_truncation)] // bounded by the sequence length
        let bases = &sequence[start as usize..end as usize];
        Ok(String::from_utf8_lossy(bases).to_string())
    }
}

/// FASTA accessed through its `.fai` index
pub struct IndexedFasta {
    reader: Mutex<fasta::io::IndexedReader<BufReader<File>>>,
    lengths: HashMap<String, u64>,
}

impl IndexedFasta {
    /// Open a FASTA and its index
    ///
    /// # Errors
    ///
    /// Returns `ReferenceError::Io` if either file cannot be opened, or
    /// `ReferenceError::Noodles` if the index fails to parse.
    pub fn open(fasta_path: &Path, index_path: &Path) -> Result<Self, ReferenceError> {
        let reader = File::open(index_path).map(BufReader::new)?;
        let index = fasta::fai::io::Reader::new(reader)
            .read_index()
            .map_err(|e| ReferenceError::Noodles(format!("Failed to parse FAI file: {e}")))?;

        let mut lengths = HashMap::new();
        for record in index.as_ref() {
            let name = String::from_utf8_lossy(record.name()).to_string();
            if record.line_bases() == 0 && record.length() > 0 {
                return Err(ReferenceError::Noodles(format!(
                    "Invalid FAI entry for '{name}': zero bases per line"
                )));
            }
            lengths.insert(name, record.length());
        }

        let file = File::open(fasta_path).map(BufReader::new)?;
        let reader = fasta::io::indexed_reader::Builder::default()
            .set_index(index)
            .build_from_reader(file)?;
        Ok(Self {
            reader: Mutex::new(reader),
            lengths,
        })
    }
}

impl ReferenceAccessor for IndexedFasta {
    fn contig_length(&self, contig: &str) -> Option<u64> {
        self.lengths.get(contig).copied()
    }

    fn fetch(&self, contig: &str, start: u64, end: u64) -> Result<String, ReferenceError> {
        let length = self
            .contig_length(contig)
            .ok_or_else(|| ReferenceError::UnknownContig(contig.to_string()))?;
        check_range(contig, start, end, length)?;
        if start == end {
            return Ok(String::new());
        }

        // noodles regions are 1-based and inclusive
        let position = |n: u64| {
            usize::try_from(n)
                .ok()
                .and_then(|n| Position::try_from(n).ok())
                .ok_or(ReferenceError::OutOfBounds {
                    contig: contig.to_string(),
                    start,
                    end,
                    length,
                })
        };
        let region = Region::new(contig, position(start + 1)?..=position(end)?);

        let record = {
            let mut reader = self.reader.lock().map_err(|_| ReferenceError::Poisoned)?;
            reader.query(&region)?
        };
        let bases = record.sequence().as_ref().to_ascii_uppercase();
        Ok(String::from_utf8_lossy(&bases).to_string())
    }
}

/// Path of the conventional `.fai` index next to a FASTA
#[must_use]
pub fn index_path(fasta_path: &Path) -> PathBuf {
    let mut path = fasta_path.as_os_str().to_owned();
    path.push(".fai");
    PathBuf::from(path)
}

/// Open a reference, seeking through `<fasta>.fai` when present
///
/// # Errors
///
/// Returns an error if the FASTA (or its index) cannot be read or parsed.
pub fn open_reference(path: &Path) -> Result<Box<dyn ReferenceAccessor>, ReferenceError> {
    let fai = index_path(path);
    if fai.exists() && !is_gzipped(path) {
        debug!(index = %fai.display(), "Using indexed reference access");
        return Ok(Box::new(IndexedFasta::open(path, &fai)?));
    }

    debug!(fasta = %path.display(), "No usable index, loading reference into memory");
    let reference = InMemoryReference::from_path(path)?;
    if reference.is_empty() {
        return Err(ReferenceError::Empty(path.to_path_buf()));
    }
    debug!(contigs = reference.len(), "Loaded reference");
    Ok(Box::new(reference))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::TempDir;

    const FASTA: &str = ">chr1 test\nACGTAcgtAC\nGTACGTACGT\nAAAA\n>chr2\nGGGGCCCC\n";
    const FAI: &str = "chr1\t24\t11\t10\t11\nchr2\t8\t44\t8\t9\n";

    fn write_indexed(dir: &TempDir) -> PathBuf {
        let fasta_path = dir.path().join("ref.fa");
        std::fs::File::create(&fasta_path)
            .unwrap()
            .write_all(FASTA.as_bytes())
            .unwrap();
        std::fs::File::create(index_path(&fasta_path))
            .unwrap()
            .write_all(FAI.as_bytes())
            .unwrap();
        fasta_path
    }

    #[test]
    fn test_in_memory_fetch() {
        let reference = InMemoryReference::from_reader(Cursor::new(FASTA)).unwrap();
        assert_eq!(reference.len(), 2);
        assert_eq!(reference.contig_length("chr1"), Some(24));
        assert_eq!(reference.fetch("chr1", 0, 4).unwrap(), "ACGT");
        assert_eq!(reference.fetch("chr1", 5, 12).unwrap(), "CGTACGT");
        assert_eq!(reference.fetch("chr1", 3, 3).unwrap(), "");
    }

    #[test]
    fn test_indexed_fetch_spans_lines() {
        let dir = TempDir::new().unwrap();
        let fasta_path = write_indexed(&dir);

        let reference = IndexedFasta::open(&fasta_path, &index_path(&fasta_path)).unwrap();
        assert_eq!(reference.contig_length("chr1"), Some(24));
        assert_eq!(reference.fetch("chr1", 0, 4).unwrap(), "ACGT");
        // Lower case input is upper-cased and the line break is skipped
        assert_eq!(reference.fetch("chr1", 5, 12).unwrap(), "CGTACGT");
        assert_eq!(reference.fetch("chr1", 20, 24).unwrap(), "AAAA");
        assert_eq!(reference.fetch("chr2", 3, 5).unwrap(), "GC");
    }

    #[test]
    fn test_backends_agree() {
        let dir = TempDir::new().unwrap();
        let fasta_path = write_indexed(&dir);

        let indexed = IndexedFasta::open(&fasta_path, &index_path(&fasta_path)).unwrap();
        let memory = InMemoryReference::from_path(&fasta_path).unwrap();
        for (start, end) in [(0, 24), (9, 11), (10, 21), (23, 24)] {
            assert_eq!(
                indexed.fetch("chr1", start, end).unwrap(),
                memory.fetch("chr1", start, end).unwrap()
            );
        }
    }

    #[test]
    fn test_fetch_errors() {
        let reference = InMemoryReference::from_sequences([("chr1", "ACGT")]);
        assert!(matches!(
            reference.fetch("chr9", 0, 1),
            Err(ReferenceError::UnknownContig(_))
        ));
        assert!(matches!(
            reference.fetch("chr1", 2, 5),
            Err(ReferenceError::OutOfBounds { length: 4, .. })
        ));
        assert!(matches!(
            reference.fetch("chr1", 3, 2),
            Err(ReferenceError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_resolve_contig() {
        let ucsc = InMemoryReference::from_sequences([("chr1", "A"), ("chrM", "A")]);
        assert_eq!(ucsc.resolve_contig("1").as_deref(), Some("chr1"));
        assert_eq!(ucsc.resolve_contig("M").as_deref(), Some("chrM"));
        assert_eq!(ucsc.resolve_contig("2"), None);

        let ncbi = InMemoryReference::from_sequences([("1", "A"), ("MT", "A")]);
        assert_eq!(ncbi.resolve_contig("1").as_deref(), Some("1"));
        assert_eq!(ncbi.resolve_contig("M").as_deref(), Some("MT"));
    }

    #[test]
    fn test_open_reference_prefers_index() {
        let dir = TempDir::new().unwrap();
        let fasta_path = write_indexed(&dir);
        let reference = open_reference(&fasta_path).unwrap();
        assert_eq!(reference.fetch("chr2", 0, 8).unwrap(), "GGGGCCCC");

        std::fs::remove_file(index_path(&fasta_path)).unwrap();
        let reference = open_reference(&fasta_path).unwrap();
        assert_eq!(reference.fetch("chr2", 0, 8).unwrap(), "GGGGCCCC");
    }

    #[test]
    fn test_open_reference_rejects_empty_fasta() {
        let dir = TempDir::new().unwrap();
        let fasta_path = dir.path().join("empty.fa");
        std::fs::write(&fasta_path, "").unwrap();
        assert!(matches!(
            open_reference(&fasta_path),
            Err(ReferenceError::Empty(_))
        ));
    }
}
