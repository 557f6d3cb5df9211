//! Producers for the external inputs of a conversion.
//!
//! This module provides:
//!
//! - **Array manifests** ([`manifest`]): comma-delimited probe definitions
//! - **Genotype reports** ([`report`]): per-sample tab-delimited observations, in
//!   one of several column layouts selected from the header line
//! - **Reference sequences** ([`reference`]): random access into a FASTA, through
//!   its `.fai` index when available
//!
//! Manifests and reports are exposed as lazy iterators over buffered readers,
//! so a run holds at most one pending record per input stream.
//!
//! ## Example
//!
//! ```rust,no_run
//! use array_vcf::parsing::manifest::ManifestReader;
//! use std::path::Path;
//!
//! let manifest = ManifestReader::from_path(Path::new("GSA-24v3-0_A1.csv")).unwrap();
//! for record in manifest {
//!     let record = record.unwrap();
//!     println!("{} {}:{}", record.name, record.chromosome, record.position);
//! }
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use thiserror::Error;

use crate::utils::validation::is_gzipped;

pub mod manifest;
pub mod reference;
pub mod report;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unexpected header line: {0}")]
    UnexpectedHeader(String),

    #[error("No recognized header line found")]
    MissingHeader,

    #[error("Line {line} has {found} fields, expected {expected}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Invalid {field} on line {line}: '{value}'")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("Unrecognized strand '{value}' on line {line}")]
    InvalidStrand { line: usize, value: String },

    #[error("Invalid format on line {line}: {message}")]
    InvalidFormat { line: usize, message: String },
}

/// Open a text input, transparently decompressing gzip/bgzip files
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be opened.
pub fn open_text(path: &Path) -> Result<Box<dyn BufRead + Send>, ParseError> {
    let file = File::open(path)?;
    if is_gzipped(path) {
        // bgzip output is a series of gzip members
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Strip a trailing carriage return left by CRLF files
pub(crate) fn trim_line_end(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}
