//! Serialization of assembled records.
//!
//! - [`vcf`]: the VCF sink written by a conversion
//! - [`swap`]: rewrites an existing VCF with the BAF and LRR fields exchanged
//! - [`affy`]: rewrites an Affymetrix VCF into the same `GT:BAF:LRR` layout
//!
//! Outputs go through [`OutputTarget`], which writes to stdout, a plain file,
//! or a gzip stream depending on the destination path.

use std::fs::File;
use std::io::{self, BufWriter, Stdout, Write};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use thiserror::Error;

use crate::core::record::OutputRecord;
use crate::parsing::ParseError;
use crate::utils::validation::is_gzipped;

pub mod affy;
pub mod swap;
pub mod vcf;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Invalid VCF on line {line}: {message}")]
    InvalidVcf { line: usize, message: String },
}

/// Ordered consumer of output records
pub trait RecordSink {
    /// Append one record
    ///
    /// # Errors
    ///
    /// Returns `OutputError::Io` if the record cannot be written.
    fn write_record(&mut self, record: &OutputRecord) -> Result<(), OutputError>;
}

impl RecordSink for Vec<OutputRecord> {
    fn write_record(&mut self, record: &OutputRecord) -> Result<(), OutputError> {
        self.push(record.clone());
        Ok(())
    }
}

/// Destination for text output
pub enum OutputTarget {
    Stdout(BufWriter<Stdout>),
    File(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl OutputTarget {
    /// Open `path` for writing; `-` selects stdout and a `.gz`/`.bgz` suffix
    /// selects gzip compression
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be created.
    pub fn create(path: &Path) -> io::Result<Self> {
        if path.as_os_str() == "-" {
            return Ok(Self::Stdout(BufWriter::new(io::stdout())));
        }
        let file = BufWriter::new(File::create(path)?);
        if is_gzipped(path) {
            Ok(Self::Gzip(GzEncoder::new(file, Compression::default())))
        } else {
            Ok(Self::File(file))
        }
    }

    /// Flush buffered output and write the gzip trailer if any
    ///
    /// # Errors
    ///
    /// Returns an IO error if the final write fails.
    pub fn finish(self) -> io::Result<()> {
        match self {
            Self::Stdout(mut w) => w.flush(),
            Self::File(mut w) => w.flush(),
            Self::Gzip(encoder) => encoder.finish()?.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(w) => w.write(buf),
            Self::File(w) => w.write(buf),
            Self::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
            Self::Gzip(w) => w.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::MultiGzDecoder;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn test_plain_and_gzip_targets() {
        let dir = TempDir::new().unwrap();

        let plain = dir.path().join("out.vcf");
        let mut target = OutputTarget::create(&plain).unwrap();
        target.write_all(b"plain\n").unwrap();
        target.finish().unwrap();
        assert_eq!(std::fs::read_to_string(&plain).unwrap(), "plain\n");

        let gz = dir.path().join("out.vcf.gz");
        let mut target = OutputTarget::create(&gz).unwrap();
        assert!(matches!(target, OutputTarget::Gzip(_)));
        target.write_all(b"compressed\n").unwrap();
        target.finish().unwrap();

        let mut content = String::new();
        MultiGzDecoder::new(File::open(&gz).unwrap())
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "compressed\n");
    }
}
