//! Conversion of array genotype reports into reference-anchored records.
//!
//! The pipeline for each manifest probe:
//!
//! 1. [`sync`]: pull one record from every sample stream and pair them with
//!    the manifest probe
//! 2. [`strand`]: compare the manifest context with the reference to decide
//!    whether the probe alleles must be flipped
//! 3. [`alleles`]: place the resolved alleles into REF/ALT index space
//! 4. [`assembler`]: map each sample's calls to a genotype and build the row
//!
//! [`engine`] wires the steps to a [`RecordSink`](crate::output::RecordSink).

use thiserror::Error;

use crate::output::OutputError;
use crate::parsing::reference::ReferenceError;
use crate::parsing::ParseError;

pub mod alleles;
pub mod assembler;
pub mod engine;
pub mod strand;
pub mod sync;

pub use assembler::AssemblyError;
pub use engine::{convert, convert_files, ConversionConfig, ConversionEngine, ConversionSummary};
pub use sync::SyncError;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Duplicate sample name '{0}'")]
    DuplicateSample(String),
}
