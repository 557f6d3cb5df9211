//! # array-vcf
//!
//! A library for converting SNP microarray genotype reports into VCF.
//!
//! Array vendors describe each probe in a manifest using their own strand
//! convention (TOP/BOT), and genotyping software reports calls per sample in
//! one of several tabular layouts. Neither says which allele is the reference.
//!
//! `array-vcf` anchors every probe to a reference FASTA and merges any number
//! of sample reports into one multi-sample VCF.
//!
//! ## Features
//!
//! - **Strand resolution**: matches the manifest's flanking sequence against
//!   the reference to decide whether probe alleles must be flipped
//! - **Allele harmonization**: places the probe's A/B alleles into REF/ALT
//!   index space
//! - **Lockstep merging**: pulls sample reports in manifest order, or looks
//!   probes up by name for out-of-order data
//! - **Schema detection**: recognizes manifest and report layouts from their
//!   header lines
//!
//! ## Example
//!
//! ```rust,no_run
//! use array_vcf::convert::{convert, ConversionConfig};
//! use std::path::{Path, PathBuf};
//!
//! let summary = convert(
//!     &[PathBuf::from("NA12878.txt")],
//!     Path::new("GSA-24v3-0_A1.csv"),
//!     Path::new("hg38.fa"),
//!     Path::new("NA12878.vcf.gz"),
//!     ConversionConfig::default(),
//! )
//! .unwrap();
//!
//! println!("{} records written", summary.written);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Probe, observation and output record types
//! - [`parsing`]: Manifest, report and reference readers
//! - [`convert`]: Strand resolution, harmonization and stream synchronization
//! - [`output`]: VCF writing, the BAF/LRR swap and the Affymetrix reformatter
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod convert;
pub mod core;
pub mod output;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use convert::{ConversionConfig, ConversionEngine, ConversionSummary, ConvertError};
pub use core::manifest::ManifestRecord;
pub use core::record::OutputRecord;
pub use core::report::ReportRecord;
pub use core::types::*;
