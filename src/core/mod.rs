//! Core data types for array-to-VCF conversion.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`ManifestRecord`]: One probe from the array manifest
//! - [`ReportRecord`]: One sample's observation for one probe
//! - [`OutputRecord`]: One assembled VCF row
//! - [`Strand`], [`SyncMode`]: Strand convention and stream alignment policy
//!
//! ## Chromosome Naming
//!
//! Manifests and reports do not agree on naming. All comparisons go through
//! [`chrom::normalize_chromosome`]:
//!
//! | Source | Chromosome 1 | Pseudoautosomal | Mitochondrial |
//! |--------|--------------|-----------------|---------------|
//! | Manifest | 1 | XY | MT |
//! | Report | 1 | XY | MT |
//! | Output | chr1 | chrX | excluded |
//!
//! [`ManifestRecord`]: manifest::ManifestRecord
//! [`ReportRecord`]: report::ReportRecord
//! [`OutputRecord`]: record::OutputRecord
//! [`Strand`]: types::Strand
//! [`SyncMode`]: types::SyncMode

pub mod chrom;
pub mod manifest;
pub mod record;
pub mod report;
pub mod sequence;
pub mod types;
