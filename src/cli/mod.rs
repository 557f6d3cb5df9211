//! Command-line interface for array-vcf.
//!
//! - **convert**: convert genotype reports into a multi-sample VCF
//! - **swap-baf-lrr**: exchange the BAF and LRR values of a converted VCF
//! - **reformat-affy**: rewrite an Affymetrix VCF as `GT:BAF:LRR`
//!
//! ## Usage
//!
//! ```text
//! # Convert two samples against a manifest and reference
//! array-vcf convert -r NA12878.txt,NA12891.txt -m GSA-24v3-0_A1.csv -R hg38.fa -o out.vcf.gz
//!
//! # Reports not in manifest order
//! array-vcf convert -r NA12878.txt -m GSA-24v3-0_A1.csv -R hg38.fa --mode map
//!
//! # Run summary as JSON
//! array-vcf convert -r NA12878.txt -m GSA-24v3-0_A1.csv -R hg38.fa --format json
//!
//! # Fix a VCF with BAF and LRR written in the wrong order
//! array-vcf swap-baf-lrr in.vcf -o fixed.vcf
//!
//! # Bring an Affymetrix VCF into the same layout
//! array-vcf reformat-affy axiom.vcf.gz -o axiom.gtbaflrr.vcf
//! ```

use clap::{Parser, Subcommand};

pub mod affy;
pub mod convert;
pub mod swap;

#[derive(Parser)]
#[command(name = "array-vcf")]
#[command(version)]
#[command(about = "Convert SNP array genotype reports to VCF")]
#[command(
    long_about = "array-vcf converts GenomeStudio genotype reports into a reference-anchored VCF.\n\nEach probe's alleles are oriented to the reference forward strand by matching the manifest's flanking sequence against the reference, then placed into REF/ALT index space. Samples are merged in lockstep against the array manifest."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Format of the run summary
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert genotype reports to VCF
    Convert(convert::ConvertArgs),

    /// Swap the BAF and LRR values of every sample in a VCF
    SwapBafLrr(swap::SwapArgs),

    /// Rewrite an Affymetrix VCF with rsID identifiers and GT:BAF:LRR samples
    ReformatAffy(affy::AffyArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
