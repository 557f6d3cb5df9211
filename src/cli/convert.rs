//! Convert command - merge per-sample genotype reports into one VCF.

use std::path::PathBuf;

use clap::Args;

use crate::cli::OutputFormat;
use crate::convert::engine::{convert_files, ConversionConfig, ConversionPaths, ConversionSummary};
use crate::convert::strand::StrandThresholds;
use crate::core::types::SyncMode;

/// Arguments for the convert command
#[derive(Args)]
pub struct ConvertArgs {
    /// GenomeStudio report file, named by sample. Repeat or give a
    /// comma-separated list; the order sets the sample columns
    #[arg(short = 'r', long = "report", required = true, value_delimiter = ',', num_args = 1..)]
    pub reports: Vec<PathBuf>,

    /// Array manifest (.csv, optionally gzipped)
    #[arg(short, long)]
    pub manifest: PathBuf,

    /// Reference FASTA for the genome build of the reports.
    /// Uses <fasta>.fai for random access when present
    #[arg(short = 'R', long)]
    pub reference: PathBuf,

    /// Output VCF; `-` for stdout, a .gz suffix writes gzip
    #[arg(short, long, default_value = "-")]
    pub output: PathBuf,

    /// How report records are matched to manifest probes
    #[arg(long, value_enum, default_value_t = SyncMode::IndexFree)]
    pub mode: SyncMode,

    /// Look probes up by name; same as `--mode map`. Use for out of order data
    #[arg(long, conflicts_with = "mode")]
    pub hash: bool,

    /// Do not log data-quality warnings
    #[arg(long)]
    pub suppress_warnings: bool,
}

impl ConvertArgs {
    fn config(&self) -> ConversionConfig {
        ConversionConfig {
            mode: if self.hash { SyncMode::Map } else { self.mode },
            suppress_warnings: self.suppress_warnings,
            thresholds: StrandThresholds::default(),
        }
    }
}

/// Execute the convert command
///
/// # Errors
///
/// Returns an error if an input cannot be read or the conversion hits a fatal
/// condition.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: ConvertArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = args.config();
    if verbose {
        eprintln!(
            "Converting {} sample(s) in {} mode",
            args.reports.len(),
            config.mode
        );
    }

    let paths = ConversionPaths {
        reports: args.reports,
        manifest: args.manifest,
        reference: args.reference,
        output: args.output,
    };
    let summary = convert_files(&paths, config)?;

    match format {
        OutputFormat::Text => print_text_summary(&summary),
        OutputFormat::Json => eprintln!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Tsv => print_tsv_summary(&summary),
    }
    Ok(())
}

fn summary_rows(summary: &ConversionSummary) -> [(&'static str, u64); 9] {
    [
        ("samples", summary.samples as u64),
        ("manifest_records", summary.manifest_records),
        ("written", summary.written),
        ("dropped", summary.dropped),
        ("not_found", summary.not_found),
        ("context_mismatches", summary.context_mismatches),
        ("reference_mismatches", summary.reference_mismatches),
        ("mito_excluded", summary.mito_excluded),
        ("duplicate_names", summary.duplicate_names),
    ]
}

// The VCF may be streaming to stdout, so summaries go to stderr
fn print_text_summary(summary: &ConversionSummary) {
    eprintln!(
        "Wrote {} of {} manifest records for {} sample(s)",
        summary.written, summary.manifest_records, summary.samples
    );
    if summary.dropped > 0 {
        eprintln!("   Dropped (not reported by first sample): {}", summary.dropped);
    }
    if summary.not_found > 0 {
        eprintln!("   Not found in manifest: {}", summary.not_found);
    }
    if summary.context_mismatches > 0 {
        eprintln!("   Context mismatches: {}", summary.context_mismatches);
    }
    if summary.reference_mismatches > 0 {
        eprintln!("   Reference base not a probe allele: {}", summary.reference_mismatches);
    }
    if summary.mito_excluded > 0 {
        eprintln!("   Mitochondrial excluded: {}", summary.mito_excluded);
    }
    if summary.duplicate_names > 0 {
        eprintln!("   Duplicate manifest names ignored: {}", summary.duplicate_names);
    }
}

fn print_tsv_summary(summary: &ConversionSummary) {
    eprintln!("metric\tvalue");
    for (metric, value) in summary_rows(summary) {
        eprintln!("{metric}\t{value}");
    }
}
