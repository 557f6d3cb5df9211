//! Reformat-affy command - rewrite an Affymetrix VCF as GT:BAF:LRR.

use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use clap::Args;

use crate::cli::OutputFormat;
use crate::output::affy::reformat_affy;
use crate::output::OutputTarget;
use crate::parsing::open_text;

/// Arguments for the reformat-affy command
#[derive(Args)]
pub struct AffyArgs {
    /// Affymetrix VCF whose FORMAT carries GT, BAF and LRR (plain or gzip);
    /// `-` for stdin
    pub input: PathBuf,

    /// Output VCF; `-` for stdout, a .gz suffix writes gzip
    #[arg(short, long, default_value = "-")]
    pub output: PathBuf,
}

/// Execute the reformat-affy command
///
/// # Errors
///
/// Returns an error if the input cannot be read or a record's FORMAT lacks
/// GT, BAF or LRR.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: AffyArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let reader: Box<dyn BufRead> = if args.input.as_os_str() == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        open_text(&args.input)?
    };

    let mut target = OutputTarget::create(&args.output)?;
    let summary = reformat_affy(reader, &mut target)?;
    target.finish()?;

    match format {
        OutputFormat::Json => eprintln!(
            "{}",
            serde_json::json!({
                "records": summary.records,
                "missing_rs_id": summary.missing_rs_id,
            })
        ),
        OutputFormat::Tsv => {
            eprintln!("metric\tvalue");
            eprintln!("records\t{}", summary.records);
            eprintln!("missing_rs_id\t{}", summary.missing_rs_id);
        }
        OutputFormat::Text if verbose => eprintln!(
            "Reformatted {} records ({} without an rsID)",
            summary.records, summary.missing_rs_id
        ),
        OutputFormat::Text => {}
    }
    Ok(())
}
