//! Swap command - exchange BAF and LRR in a converted VCF.

use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use clap::Args;

use crate::cli::OutputFormat;
use crate::output::swap::swap_baf_lrr;
use crate::output::OutputTarget;
use crate::parsing::open_text;

/// Arguments for the swap-baf-lrr command
#[derive(Args)]
pub struct SwapArgs {
    /// Input VCF with FORMAT GT:BAF:LRR (plain or gzip); `-` for stdin
    pub input: PathBuf,

    /// Output VCF; `-` for stdout, a .gz suffix writes gzip
    #[arg(short, long, default_value = "-")]
    pub output: PathBuf,
}

/// Execute the swap-baf-lrr command
///
/// # Errors
///
/// Returns an error if the input cannot be read or a record's FORMAT is not
/// `GT:BAF:LRR`.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: SwapArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let reader: Box<dyn BufRead> = if args.input.as_os_str() == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        open_text(&args.input)?
    };

    let mut target = OutputTarget::create(&args.output)?;
    let records = swap_baf_lrr(reader, &mut target)?;
    target.finish()?;

    match format {
        OutputFormat::Json => eprintln!("{}", serde_json::json!({ "records": records })),
        OutputFormat::Tsv => eprintln!("records\t{records}"),
        OutputFormat::Text if verbose => eprintln!("Swapped BAF and LRR on {records} records"),
        OutputFormat::Text => {}
    }
    Ok(())
}
