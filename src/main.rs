use array_vcf::cli;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag; stdout is reserved for VCF
    let filter = if cli.verbose {
        EnvFilter::new("array_vcf=debug,info")
    } else {
        EnvFilter::new("array_vcf=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Convert(args) => {
            cli::convert::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::SwapBafLrr(args) => {
            cli::swap::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::ReformatAffy(args) => {
            cli::affy::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
