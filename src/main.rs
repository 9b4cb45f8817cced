use anyhow::Result;
use cli::{Cli, Commands};
use config::Configuration;
use std::process::ExitCode;

mod cli;
mod config;
mod generate;
mod markdown;
mod sinks;
mod title;

fn main() -> ExitCode {
    if let Err(e) = try_main() {
        eprintln!("{}: {e:#}", console::style("Error").red());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn try_main() -> Result<()> {
    use clap::Parser;
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Configuration::load(cli.config.as_deref())?;

    match &cli.command {
        Commands::Generate(args) => generate::run(args, &config),
    }
}

/// Send `log` records to stderr; `RUST_LOG` overrides the `-v` count.
fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
