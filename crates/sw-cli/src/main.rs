//! Stepwise CLI - apply versioned SQL migrations

use anyhow::Result;
use clap::Parser;
use env_logger::Env;

mod cli;
mod commands;

use cli::Cli;
use commands::{status, up, version};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match &cli.command {
        cli::Commands::Up(args) => up::execute(args, &cli.global),
        cli::Commands::Version => version::execute(&cli.global),
        cli::Commands::Status => status::execute(&cli.global),
    }
}

/// `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();
}
