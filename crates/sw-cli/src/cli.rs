//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Stepwise - apply numbered SQL scripts to a database, one transaction each
#[derive(Parser, Debug)]
#[command(name = "sw")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands.
///
/// Values given here override `stepwise.yml`.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: PathBuf,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Migration source URL (file://<dir>)
    #[arg(long, global = true, env = "STEPWISE_SOURCE")]
    pub source: Option<String>,

    /// Database URL (sqlite://, duckdb://, postgres://, sqlserver://)
    #[arg(long, global = true, env = "STEPWISE_DATABASE")]
    pub database: Option<String>,

    /// Schema holding the version table
    #[arg(long, global = true, env = "STEPWISE_SCHEMA")]
    pub schema: Option<String>,

    /// Name of the version table
    #[arg(long, global = true)]
    pub table: Option<String>,

    /// Glob pattern selecting migration scripts
    #[arg(long, global = true)]
    pub pattern: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply all pending migrations
    Up(UpArgs),

    /// Print the current database version
    Version,

    /// Show the current version and pending migrations
    Status,
}

/// Arguments for the up command
#[derive(Args, Debug, Default)]
pub struct UpArgs {
    /// List the migrations that would be applied without applying them
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
