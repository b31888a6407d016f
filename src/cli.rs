use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// DSGE solution and likelihood engine.
#[derive(Parser)]
#[command(
    name = "dsge",
    version,
    about = "Solve, filter and estimate linearised DSGE models"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Compute the steady state and first-order solution.
    Solve(SolveArgs),
    /// Compute impulse responses of the observables.
    Irf(IrfArgs),
    /// Evaluate the log-likelihood and log posterior of the data.
    Loglik(LoglikArgs),
    /// Search for the posterior mode.
    Mode(ModeArgs),
}

/// Arguments shared by every subcommand.
#[derive(clap::Args)]
pub struct CommonArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "dsge.toml")]
    pub config: PathBuf,

    /// Write JSON output to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `solve` subcommand.
#[derive(clap::Args)]
pub struct SolveArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for the `irf` subcommand.
#[derive(clap::Args)]
pub struct IrfArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Number of periods after impact.
    #[arg(long, default_value_t = 40)]
    pub horizon: usize,

    /// Restrict output to one shock (by name).
    #[arg(long)]
    pub shock: Option<String>,
}

/// Arguments for the `loglik` subcommand.
#[derive(clap::Args)]
pub struct LoglikArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Override the data file from config.
    #[arg(short, long)]
    pub data: Option<PathBuf>,
}

/// Arguments for the `mode` subcommand.
#[derive(clap::Args)]
pub struct ModeArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Override the data file from config.
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Override the iteration cap from config.
    #[arg(long)]
    pub max_iterations: Option<u64>,
}
