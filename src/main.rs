mod cli;
mod config;
mod convert;
mod irf_cmd;
mod logging;
mod loglik_cmd;
mod mode_cmd;
mod output;
mod solve_cmd;

use std::process;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Solve(args) => solve_cmd::run(args),
        Command::Irf(args) => irf_cmd::run(args),
        Command::Loglik(args) => loglik_cmd::run(args),
        Command::Mode(args) => mode_cmd::run(args),
    }
}
