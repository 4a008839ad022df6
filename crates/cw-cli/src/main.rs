use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

mod cli;
mod commands;

fn main() -> anyhow::Result<ExitCode> {
    let cli = cli::Cli::parse();
    let level = if cli.verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();
    commands::run_command(cli)
}
