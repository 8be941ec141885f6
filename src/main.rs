//! Application entry point.
//!
//! Parses command-line arguments and delegates execution to [`runner::run`].

use clap::Parser;
use flif_configure::{
    cli::Cli,
    runner::{self, Environment, RunnerError},
};
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let max_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::ERROR
    };
    fmt()
        .with_max_level(max_level)
        .with_writer(io::stderr)
        .init();
    let stdout = io::stdout();
    match runner::run(&cli, &Environment::capture(), &mut stdout.lock()) {
        Ok(outcome) => {
            tracing::debug!(units = outcome.units, "generation finished");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "runner failed");
            report(err);
            ExitCode::FAILURE
        }
    }
}

fn report(err: RunnerError) {
    let diagnostic = miette::Report::new(err);
    if let Err(write_err) = writeln!(io::stderr(), "{diagnostic:?}") {
        tracing::error!(error = %write_err, "failed to print diagnostic");
    }
}
