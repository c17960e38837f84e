//! vcxproj-migrate: moves a Rhino C++ plug-in folder from the Rhino 5 SDK to
//! the Rhino 6 SDK in place.

mod cli;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> Result<ExitCode> {
    let cli = cli::Cli::parse();

    // RUST_LOG wins over --log-level.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();

    cli::run(cli)
}
