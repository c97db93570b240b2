//! Warden CLI
//!
//! Command-line interface for Warden role and permission administration.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;

use warden_cli::cli::Args;
use warden_cli::commands;

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = match args.verbose {
        0 => "info",
        1 => "info,warden=debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(config = ?args.config, "warden starting");
    commands::run(args.config.as_deref(), args.command)?;
    Ok(())
}
