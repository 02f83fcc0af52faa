//! swarm-rs command-line entry point.

#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use swarm_rs::cli::{Cli, execute};

#[allow(clippy::print_stdout)]
fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("swarm_rs=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "swarm_rs=info".into())
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let output = execute(&cli)?;
    print!("{output}");
    Ok(())
}
