//! Binary crate for the `weather-lookup` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Driving the lookup controller from a terminal prompt
//! - Human-friendly output formatting

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod terminal;

/// Logs go to stderr so they never mix with printed results.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_lookup=info,lookup_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
