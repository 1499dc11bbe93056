//! dpacct - convert privacy events to and from transfer records.
//!
//! Reads serde-JSON events or transfer-record JSON from a file or stdin and
//! writes the other projection to stdout. Diagnostics go to stderr.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod output;

use commands::Cli;
use config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config.with_overrides(cli.overrides()),
        Err(e) => {
            error::print_error(&e);
            std::process::exit(1);
        }
    };

    // Prefer RUST_LOG, fall back to DPACCT_LOG_LEVEL / --log-level.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = cli.run(&config) {
        error::print_error(&e);
        std::process::exit(1);
    }

    Ok(())
}
