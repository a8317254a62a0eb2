//! Spendcast CLI - Daily expense forecasting
//!
//! Usage:
//!   spendcast forecast --file CSV    Fit the model and print the forecast
//!   spendcast series --file CSV      Show the aggregated daily series
//!   spendcast export --file CSV      Export the forecast table as CSV
//!   spendcast serve --file CSV       Start the API server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Forecast {
            file,
            horizon,
            confidence,
            json,
        } => {
            let config = commands::resolve_config(cli.config.as_deref(), horizon, confidence)?;
            commands::cmd_forecast(&file, config, json)
        }
        Commands::Series { file, limit } => commands::cmd_series(&file, limit),
        Commands::Export {
            file,
            horizon,
            output,
        } => {
            let config = commands::resolve_config(cli.config.as_deref(), horizon, None)?;
            commands::cmd_export(&file, config, output.as_deref())
        }
        Commands::Serve {
            file,
            port,
            host,
            allow_origins,
        } => {
            let config = commands::resolve_config(cli.config.as_deref(), None, None)?;
            commands::cmd_serve(&file, config, &host, port, allow_origins).await
        }
    }
}
