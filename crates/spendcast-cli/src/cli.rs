//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Spendcast - Forecast your daily spending
#[derive(Parser)]
#[command(name = "spendcast")]
#[command(about = "Daily expense forecasting from a transaction ledger", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Forecast config file (TOML)
    ///
    /// Defaults to ~/.local/share/spendcast/config/forecast.toml when present,
    /// otherwise the built-in defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fit the model and print the forecast
    Forecast {
        /// CSV ledger with a date and an amount column
        #[arg(short, long)]
        file: PathBuf,

        /// Days to forecast (7-90)
        #[arg(long, value_parser = clap::value_parser!(u64).range(7..=90))]
        horizon: Option<u64>,

        /// Confidence level for the forecast band, e.g. 0.95
        #[arg(long, value_parser = parse_confidence)]
        confidence: Option<f64>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the aggregated daily expense series
    Series {
        /// CSV ledger with a date and an amount column
        #[arg(short, long)]
        file: PathBuf,

        /// Number of most recent days to show
        #[arg(short, long, default_value = "30")]
        limit: usize,
    },

    /// Export the forecast table as CSV
    Export {
        /// CSV ledger with a date and an amount column
        #[arg(short, long)]
        file: PathBuf,

        /// Days to forecast (7-90)
        #[arg(long, value_parser = clap::value_parser!(u64).range(7..=90))]
        horizon: Option<u64>,

        /// Output file (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start the web server
    Serve {
        /// CSV ledger served by the API (re-read on every request)
        #[arg(short, long)]
        file: PathBuf,

        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Allow cross-origin requests from this origin (repeatable)
        #[arg(long = "allow-origin", value_name = "URL")]
        allow_origins: Vec<String>,
    },
}

fn parse_confidence(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a number", s))?;
    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err("confidence must be between 0 and 1 (exclusive)".to_string())
    }
}
