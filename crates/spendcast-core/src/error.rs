//! Error types for Spendcast

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unable to parse {column} '{value}' on line {line}")]
    Parse {
        line: u64,
        column: String,
        value: String,
    },

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("No transactions found in input")]
    EmptyInput,

    #[error("Insufficient data: need at least {required} daily observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Model fit did not converge: {0}")]
    FitConvergence(String),

    #[error("Forecast is empty: horizon must be positive")]
    EmptyForecast,

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
