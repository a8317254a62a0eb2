//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `common` - Shared utilities (config resolution, pipeline runs)
//! - `export` - Forecast CSV export
//! - `forecast` - Forecast report
//! - `serve` - Web server command
//! - `series` - Daily series listing

pub mod common;
pub mod export;
pub mod forecast;
pub mod serve;
pub mod series;

// Re-export command functions for main.rs
pub use common::*;
pub use export::*;
pub use forecast::*;
pub use serve::*;
pub use series::*;
