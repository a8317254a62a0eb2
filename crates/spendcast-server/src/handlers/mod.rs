//! HTTP request handlers organized by domain

pub mod export;
pub mod forecast;

// Re-export all handlers for use in router
pub use export::*;
pub use forecast::*;
