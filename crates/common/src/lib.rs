//! Scrubline Common Utilities
//!
//! Shared infrastructure for all Scrubline crates:
//! - Error types and result aliases
//! - Layout constants and configuration loading
//! - Tracing/logging initialization

pub mod config;
pub mod error;
pub mod logging;

pub use config::*;
pub use error::*;
