//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (queue capacities, defaults, limits)
//! - The JSON-backed run configuration and its validation
//! - CLI option types and parsing

mod cli;
mod constants;
mod file;
mod types;

// Re-export all constants
pub use cli::Opt;
pub use constants::*;
pub use types::{available_cpus, Config, LogFormat, LogLevel};
