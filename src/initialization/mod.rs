//! Application initialization.
//!
//! This module provides the start-of-run setup steps:
//! - Logger configuration
//! - Ingest tool discovery
//! - Auxiliary service pre-flight check

mod logger;
mod preflight;
mod tool;

// Re-export public API
pub use logger::init_logger_with;
pub use preflight::{Preflight, RedisPreflight};
pub use tool::locate_ingest_tool;
