//! Main application modules.
//!
//! This module provides progress logging, shutdown signal handling, and
//! statistics printing used by the pipeline and the binary.

pub mod logging;
pub mod shutdown;
pub mod statistics;

// Re-export public API
pub use logging::log_progress;
pub use shutdown::wait_for_shutdown_signal;
pub use statistics::{print_error_statistics, print_run_summary};
