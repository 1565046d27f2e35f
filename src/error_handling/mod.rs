//! Error handling and processing statistics.
//!
//! This module provides:
//! - Fatal error types for initialization, configuration, locking, batch I/O,
//!   the row source, and the pipeline as a whole
//! - The per-batch ingest failure type, which is recorded rather than raised
//! - Processing statistics tracking (failure categories and info counters)

mod stats;
mod types;

// Re-export public API
pub use stats::ProcessingStats;
pub use types::{
    BatchError, ConfigError, ErrorType, InfoType, IngestError, InitializationError, LockError,
    PipelineError, PreflightError, SourceError,
};
