//! Error type definitions.
//!
//! This module defines the fatal error types of a run and the categories
//! used to tally per-batch failures.

use std::io;
use std::path::PathBuf;

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// The ingest tool could not be resolved.
    #[error("'{0}' binary not found on path")]
    ToolNotFoundError(String),
}

/// Errors loading or validating the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unable to read configuration file {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("unable to parse configuration file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{0}")]
    Invalid(String),
}

/// Errors acquiring or releasing the single-instance lock.
#[derive(Error, Debug)]
pub enum LockError {
    /// The lock file exists; another run may be active.
    #[error(
        "{} exists{}, which may indicate another instance is already running. \
         If that process is still alive, stop it first; otherwise remove the file \
         manually before starting a new run",
        .path.display(),
        .pid.map(|pid| format!(" (held by PID {pid})")).unwrap_or_default()
    )]
    AlreadyHeld { path: PathBuf, pid: Option<u32> },

    #[error("unable to create lock file {}: {source}", .path.display())]
    Create { path: PathBuf, source: io::Error },

    #[error("unable to remove lock file {}: {source}", .path.display())]
    Remove { path: PathBuf, source: io::Error },
}

/// Errors writing batch files. Always fatal to the run.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("unable to open new batch file in {}: {source}", .dir.display())]
    Create { dir: PathBuf, source: io::Error },

    #[error("unable to write to batch file {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("unable to seal batch file {}: {source}", .path.display())]
    Seal { path: PathBuf, source: io::Error },
}

/// Errors reading documents from the row source.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Read(String),
}

/// Failure of a single ingest invocation. Recorded, never fatal.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("unable to launch ingest tool for {}: {source}", .batch.display())]
    Spawn { batch: PathBuf, source: io::Error },

    #[error("ingest of {} failed ({status})", .batch.display())]
    Failed {
        batch: PathBuf,
        status: String,
        output: String,
    },

    #[error("ingest of {} panicked: {message}", .batch.display())]
    Panicked { batch: PathBuf, message: String },
}

impl IngestError {
    /// The category this failure is tallied under.
    pub fn error_type(&self) -> ErrorType {
        match self {
            IngestError::Spawn { .. } => ErrorType::IngestSpawnError,
            IngestError::Failed { .. } => ErrorType::IngestExitError,
            IngestError::Panicked { .. } => ErrorType::IngestPanicError,
        }
    }
}

/// Errors from the auxiliary-service reachability check.
#[derive(Error, Debug)]
pub enum PreflightError {
    #[error("unable to connect to {target}: {reason}")]
    Unreachable { target: String, reason: String },

    #[error("{target} did not answer within {secs}s")]
    Timeout { target: String, secs: u64 },
}

/// Fatal pipeline errors. Any of these aborts the run after the lock is released.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Lock(#[from] LockError),

    #[error("pre-flight check failed: {0}")]
    Preflight(#[from] PreflightError),

    #[error("error reading documents: {0}")]
    Source(#[from] SourceError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error("dispatch queue closed while the exporter was still producing batches")]
    DispatchClosed,

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl PipelineError {
    /// True when the run was refused because another instance holds the lock.
    pub fn is_lock_contention(&self) -> bool {
        matches!(self, PipelineError::Lock(LockError::AlreadyHeld { .. }))
    }
}

/// Categories of per-batch failures.
///
/// None of these stop the run; they only affect the final summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
#[allow(clippy::enum_variant_names)]
pub enum ErrorType {
    /// Ingest tool exited with a failure status
    IngestExitError,
    /// Ingest tool could not be started
    IngestSpawnError,
    /// Ingest call panicked
    IngestPanicError,
    /// Batch file could not be deleted after ingest
    BatchCleanupError,
}

/// Informational counters for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    BatchDispatched,
    BatchIngested,
    EmptyBatchDiscarded,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::IngestExitError => "Ingest tool failure",
            ErrorType::IngestSpawnError => "Ingest tool launch failure",
            ErrorType::IngestPanicError => "Ingest panic",
            ErrorType::BatchCleanupError => "Batch file cleanup failure",
        }
    }
}

impl InfoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::BatchDispatched => "Batches dispatched",
            InfoType::BatchIngested => "Batches ingested",
            InfoType::EmptyBatchDiscarded => "Empty batches discarded",
        }
    }
}
