//! Configuration types.
//!
//! This module defines the run configuration (deserialized from the JSON
//! configuration file) and the logging enums shared with the CLI.

use std::path::PathBuf;

use clap::ValueEnum;
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;

use crate::config::constants::*;
use crate::error_handling::ConfigError;
use crate::ingest::IngestSettings;
use crate::pipeline::PipelineSettings;
use crate::source::DocumentQuery;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Run configuration.
///
/// Every key is optional in the configuration file; missing keys keep the
/// defaults below. Keys use camelCase (`chunkSize`, `solrUrl`, ...).
///
/// # Examples
///
/// ```no_run
/// use reindexer::Config;
///
/// let config = Config {
///     password: "secret".to_string(),
///     chunk_size: 5_000,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Hostname of the PostgreSQL server
    pub host: String,

    /// Port the PostgreSQL server listens on
    pub port: u16,

    /// Database name
    pub database: String,

    /// Database user
    pub user: String,

    /// Database password (required)
    pub password: String,

    /// Number of documents in each batch
    pub chunk_size: usize,

    /// Base URL of the Solr collection
    pub solr_url: String,

    /// URL of the Redis instance used for authority processing
    pub redis_url: String,

    /// Whether the ingest tool performs authority processing
    pub authorities: bool,

    /// Number of concurrent ingest workers
    pub workers: usize,

    /// Document id to resume from when processing partial results
    pub start_id: Option<String>,

    /// Path of the single-instance lock file
    pub lock_file: PathBuf,

    /// Directory for batch files (system temp dir when unset)
    pub batch_dir: Option<PathBuf>,

    /// Name or path of the ingest tool
    pub ingest_tool: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_DB_HOST.to_string(),
            port: DEFAULT_DB_PORT,
            database: DEFAULT_DB_NAME.to_string(),
            user: DEFAULT_DB_USER.to_string(),
            password: String::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            solr_url: DEFAULT_SOLR_URL.to_string(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            authorities: true,
            workers: default_workers(),
            start_id: None,
            lock_file: PathBuf::from(DEFAULT_LOCK_FILE),
            batch_dir: None,
            ingest_tool: DEFAULT_INGEST_TOOL.to_string(),
        }
    }
}

/// Number of CPUs available to this process (at least 1).
pub fn available_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// One worker per CPU, leaving one CPU for the exporter.
fn default_workers() -> usize {
    available_cpus().saturating_sub(1).max(1)
}

impl Config {
    /// Checks value ranges and required settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&self.chunk_size) {
            return Err(ConfigError::Invalid(format!(
                "chunkSize should be between {} and {}",
                MIN_CHUNK_SIZE, MAX_CHUNK_SIZE
            )));
        }

        let cpus = available_cpus();
        if self.workers < 1 || self.workers > cpus {
            return Err(ConfigError::Invalid(format!(
                "workers must be between 1 and {}",
                cpus
            )));
        }

        if self.password.is_empty() {
            return Err(ConfigError::Invalid(
                "configuration does not contain password (database)".to_string(),
            ));
        }

        if self.solr_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "configuration does not contain solrUrl".to_string(),
            ));
        }

        if self.authorities && self.redis_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "authorities is enabled but configuration does not contain redisUrl".to_string(),
            ));
        }

        if self.ingest_tool.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "configuration does not contain ingestTool".to_string(),
            ));
        }

        Ok(())
    }

    /// The resume point, treating an empty string as unset.
    pub fn start_id(&self) -> Option<&str> {
        self.start_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Connection options for the document database.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }

    /// Database URL with credentials redacted, for logs and error messages.
    pub fn display_database_url(&self) -> String {
        format!(
            "postgres://[USER]:[REDACTED]@{}:{}/{}",
            self.host, self.port, self.database
        )
    }

    pub fn document_query(&self) -> DocumentQuery {
        DocumentQuery::from_start_id(self.start_id())
    }

    pub fn ingest_settings(&self) -> IngestSettings {
        IngestSettings {
            solr_url: self.solr_url.clone(),
            authorities: self.authorities,
            redis_url: self.redis_url.clone(),
        }
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            chunk_size: self.chunk_size,
            workers: self.workers,
            lock_file: self.lock_file.clone(),
            batch_dir: self
                .batch_dir
                .clone()
                .unwrap_or_else(std::env::temp_dir),
        }
    }
}
