//! Configuration constants.
//!
//! Defaults and fixed operational parameters of the export/ingest pipeline.

use std::time::Duration;

/// Configuration file read when no path is given on the command line.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Marker file guarding against concurrent runs.
pub const DEFAULT_LOCK_FILE: &str = "reindex.lock";

/// External indexing tool invoked once per batch.
pub const DEFAULT_INGEST_TOOL: &str = "argot";

// Database defaults
pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_DB_NAME: &str = "shrindex";
pub const DEFAULT_DB_USER: &str = "shrindex";

// Search engine / auxiliary service defaults
pub const DEFAULT_SOLR_URL: &str = "http://localhost:8983/solr/trlnbib";
pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379/0";

// Chunking
/// Documents per batch unless configured otherwise
pub const DEFAULT_CHUNK_SIZE: usize = 20_000;
pub const MIN_CHUNK_SIZE: usize = 10;
pub const MAX_CHUNK_SIZE: usize = 100_000;

// Queues
/// Capacity of the sealed-batch queue between the exporter and the workers.
/// Kept small so the exporter can never run more than a couple of batches
/// ahead of ingestion.
pub const DISPATCH_QUEUE_CAPACITY: usize = 2;
/// Capacity of the per-batch failure queue drained by the error collector
pub const ERROR_QUEUE_CAPACITY: usize = 300;

// Batch files
pub const BATCH_FILE_PREFIX: &str = "reindex-batch.";
pub const BATCH_FILE_SUFFIX: &str = ".json";

/// Upper bound on the Redis PING round trip during the pre-flight check
pub const PREFLIGHT_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum characters of ingest tool output kept in an error
pub const MAX_INGEST_OUTPUT_CHARS: usize = 4000;
