//! reindexer library: chunked export from PostgreSQL and concurrent ingest
//!
//! This library reads every live document from the document database in id
//! order, writes the documents into size-bounded batch files, and hands each
//! batch to an external ingest tool that loads it into Solr. Ingest runs on a
//! fixed pool of workers while the export continues; a small dispatch queue
//! keeps the export at most a couple of batches ahead.
//!
//! # Example
//!
//! ```no_run
//! use reindexer::{run_reindex, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     password: "secret".to_string(),
//!     chunk_size: 10_000,
//!     ..Default::default()
//! };
//!
//! let report = run_reindex(config).await?;
//! println!("{}", report.summary_line());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

mod app;
pub mod batch;
pub mod config;
pub mod error_handling;
pub mod ingest;
pub mod initialization;
pub mod lock;
pub mod pipeline;
pub mod source;

// Re-export public API
pub use app::{print_run_summary, wait_for_shutdown_signal};
pub use config::{Config, LogFormat, LogLevel, Opt};
pub use error_handling::PipelineError;
pub use pipeline::{PipelineCoordinator, PipelineSettings, RunOutcome, RunReport};
pub use run::run_reindex;

// Internal run module (wires the real collaborators into the pipeline)
mod run {
    use std::sync::Arc;

    use anyhow::{Context, Result};
    use log::info;

    use crate::app::print_run_summary;
    use crate::config::Config;
    use crate::ingest::CommandIngester;
    use crate::initialization::{locate_ingest_tool, RedisPreflight};
    use crate::pipeline::{PipelineCoordinator, RunReport};
    use crate::source::{PgSource, RowSource};

    /// Runs a full reindex with the provided configuration.
    ///
    /// Resolves the ingest tool, then exports every document selected by the
    /// configuration and ingests it in batches. Batches that fail to ingest
    /// do not make this function fail; inspect [`RunReport::outcome`].
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The configuration is invalid
    /// - The ingest tool cannot be found
    /// - Another run holds the lock file
    /// - The Redis pre-flight check fails (when `authorities` is enabled)
    /// - Reading from the database or writing a batch file fails
    pub async fn run_reindex(config: Config) -> Result<RunReport> {
        config.validate().context("Invalid configuration")?;
        let tool = locate_ingest_tool(&config.ingest_tool)?;

        info!(
            "Start ID: {}",
            config.start_id().unwrap_or("(none, exporting all documents)")
        );
        info!("Database: {}", config.display_database_url());
        info!("Solr: {}", config.solr_url);

        let source = PgSource::connect_lazy(config.connect_options(), config.document_query());
        info!("Source: {}", source.describe());

        let ingester = Arc::new(CommandIngester::new(tool, config.ingest_settings()));
        let mut coordinator = PipelineCoordinator::new(config.pipeline_settings(), ingester);
        if config.authorities {
            coordinator =
                coordinator.with_preflight(Box::new(RedisPreflight::new(config.redis_url.as_str())));
        }

        let result = coordinator.run(&source).await;
        source.close().await;

        let report = result.context("Reindex aborted")?;
        print_run_summary(&report);
        Ok(report)
    }
}
