//! Batch ingestion.
//!
//! Each sealed batch is handed to an [`Ingester`] exactly once. Failures are
//! returned as [`IngestError`] and recorded by the pipeline; they never stop
//! the run and are never retried here.

mod command;

use std::ffi::OsString;
use std::path::Path;

use async_trait::async_trait;

use crate::error_handling::IngestError;

pub use command::CommandIngester;

/// Loads one batch file into the search engine.
#[async_trait]
pub trait Ingester: Send + Sync {
    async fn ingest(&self, batch: &Path) -> Result<(), IngestError>;
}

/// Settings passed through to the ingest tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestSettings {
    /// Base URL of the Solr collection
    pub solr_url: String,
    /// Enables authority processing in the ingest tool
    pub authorities: bool,
    /// Redis URL used by authority processing
    pub redis_url: String,
}

impl IngestSettings {
    /// Tool arguments for ingesting `batch`:
    /// `ingest [-a --redis-url <url>] -s <solr url> <batch>`.
    pub fn arguments(&self, batch: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["ingest".into()];
        if self.authorities {
            args.push("-a".into());
            args.push("--redis-url".into());
            args.push(self.redis_url.clone().into());
        }
        args.push("-s".into());
        args.push(self.solr_url.clone().into());
        args.push(batch.as_os_str().to_owned());
        args
    }
}
