//! Command-line options.

use std::path::PathBuf;

use clap::Parser;

use super::constants::DEFAULT_CONFIG_FILE;
use super::types::{Config, LogFormat, LogLevel};

/// Command-line options for the `reindexer` binary.
///
/// Everything about the run itself lives in the configuration file; the
/// flags here only select the file, control logging, and override a few
/// per-run values.
#[derive(Debug, Parser)]
#[command(
    name = "reindexer",
    version,
    about = "Exports documents from PostgreSQL in batches and ingests them into Solr"
)]
pub struct Opt {
    /// Path to the JSON configuration file
    #[arg(value_name = "CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value = "plain")]
    pub log_format: LogFormat,

    /// Resume from this document id (overrides `startId`)
    #[arg(long)]
    pub start_id: Option<String>,

    /// Number of ingest workers (overrides `workers`)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Documents per batch (overrides `chunkSize`)
    #[arg(long)]
    pub chunk_size: Option<usize>,
}

impl Opt {
    /// Applies command-line overrides on top of a loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(start_id) = &self.start_id {
            config.start_id = Some(start_id.clone());
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = chunk_size;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opt = Opt::try_parse_from(["reindexer"]).expect("no args is valid");
        assert_eq!(opt.config, PathBuf::from("config.json"));
        assert!(matches!(opt.log_level, LogLevel::Info));
        assert!(matches!(opt.log_format, LogFormat::Plain));
        assert!(opt.start_id.is_none());
    }

    #[test]
    fn test_overrides_applied() {
        let opt = Opt::try_parse_from([
            "reindexer",
            "prod.json",
            "--start-id",
            "UNCb9",
            "--workers",
            "2",
            "--chunk-size",
            "100",
        ])
        .expect("valid args");
        assert_eq!(opt.config, PathBuf::from("prod.json"));

        let mut config = Config::default();
        opt.apply_overrides(&mut config);
        assert_eq!(config.start_id(), Some("UNCb9"));
        assert_eq!(config.workers, 2);
        assert_eq!(config.chunk_size, 100);
    }

    #[test]
    fn test_no_overrides_leave_config_alone() {
        let opt = Opt::try_parse_from(["reindexer"]).expect("no args is valid");
        let mut config = Config {
            workers: 1,
            chunk_size: 42,
            ..Default::default()
        };
        opt.apply_overrides(&mut config);
        assert_eq!(config.workers, 1);
        assert_eq!(config.chunk_size, 42);
    }

    #[test]
    fn test_invalid_log_format_rejected() {
        assert!(Opt::try_parse_from(["reindexer", "--log-format", "xml"]).is_err());
    }
}
