//! Ingestion through an external command.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use log::{debug, info};
use tokio::process::Command;

use crate::config::MAX_INGEST_OUTPUT_CHARS;
use crate::error_handling::IngestError;

use super::{IngestSettings, Ingester};

/// Runs the ingest tool once per batch and captures its combined output.
///
/// The child is killed if the ingest future is dropped, so aborting a run
/// does not leave orphaned tool processes behind.
#[derive(Debug, Clone)]
pub struct CommandIngester {
    program: PathBuf,
    settings: IngestSettings,
}

impl CommandIngester {
    pub fn new(program: impl Into<PathBuf>, settings: IngestSettings) -> Self {
        CommandIngester {
            program: program.into(),
            settings,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl Ingester for CommandIngester {
    async fn ingest(&self, batch: &Path) -> Result<(), IngestError> {
        debug!("Ingesting {}", batch.display());
        let output = Command::new(&self.program)
            .args(self.settings.arguments(batch))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| IngestError::Spawn {
                batch: batch.to_path_buf(),
                source,
            })?;

        let combined = combine_output(&output.stdout, &output.stderr);
        if output.status.success() {
            if !combined.is_empty() {
                debug!("[{}] ingest output: {}", batch.display(), combined);
            }
            return Ok(());
        }

        if !combined.is_empty() {
            info!("[{}] ingest output: {}", batch.display(), combined);
        }
        Err(IngestError::Failed {
            batch: batch.to_path_buf(),
            status: output.status.to_string(),
            output: truncate(combined, MAX_INGEST_OUTPUT_CHARS),
        })
    }
}

fn combine_output(stdout: &[u8], stderr: &[u8]) -> String {
    let stdout = String::from_utf8_lossy(stdout);
    let stderr = String::from_utf8_lossy(stderr);
    match (stdout.trim(), stderr.trim()) {
        ("", "") => String::new(),
        (out, "") => out.to_string(),
        ("", err) => err.to_string(),
        (out, err) => format!("{}\n{}", out, err),
    }
}

fn truncate(mut text: String, max_chars: usize) -> String {
    if let Some((idx, _)) = text.char_indices().nth(max_chars) {
        let original = text.chars().count();
        text.truncate(idx);
        text.push_str(&format!("... (truncated from {} chars)", original));
    }
    text
}
