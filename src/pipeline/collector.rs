//! Error collector: drains per-batch failures while the workers run.

use std::path::PathBuf;
use std::sync::Arc;

use log::error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error_handling::{IngestError, ProcessingStats};

/// A batch whose ingest call failed.
#[derive(Debug)]
pub struct BatchFailure {
    /// Export-order position of the batch
    pub sequence: u64,
    /// Path the batch had while it was being ingested (already deleted)
    pub path: PathBuf,
    pub error: IngestError,
}

/// What the collector saw over the whole run.
#[derive(Debug, Default)]
pub struct FailureSummary {
    pub count: usize,
    /// Rendering of the first failure received
    pub first: Option<String>,
}

/// Background task logging every failure from the error queue.
///
/// Must be started before the workers. It ends once every sender of the
/// queue has been dropped and the queue is drained.
pub struct ErrorCollector {
    handle: JoinHandle<FailureSummary>,
}

impl ErrorCollector {
    pub fn start(mut errors: mpsc::Receiver<BatchFailure>, stats: Arc<ProcessingStats>) -> Self {
        let handle = tokio::spawn(async move {
            let mut summary = FailureSummary::default();
            while let Some(failure) = errors.recv().await {
                error!("[ERROR] batch #{}: {}", failure.sequence, failure.error);
                if let IngestError::Failed { output, .. } = &failure.error {
                    if !output.is_empty() {
                        error!("[ERROR] batch #{} tool output: {}", failure.sequence, output);
                    }
                }
                stats.increment_error(failure.error.error_type());

                summary.count += 1;
                summary
                    .first
                    .get_or_insert_with(|| format!("batch #{}: {}", failure.sequence, failure.error));
            }
            summary
        });

        ErrorCollector { handle }
    }

    /// Waits for the queue to close and returns the summary.
    pub async fn finish(self) -> Result<FailureSummary, tokio::task::JoinError> {
        self.handle.await
    }
}
