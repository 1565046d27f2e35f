//! Pipeline coordinator: owns one reindex run from lock to summary.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use log::{error, info, warn};
use tokio::sync::mpsc;

use crate::app::print_error_statistics;
use crate::config::{DISPATCH_QUEUE_CAPACITY, ERROR_QUEUE_CAPACITY};
use crate::error_handling::{InfoType, PipelineError, ProcessingStats};
use crate::ingest::Ingester;
use crate::initialization::Preflight;
use crate::lock::RunLock;
use crate::source::RowSource;

use super::{ErrorCollector, Exporter, PendingWork, RunReport, WorkerPool};

/// Settings for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Records per batch
    pub chunk_size: usize,
    /// Concurrent ingest workers
    pub workers: usize,
    /// Single-instance lock file
    pub lock_file: PathBuf,
    /// Directory batch files are written to
    pub batch_dir: PathBuf,
}

/// Wires the exporter, the worker pool and the error collector together.
///
/// A run proceeds in this order:
/// 1. Acquire the run lock (refusal is fatal and has no side effects)
/// 2. Run the optional pre-flight check
/// 3. Start the error collector, then the workers
/// 4. Export every record, dispatching sealed batches
/// 5. Wait for every dispatched batch, stop the workers, drain the errors
/// 6. Release the lock
///
/// The lock is released on every exit path after step 1.
pub struct PipelineCoordinator {
    settings: PipelineSettings,
    ingester: Arc<dyn Ingester>,
    preflight: Option<Box<dyn Preflight>>,
}

impl PipelineCoordinator {
    pub fn new(settings: PipelineSettings, ingester: Arc<dyn Ingester>) -> Self {
        PipelineCoordinator {
            settings,
            ingester,
            preflight: None,
        }
    }

    /// Adds a check that must pass before any batch is written.
    pub fn with_preflight(mut self, preflight: Box<dyn Preflight>) -> Self {
        self.preflight = Some(preflight);
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Runs the pipeline over `source`.
    ///
    /// Returns a report when the source was read to the end, even if some
    /// batches failed to ingest; check [`RunReport::outcome`]. Returns an
    /// error when the run could not start or was aborted.
    pub async fn run(&self, source: &dyn RowSource) -> Result<RunReport, PipelineError> {
        let lock = RunLock::acquire(&self.settings.lock_file)?;

        let result = self.run_locked(source).await;

        if let Err(e) = lock.release() {
            warn!("{}", e);
        }
        result
    }

    async fn run_locked(&self, source: &dyn RowSource) -> Result<RunReport, PipelineError> {
        let started = Instant::now();

        if let Some(preflight) = &self.preflight {
            preflight.check().await?;
            info!("Pre-flight check passed for {}", preflight.target());
        }

        let stats = Arc::new(ProcessingStats::new());
        let pending = Arc::new(PendingWork::new());
        let (dispatch_tx, dispatch_rx) = mpsc::channel(DISPATCH_QUEUE_CAPACITY);
        let (errors_tx, errors_rx) = mpsc::channel(ERROR_QUEUE_CAPACITY);

        // The collector must be draining before any worker can report
        let collector = ErrorCollector::start(errors_rx, Arc::clone(&stats));
        let pool = WorkerPool::start(
            self.settings.workers,
            dispatch_rx,
            errors_tx,
            Arc::clone(&self.ingester),
            Arc::clone(&pending),
            Arc::clone(&stats),
        );
        info!(
            "Exporting {} in batches of {} with {} worker{}",
            source.describe(),
            self.settings.chunk_size,
            pool.len(),
            if pool.len() == 1 { "" } else { "s" }
        );

        let exporter = Exporter::new(
            self.settings.batch_dir.clone(),
            self.settings.chunk_size,
            dispatch_tx,
            Arc::clone(&pending),
            Arc::clone(&stats),
        );
        let export = match exporter.run(source.rows()).await {
            Ok(summary) => summary,
            Err(e) => {
                error!("Export aborted: {}", e);
                pool.abort().await;
                if let Ok(failures) = collector.finish().await {
                    if failures.count > 0 {
                        warn!(
                            "{} batch{} failed to ingest before the abort",
                            failures.count,
                            if failures.count == 1 { "" } else { "es" }
                        );
                    }
                }
                return Err(e);
            }
        };

        info!(
            "Export finished, waiting for {} outstanding batch{}",
            pending.count(),
            if pending.count() == 1 { "" } else { "es" }
        );
        pending.wait().await;
        pool.join().await?;
        let failures = collector.finish().await?;

        print_error_statistics(&stats);

        Ok(RunReport {
            records_exported: export.records,
            batches_dispatched: export.batches,
            batches_ingested: stats.get_info_count(InfoType::BatchIngested),
            failed_batches: failures.count,
            first_failure: failures.first,
            elapsed_seconds: started.elapsed().as_secs_f64(),
        })
    }
}
