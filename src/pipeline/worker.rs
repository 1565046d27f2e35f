//! Worker pool: ingests sealed batches concurrently.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use log::{debug, error, info};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::batch::SealedBatch;
use crate::error_handling::{ErrorType, InfoType, IngestError, ProcessingStats};
use crate::ingest::Ingester;

use super::{BatchFailure, PendingWork};

/// Shared state handed to every worker.
struct WorkerContext {
    receiver: Mutex<mpsc::Receiver<SealedBatch>>,
    ingester: Arc<dyn Ingester>,
    errors: mpsc::Sender<BatchFailure>,
    pending: Arc<PendingWork>,
    stats: Arc<ProcessingStats>,
}

/// Fixed set of workers sharing one dispatch queue.
///
/// Workers exit when the queue is closed and drained; there is no other
/// stop signal short of [`WorkerPool::abort`].
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `workers` tasks (at least one) consuming `dispatch`.
    pub fn start(
        workers: usize,
        dispatch: mpsc::Receiver<SealedBatch>,
        errors: mpsc::Sender<BatchFailure>,
        ingester: Arc<dyn Ingester>,
        pending: Arc<PendingWork>,
        stats: Arc<ProcessingStats>,
    ) -> Self {
        let ctx = Arc::new(WorkerContext {
            receiver: Mutex::new(dispatch),
            ingester,
            errors,
            pending,
            stats,
        });

        let handles = (1..=workers.max(1))
            .map(|id| tokio::spawn(worker(id, Arc::clone(&ctx))))
            .collect();

        WorkerPool { handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Waits for every worker to exit.
    ///
    /// All workers are awaited even if one of them failed; the first failure
    /// is returned.
    pub async fn join(mut self) -> Result<(), tokio::task::JoinError> {
        let mut first_error = None;
        for handle in std::mem::take(&mut self.handles) {
            if let Err(e) = handle.await {
                error!("Ingest worker failed: {}", e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Stops every worker immediately.
    ///
    /// In-flight ingest calls are dropped (killing any child process) and
    /// queued batches are deleted when the queue is dropped.
    pub async fn abort(mut self) {
        let handles = std::mem::take(&mut self.handles);
        for handle in &handles {
            handle.abort();
        }
        for handle in handles {
            let _ = handle.await;
        }
    }
}

impl Drop for WorkerPool {
    // A pool dropped without join (e.g. the run future was cancelled) must
    // not leave workers ingesting in the background.
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

async fn worker(id: usize, ctx: Arc<WorkerContext>) {
    debug!("worker [{}] started", id);
    loop {
        let next = {
            let mut receiver = ctx.receiver.lock().await;
            receiver.recv().await
        };
        let Some(batch) = next else {
            break;
        };
        process_batch(id, batch, &ctx).await;
    }
    debug!("worker [{}] exited", id);
}

async fn process_batch(id: usize, batch: SealedBatch, ctx: &WorkerContext) {
    let sequence = batch.sequence();
    let path = batch.path().to_path_buf();
    info!(
        "[{}] received batch #{} ({} documents) {}",
        id,
        sequence,
        batch.records(),
        path.display()
    );

    let result = AssertUnwindSafe(ctx.ingester.ingest(&path))
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| {
            Err(IngestError::Panicked {
                batch: path.clone(),
                message: panic_message(panic),
            })
        });
    info!("[{}] external processing complete for batch #{}", id, sequence);

    // The batch is consumed whatever the outcome
    if let Err(e) = batch.remove() {
        error!(
            "[{}] could not delete batch #{} at {}: {}",
            id,
            sequence,
            path.display(),
            e
        );
        ctx.stats.increment_error(ErrorType::BatchCleanupError);
    }

    match result {
        Ok(()) => ctx.stats.increment_info(InfoType::BatchIngested),
        Err(error) => {
            let failure = BatchFailure {
                sequence,
                path,
                error,
            };
            if let Err(mpsc::error::SendError(failure)) = ctx.errors.send(failure).await {
                error!(
                    "Error queue closed; unrecorded failure for batch #{}: {}",
                    failure.sequence, failure.error
                );
            }
        }
    }

    ctx.pending.done();
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
