//! Counter of dispatched-but-unfinished batches.

use std::sync::atomic::{AtomicUsize, Ordering};

use log::error;
use tokio::sync::Notify;

/// Wait-group over sealed batches.
///
/// The exporter calls [`PendingWork::add`] before handing a batch to the
/// dispatch queue, the worker that consumed it calls [`PendingWork::done`],
/// and the coordinator blocks in [`PendingWork::wait`] until the count is
/// back to zero.
#[derive(Debug, Default)]
pub struct PendingWork {
    count: AtomicUsize,
    idle: Notify,
}

impl PendingWork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    pub fn done(&self) {
        match self
            .count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        {
            Ok(1) => self.idle.notify_waiters(),
            Ok(_) => {}
            Err(_) => error!("Batch completion recorded with no batch pending"),
        }
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Resolves once every added batch has been marked done.
    pub async fn wait(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            // Register before checking so a concurrent `done` cannot be missed
            notified.as_mut().enable();
            if self.count() == 0 {
                return;
            }
            notified.await;
        }
    }
}
