//! Exporter: streams records into size-bounded batches.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use log::{debug, info};
use tokio::sync::mpsc;

use crate::app::log_progress;
use crate::batch::{BatchWriter, SealedBatch};
use crate::error_handling::{InfoType, PipelineError, ProcessingStats};
use crate::source::RecordStream;

use super::PendingWork;

/// Totals for one export pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    /// Records read from the source and written to batches
    pub records: usize,
    /// Batches sealed and handed to the dispatch queue
    pub batches: usize,
}

/// Reads the row stream sequentially, writing one batch at a time.
///
/// Every `chunk_size` records the current batch is sealed and sent to the
/// dispatch queue; the send waits while the queue is full, which is what
/// keeps the exporter from running ahead of the workers. Owning the sender
/// means the queue closes when the exporter is done or dropped.
pub struct Exporter {
    batch_dir: PathBuf,
    chunk_size: usize,
    dispatch: mpsc::Sender<SealedBatch>,
    pending: Arc<PendingWork>,
    stats: Arc<ProcessingStats>,
}

impl Exporter {
    pub fn new(
        batch_dir: PathBuf,
        chunk_size: usize,
        dispatch: mpsc::Sender<SealedBatch>,
        pending: Arc<PendingWork>,
        stats: Arc<ProcessingStats>,
    ) -> Self {
        Exporter {
            batch_dir,
            chunk_size: chunk_size.max(1),
            dispatch,
            pending,
            stats,
        }
    }

    /// Exports every record of `rows`.
    ///
    /// A trailing partial batch is dispatched; a batch that received no
    /// records is deleted instead. Any read or batch I/O error aborts the
    /// export and the partially written batch is deleted with it.
    pub async fn run(self, mut rows: RecordStream<'_>) -> Result<ExportSummary, PipelineError> {
        let started = Instant::now();
        let mut summary = ExportSummary::default();
        let mut sequence = 1;
        let mut current = BatchWriter::create(&self.batch_dir, sequence)?;

        info!("Now processing database results");
        while let Some(row) = rows.next().await {
            let record = row?;
            current.append(&record.content).await?;
            summary.records += 1;

            if summary.records % self.chunk_size == 0 {
                self.dispatch(current).await?;
                summary.batches += 1;
                log_progress(started, summary.records, summary.batches);
                sequence += 1;
                current = BatchWriter::create(&self.batch_dir, sequence)?;
            }
        }

        if current.is_empty() {
            current.discard();
            self.stats.increment_info(InfoType::EmptyBatchDiscarded);
        } else {
            self.dispatch(current).await?;
            summary.batches += 1;
        }

        info!(
            "Finished reading {} documents into {} batches",
            summary.records, summary.batches
        );
        Ok(summary)
    }

    async fn dispatch(&self, writer: BatchWriter) -> Result<(), PipelineError> {
        let batch = writer.seal().await?;
        info!(
            "Sealed batch #{} ({} documents, {} bytes) at {}",
            batch.sequence(),
            batch.records(),
            batch.bytes(),
            batch.path().display()
        );

        self.pending.add();
        if let Err(mpsc::error::SendError(batch)) = self.dispatch.send(batch).await {
            self.pending.done();
            debug!("Dropping undeliverable batch #{}", batch.sequence());
            return Err(PipelineError::DispatchClosed);
        }
        self.stats.increment_info(InfoType::BatchDispatched);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::SourceError;
    use crate::source::Record;
    use futures::stream;

    fn record(i: usize) -> Record {
        Record {
            id: format!("doc{:05}", i),
            txn_id: format!("txn{}", i),
            owner: "unc".to_string(),
            content: format!("{{\"id\":\"doc{:05}\"}}\n", i),
        }
    }

    fn rows(n: usize) -> RecordStream<'static> {
        stream::iter((0..n).map(|i| Ok(record(i)))).boxed()
    }

    /// Runs an export with an unbounded consumer and returns the sealed
    /// batches' record counts in dispatch order.
    async fn export(n: usize, chunk_size: usize) -> (ExportSummary, Vec<usize>, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let (tx, mut rx) = mpsc::channel(2);
        let pending = Arc::new(PendingWork::new());
        let exporter = Exporter::new(
            dir.path().to_path_buf(),
            chunk_size,
            tx,
            Arc::clone(&pending),
            Arc::new(ProcessingStats::new()),
        );

        let consumer = tokio::spawn(async move {
            let mut sizes = Vec::new();
            while let Some(batch) = rx.recv().await {
                let contents = std::fs::read_to_string(batch.path()).expect("read batch");
                assert_eq!(contents.lines().count(), batch.records());
                sizes.push(batch.records());
                batch.remove().expect("remove batch");
            }
            sizes
        });

        let summary = exporter.run(rows(n)).await.expect("export should succeed");
        let sizes = consumer.await.expect("consumer should not panic");
        assert_eq!(pending.count(), sizes.len());
        (summary, sizes, dir)
    }

    #[tokio::test]
    async fn test_batch_count_and_last_batch_size() {
        for &(n, c) in &[(0, 10), (1, 10), (9, 10), (10, 10), (11, 10), (25, 10), (30, 10), (7, 1), (5, 3)] {
            let (summary, sizes, dir) = export(n, c).await;
            let expected_batches = if n == 0 { 0 } else { (n + c - 1) / c };
            assert_eq!(summary.batches, expected_batches, "n={n} c={c}");
            assert_eq!(sizes.len(), expected_batches, "n={n} c={c}");
            assert_eq!(summary.records, n);
            assert_eq!(sizes.iter().sum::<usize>(), n);
            if n > 0 {
                let last = if n % c == 0 { c } else { n % c };
                assert_eq!(*sizes.last().expect("at least one batch"), last, "n={n} c={c}");
                assert!(sizes[..sizes.len() - 1].iter().all(|&s| s == c));
            }
            // Nothing is left behind: dispatched batches were removed by the
            // consumer and the trailing empty batch was discarded
            let leftovers = std::fs::read_dir(dir.path()).expect("read dir").count();
            assert_eq!(leftovers, 0, "n={n} c={c}");
        }
    }

    #[tokio::test]
    async fn test_batches_preserve_row_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (tx, mut rx) = mpsc::channel(16);
        let exporter = Exporter::new(
            dir.path().to_path_buf(),
            3,
            tx,
            Arc::new(PendingWork::new()),
            Arc::new(ProcessingStats::new()),
        );
        exporter.run(rows(7)).await.expect("export should succeed");

        let mut all = String::new();
        let mut sequences = Vec::new();
        while let Some(batch) = rx.recv().await {
            sequences.push(batch.sequence());
            all.push_str(&std::fs::read_to_string(batch.path()).expect("read batch"));
        }
        assert_eq!(sequences, vec![1, 2, 3]);
        let expected: String = (0..7).map(|i| record(i).content).collect();
        assert_eq!(all, expected);
    }

    #[tokio::test]
    async fn test_read_error_aborts_and_removes_partial_batch() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (tx, mut rx) = mpsc::channel(16);
        let exporter = Exporter::new(
            dir.path().to_path_buf(),
            2,
            tx,
            Arc::new(PendingWork::new()),
            Arc::new(ProcessingStats::new()),
        );
        let failing = stream::iter(vec![
            Ok(record(0)),
            Ok(record(1)),
            Ok(record(2)),
            Err(SourceError::Read("connection reset".to_string())),
            Ok(record(4)),
        ])
        .boxed();

        let err = exporter.run(failing).await.unwrap_err();
        assert!(matches!(err, PipelineError::Source(_)));

        // The full first batch went out; the partial second one is gone
        let first = rx.recv().await.expect("first batch was dispatched");
        assert_eq!(first.records(), 2);
        assert!(rx.recv().await.is_none());
        first.remove().expect("remove batch");
        assert_eq!(std::fs::read_dir(dir.path()).expect("read dir").count(), 0);
    }

    #[tokio::test]
    async fn test_closed_queue_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (tx, rx) = mpsc::channel(2);
        drop(rx);
        let pending = Arc::new(PendingWork::new());
        let exporter = Exporter::new(
            dir.path().to_path_buf(),
            10,
            tx,
            Arc::clone(&pending),
            Arc::new(ProcessingStats::new()),
        );
        let err = exporter.run(rows(10)).await.unwrap_err();
        assert!(matches!(err, PipelineError::DispatchClosed));
        assert_eq!(pending.count(), 0);
        assert_eq!(std::fs::read_dir(dir.path()).expect("read dir").count(), 0);
    }
}
