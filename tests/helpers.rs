// Shared test helpers: in-memory row sources and stub collaborators.
//
// Nothing here touches a database, a search engine or Redis.

#![allow(dead_code)] // Each test file uses a different subset

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::{stream, StreamExt};
use tokio::sync::Semaphore;

use reindexer::error_handling::{IngestError, PreflightError, SourceError};
use reindexer::ingest::Ingester;
use reindexer::initialization::Preflight;
use reindexer::source::{Record, RecordStream, RowSource};
use reindexer::PipelineSettings;

/// Content of the `i`th generated document (one JSON line).
pub fn content(i: usize) -> String {
    format!("{{\"id\":\"doc{:05}\"}}\n", i)
}

/// Row source yielding `count` generated records, counting rows pulled.
pub struct MemorySource {
    count: usize,
    fail_at: Option<usize>,
    pulled: Arc<AtomicUsize>,
}

impl MemorySource {
    pub fn new(count: usize) -> Self {
        MemorySource {
            count,
            fail_at: None,
            pulled: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Yields a read error in place of row `index` (0-based).
    pub fn failing_at(count: usize, index: usize) -> Self {
        MemorySource {
            fail_at: Some(index),
            ..Self::new(count)
        }
    }

    pub fn pulled(&self) -> usize {
        self.pulled.load(Ordering::SeqCst)
    }
}

impl RowSource for MemorySource {
    fn rows(&self) -> RecordStream<'_> {
        let pulled = Arc::clone(&self.pulled);
        let fail_at = self.fail_at;
        stream::iter(0..self.count)
            .map(move |i| {
                pulled.fetch_add(1, Ordering::SeqCst);
                if fail_at == Some(i) {
                    return Err(SourceError::Read("connection reset by peer".to_string()));
                }
                Ok(Record {
                    id: format!("doc{:05}", i),
                    txn_id: format!("txn{}", i),
                    owner: "unc".to_string(),
                    content: content(i),
                })
            })
            .boxed()
    }

    fn describe(&self) -> String {
        format!("{} in-memory documents", self.count)
    }
}

/// Ingester that records every batch it sees.
///
/// Tracks how many calls are in flight at once. Batches containing any
/// document listed in `fail_docs` are failed.
#[derive(Default)]
pub struct RecordingIngester {
    pub delay: Option<Duration>,
    pub fail_all: bool,
    pub fail_docs: Vec<usize>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    batches: Mutex<Vec<String>>,
}

impl RecordingIngester {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slow(delay: Duration) -> Self {
        RecordingIngester {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        RecordingIngester {
            fail_all: true,
            ..Self::default()
        }
    }

    /// Fails only the batches containing one of `docs`.
    pub fn failing_docs(docs: Vec<usize>) -> Self {
        RecordingIngester {
            fail_docs: docs,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Contents of every batch ingested, in completion order.
    pub fn batches(&self) -> Vec<String> {
        self.batches.lock().expect("batches lock").clone()
    }

    /// Record count of every batch, sorted ascending.
    pub fn batch_sizes(&self) -> Vec<usize> {
        let mut sizes: Vec<usize> = self.batches().iter().map(|b| b.lines().count()).collect();
        sizes.sort_unstable();
        sizes
    }
}

#[async_trait]
impl Ingester for RecordingIngester {
    async fn ingest(&self, batch: &Path) -> Result<(), IngestError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let contents = tokio::fs::read_to_string(batch)
            .await
            .expect("batch file must exist while it is ingested");
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let fail = self.fail_all
            || self
                .fail_docs
                .iter()
                .any(|&doc| contents.contains(&content(doc)));
        self.batches.lock().expect("batches lock").push(contents);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if fail {
            Err(IngestError::Failed {
                batch: batch.to_path_buf(),
                status: "exit status: 1".to_string(),
                output: "solr rejected the batch".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

/// Ingester that blocks every call until a permit is added to `gate`.
pub struct GatedIngester {
    pub gate: Arc<Semaphore>,
    calls: AtomicUsize,
}

impl GatedIngester {
    pub fn new() -> Self {
        GatedIngester {
            gate: Arc::new(Semaphore::new(0)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Ingester for GatedIngester {
    async fn ingest(&self, _batch: &Path) -> Result<(), IngestError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let permit = self.gate.acquire().await.expect("gate closed");
        permit.forget();
        Ok(())
    }
}

/// Pre-flight check with a fixed answer.
pub struct StubPreflight {
    pub reachable: bool,
    pub checks: Arc<AtomicUsize>,
}

impl StubPreflight {
    pub fn new(reachable: bool) -> Self {
        StubPreflight {
            reachable,
            checks: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Preflight for StubPreflight {
    fn target(&self) -> &str {
        "redis://stub:6379/0"
    }

    async fn check(&self) -> Result<(), PreflightError> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        if self.reachable {
            Ok(())
        } else {
            Err(PreflightError::Unreachable {
                target: self.target().to_string(),
                reason: "connection refused".to_string(),
            })
        }
    }
}

/// Isolated lock file and batch directory for one test.
pub struct TestDirs {
    _root: tempfile::TempDir,
    pub lock_file: PathBuf,
    pub batch_dir: PathBuf,
}

impl TestDirs {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("Failed to create temp dir");
        let batch_dir = root.path().join("batches");
        std::fs::create_dir(&batch_dir).expect("Failed to create batch dir");
        TestDirs {
            lock_file: root.path().join("reindex.lock"),
            batch_dir,
            _root: root,
        }
    }

    pub fn settings(&self, chunk_size: usize, workers: usize) -> PipelineSettings {
        PipelineSettings {
            chunk_size,
            workers,
            lock_file: self.lock_file.clone(),
            batch_dir: self.batch_dir.clone(),
        }
    }

    /// Number of files left in the batch directory.
    pub fn leftover_batches(&self) -> usize {
        std::fs::read_dir(&self.batch_dir)
            .expect("Failed to read batch dir")
            .count()
    }
}
