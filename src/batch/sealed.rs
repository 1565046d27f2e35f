//! Sealed batch handle.

use std::io;
use std::path::Path;

use tempfile::TempPath;

/// A closed batch file ready for ingestion.
///
/// Owned by exactly one holder at a time: the dispatch queue, then a single
/// worker. [`SealedBatch::remove`] deletes the file; a batch dropped without
/// being removed (for example when the run aborts with batches still
/// queued) deletes its file as well.
#[derive(Debug)]
pub struct SealedBatch {
    sequence: u64,
    path: TempPath,
    records: usize,
    bytes: u64,
}

impl SealedBatch {
    pub(super) fn new(sequence: u64, path: TempPath, records: usize, bytes: u64) -> Self {
        SealedBatch {
            sequence,
            path,
            records,
            bytes,
        }
    }

    /// Position of this batch in export order, starting at 1.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> usize {
        self.records
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Deletes the backing file, consuming the batch.
    pub fn remove(self) -> io::Result<()> {
        self.path.close()
    }
}
