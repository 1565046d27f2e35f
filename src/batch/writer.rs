//! Batch writer implementation.

use std::path::Path;

use log::{debug, warn};
use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::config::{BATCH_FILE_PREFIX, BATCH_FILE_SUFFIX};
use crate::error_handling::BatchError;

use super::SealedBatch;

/// Open batch accepting appended content.
///
/// `seal` and `discard` take the writer by value, so nothing can be appended
/// to a batch once it has been closed.
pub struct BatchWriter {
    sequence: u64,
    path: TempPath,
    file: BufWriter<File>,
    records: usize,
    bytes: u64,
}

impl BatchWriter {
    /// Opens a new, empty batch file in `dir`.
    pub fn create(dir: &Path, sequence: u64) -> Result<Self, BatchError> {
        let named = tempfile::Builder::new()
            .prefix(BATCH_FILE_PREFIX)
            .suffix(BATCH_FILE_SUFFIX)
            .tempfile_in(dir)
            .map_err(|source| BatchError::Create {
                dir: dir.to_path_buf(),
                source,
            })?;
        let (file, path) = named.into_parts();
        debug!("Opened batch #{} at {}", sequence, path.display());

        Ok(BatchWriter {
            sequence,
            path,
            file: BufWriter::new(File::from_std(file)),
            records: 0,
            bytes: 0,
        })
    }

    /// Appends one document's content verbatim (no delimiter is added).
    pub async fn append(&mut self, content: &str) -> Result<(), BatchError> {
        self.file
            .write_all(content.as_bytes())
            .await
            .map_err(|source| BatchError::Write {
                path: self.path.to_path_buf(),
                source,
            })?;
        self.records += 1;
        self.bytes += content.len() as u64;
        Ok(())
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of documents appended so far.
    pub fn len(&self) -> usize {
        self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records == 0
    }

    /// Bytes of content appended so far.
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Flushes and closes the file, returning the batch for dispatch.
    pub async fn seal(self) -> Result<SealedBatch, BatchError> {
        let BatchWriter {
            sequence,
            path,
            mut file,
            records,
            bytes,
        } = self;

        let sealed = async {
            file.flush().await?;
            let file = file.into_inner();
            file.sync_all().await
        }
        .await;
        if let Err(source) = sealed {
            // `path` is dropped on return, removing the partial file
            return Err(BatchError::Seal {
                path: path.to_path_buf(),
                source,
            });
        }

        Ok(SealedBatch::new(sequence, path, records, bytes))
    }

    /// Closes and deletes the batch without dispatching it.
    pub fn discard(self) {
        let BatchWriter {
            sequence,
            path,
            file,
            ..
        } = self;
        drop(file);
        let shown = path.to_path_buf();
        if let Err(e) = path.close() {
            warn!(
                "Failed to delete discarded batch #{} at {}: {}",
                sequence,
                shown.display(),
                e
            );
        } else {
            debug!("Discarded empty batch #{}", sequence);
        }
    }
}
