//! Size-bounded batch files.
//!
//! A [`BatchWriter`] accumulates document content into one temporary file.
//! Sealing consumes the writer and yields a [`SealedBatch`], which is handed
//! by move to exactly one worker and deleted after its ingest call.

mod sealed;
mod writer;

pub use sealed::SealedBatch;
pub use writer::BatchWriter;
