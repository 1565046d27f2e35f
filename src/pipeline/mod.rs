//! The export/ingest pipeline.
//!
//! One exporter task streams records into batch files and hands each sealed
//! batch to a bounded dispatch queue. A fixed pool of workers ingests the
//! batches concurrently and reports failures to an error collector. A
//! pending-work counter tracks every dispatched batch until a worker has
//! finished with it.

mod collector;
mod coordinator;
mod exporter;
mod pending;
mod report;
mod worker;

pub use collector::{BatchFailure, ErrorCollector, FailureSummary};
pub use coordinator::{PipelineCoordinator, PipelineSettings};
pub use exporter::{ExportSummary, Exporter};
pub use pending::PendingWork;
pub use report::{RunOutcome, RunReport};
pub use worker::WorkerPool;
