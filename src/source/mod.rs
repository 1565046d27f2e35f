//! Document sources.
//!
//! The pipeline reads documents through the [`RowSource`] trait: an ordered,
//! finite, non-restartable stream of [`Record`]s. [`PgSource`] is the
//! PostgreSQL implementation used by the binary.

mod postgres;
mod query;

use futures::stream::BoxStream;

use crate::error_handling::SourceError;

pub use postgres::PgSource;
pub use query::DocumentQuery;

/// One exported document.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Record {
    pub id: String,
    pub txn_id: String,
    pub owner: String,
    pub content: String,
}

/// Stream of records in source order. An `Err` item is fatal to the run.
pub type RecordStream<'a> = BoxStream<'a, Result<Record, SourceError>>;

/// Produces the records to export.
pub trait RowSource: Send + Sync {
    /// Starts reading. Called at most once per run.
    fn rows(&self) -> RecordStream<'_>;

    /// Human-readable description for logs.
    fn describe(&self) -> String {
        "row source".to_string()
    }
}
