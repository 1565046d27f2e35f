//! PostgreSQL document source.

use futures::{StreamExt, TryStreamExt};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

use crate::error_handling::SourceError;

use super::{DocumentQuery, Record, RecordStream, RowSource};

/// Streams documents from PostgreSQL.
///
/// The pool connects lazily: nothing touches the database until
/// [`RowSource::rows`] is polled, so a run refused by the lock makes no
/// connection at all. Connection failures surface as the first stream item.
pub struct PgSource {
    pool: PgPool,
    query: DocumentQuery,
    sql: String,
}

impl PgSource {
    /// Must be called from within a Tokio runtime.
    pub fn connect_lazy(options: PgConnectOptions, query: DocumentQuery) -> Self {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_lazy_with(options);
        let sql = query.to_sql();
        PgSource { pool, query, sql }
    }

    pub async fn close(&self) {
        self.pool.close().await;
        log::debug!("Database pool closed");
    }
}

impl RowSource for PgSource {
    fn rows(&self) -> RecordStream<'_> {
        let mut query = sqlx::query_as::<_, Record>(&self.sql);
        if let Some(start_id) = self.query.start_id() {
            query = query.bind(start_id);
        }
        query.fetch(&self.pool).map_err(SourceError::from).boxed()
    }

    fn describe(&self) -> String {
        match self.query.start_id() {
            Some(id) => format!("documents starting at id {}", id),
            None => "all documents".to_string(),
        }
    }
}
