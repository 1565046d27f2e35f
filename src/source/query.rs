//! Document query construction.

/// The document query, with the resume point as an explicit parameter.
///
/// The lower bound on `id` is a bound parameter (`$1`), never spliced into
/// the SQL text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentQuery {
    start_id: Option<String>,
}

const SELECT_DOCUMENTS: &str = "SELECT id, txn_id, owner, content FROM documents WHERE NOT deleted";
const ORDER_BY_ID: &str = "ORDER BY id ASC";

impl DocumentQuery {
    /// Every document that isn't deleted.
    pub fn all() -> Self {
        Self::default()
    }

    /// Documents whose id is greater than or equal to `start_id`.
    pub fn starting_at(start_id: impl Into<String>) -> Self {
        DocumentQuery {
            start_id: Some(start_id.into()),
        }
    }

    /// Builds a query from an optional resume point; empty means none.
    pub fn from_start_id(start_id: Option<&str>) -> Self {
        match start_id {
            Some(id) if !id.is_empty() => Self::starting_at(id),
            _ => Self::all(),
        }
    }

    pub fn start_id(&self) -> Option<&str> {
        self.start_id.as_deref()
    }

    /// SQL text; bind `start_id` as `$1` when it is set.
    pub fn to_sql(&self) -> String {
        match self.start_id {
            Some(_) => format!("{} AND id >= $1 {}", SELECT_DOCUMENTS, ORDER_BY_ID),
            None => format!("{} {}", SELECT_DOCUMENTS, ORDER_BY_ID),
        }
    }
}
