//! Opaque connection to the triple store
//!
//! The engine renders finished query strings; the connection only
//! executes them. No retries happen at this level - a failed call
//! surfaces as an error on the final result and the caller owns
//! retry policy.

use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by a connection.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// The endpoint could not be contacted
    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    /// The endpoint answered with something unparseable
    #[error("Malformed backend response: {0}")]
    BadResponse(String),
}

/// Result type for connection calls.
pub type ConnectionResult<T> = std::result::Result<T, ConnectionError>;

/// Answer to an ASK query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AskResponse {
    /// Whether the pattern matched
    pub is_true: bool,
}

/// Tabular answer to a SELECT query.
#[derive(Clone, Debug, Default)]
pub struct SelectResultSet {
    /// Column (variable) names without the `?` sigil
    pub columns: Vec<String>,
    /// Row-major cells; `None` for unbound
    pub rows: Vec<Vec<Option<String>>>,
    /// Whether the endpoint reported a resource-limit truncation
    pub incomplete: bool,
}

impl SelectResultSet {
    /// Index of a column by variable name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterate the cells of one column.
    pub fn column_values<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + 'a {
        let idx = self.column(name);
        self.rows.iter().filter_map(move |row| {
            idx.and_then(|i| row.get(i)).and_then(|c| c.as_deref())
        })
    }
}

/// Executes finished SPARQL query strings against the triple store.
#[async_trait]
pub trait SparqlConnection: Send + Sync {
    /// Execute an ASK query.
    async fn ask(&self, query: &str) -> ConnectionResult<AskResponse>;

    /// Execute a SELECT query.
    async fn select(&self, query: &str) -> ConnectionResult<SelectResultSet>;

    /// Execute a COUNT query (a SELECT with a single aggregate column).
    async fn select_count(&self, query: &str) -> ConnectionResult<SelectResultSet>;
}

/// Blanket implementation so a shared `Arc<T>` can stand in for the
/// connection it wraps.
#[async_trait]
impl<T: SparqlConnection + ?Sized> SparqlConnection for std::sync::Arc<T> {
    async fn ask(&self, query: &str) -> ConnectionResult<AskResponse> {
        (**self).ask(query).await
    }

    async fn select(&self, query: &str) -> ConnectionResult<SelectResultSet> {
        (**self).select(query).await
    }

    async fn select_count(&self, query: &str) -> ConnectionResult<SelectResultSet> {
        (**self).select_count(query).await
    }
}
