//! Opaque connection to the document index
//!
//! The engine builds finished DSL bodies; the connection only executes
//! them. No retries happen at this level.

use async_trait::async_trait;
use serde_json::Value;
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

/// Raw answer to a search call.
#[derive(Clone, Debug, Default)]
pub struct SearchResponse {
    /// The raw response JSON (hits, totals, aggregations)
    pub raw: Value,
    /// Error strings the endpoint attached without failing the call
    pub errors: Vec<String>,
}

/// Executes finished DSL bodies against the document index.
#[async_trait]
pub trait SearchConnection: Send + Sync {
    /// Count matching documents. `body` carries the `query` object.
    async fn count(&self, body: &Value) -> ConnectionResult<u64>;

    /// Run a search. `body` carries `query`, paging, sorts, and
    /// optionally `aggs`.
    async fn search(&self, body: &Value) -> ConnectionResult<SearchResponse>;

    /// Validate a body without running it (used in debug mode).
    async fn validate(&self, body: &Value) -> ConnectionResult<bool>;
}

/// Blanket implementation so a shared `Arc<T>` can stand in for the
/// connection it wraps.
#[async_trait]
impl<T: SearchConnection + ?Sized> SearchConnection for std::sync::Arc<T> {
    async fn count(&self, body: &Value) -> ConnectionResult<u64> {
        (**self).count(body).await
    }

    async fn search(&self, body: &Value) -> ConnectionResult<SearchResponse> {
        (**self).search(body).await
    }

    async fn validate(&self, body: &Value) -> ConnectionResult<bool> {
        (**self).validate(body).await
    }
}
