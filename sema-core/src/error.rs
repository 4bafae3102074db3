//! Error taxonomy shared by both backend engines
//!
//! Two tiers:
//!
//! - [`BuildError`]: structural invariant violations. These abort the
//!   current query build via `Result` - fatal to the request, never to
//!   the process.
//! - [`QueryMessage`]: user-facing, recoverable conditions (backend
//!   unreachable, truncated results, degraded constructs). Collected on
//!   the query result, never raised.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structural errors raised out of a condition build.
///
/// Every variant represents a "must not happen" programmer or caller
/// error; backend failures never surface here.
#[derive(Error, Debug)]
pub enum BuildError {
    /// A sort key was supplied that is not a plain property key string
    #[error("Invalid sort key: {0}")]
    InvalidSortKey(String),

    /// The order-by post-pass failed to bind a variable for a requested
    /// sort key (violated internal invariant)
    #[error("No order variable bound for sort key '{0}'")]
    MissingOrderVariable(String),

    /// Internal invariant violation
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for condition building.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Recoverable-error taxonomy for user-facing messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageCode {
    /// The backend endpoint could not be contacted
    BackendUnreachable,
    /// The backend reported a resource-limit truncation
    BackendIncomplete,
    /// A construct was degraded to a permissive condition
    UnsupportedFeature,
    /// The query was rejected before any condition was built
    InvalidQuery,
}

/// A user-facing message attached to a query result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryMessage {
    /// Message classification
    pub code: MessageCode,
    /// Human-readable text
    pub text: String,
}

impl QueryMessage {
    /// Create a message.
    pub fn new(code: MessageCode, text: impl Into<String>) -> Self {
        Self {
            code,
            text: text.into(),
        }
    }

    /// Shorthand for a backend-unreachable message.
    pub fn unreachable(text: impl Into<String>) -> Self {
        Self::new(MessageCode::BackendUnreachable, text)
    }

    /// Shorthand for an incomplete-results warning.
    pub fn incomplete() -> Self {
        Self::new(
            MessageCode::BackendIncomplete,
            "Results may be incomplete: the backend reported a resource limit.",
        )
    }

    /// Shorthand for a degraded-construct warning.
    pub fn unsupported(text: impl Into<String>) -> Self {
        Self::new(MessageCode::UnsupportedFeature, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error_display() {
        let e = BuildError::MissingOrderVariable("Population".to_string());
        assert!(e.to_string().contains("Population"));
    }

    #[test]
    fn test_message_shorthands() {
        assert_eq!(QueryMessage::incomplete().code, MessageCode::BackendIncomplete);
        let m = QueryMessage::unsupported("LIKE on numbers");
        assert_eq!(m.code, MessageCode::UnsupportedFeature);
    }
}
