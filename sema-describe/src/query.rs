//! Query and result envelopes
//!
//! `Query` wraps a description with the execution configuration the
//! engines consume (mode, limit/offset, sort keys, accumulated errors).
//! `QueryResult` is what the engines produce: an ordered entity list
//! plus count/debug payloads and user-facing messages.

use crate::description::Description;
use crate::sort::SortKeys;
use sema_core::{PageRef, QueryMessage};
use serde::{Deserialize, Serialize};

/// Default result limit when the caller does not set one.
pub const DEFAULT_LIMIT: usize = 50;

/// What the caller wants back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QueryMode {
    /// Ordered entity instances (the default)
    #[default]
    Instance,
    /// Result count only
    Count,
    /// Rendered query text instead of execution
    Debug,
    /// Build nothing, return an empty result
    None,
}

/// A query request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// The description tree to compile
    pub description: Description,
    /// Requested ordering
    #[serde(default)]
    pub sort_keys: SortKeys,
    /// Maximum rows to return
    pub limit: usize,
    /// Rows to skip
    pub offset: usize,
    /// Execution mode
    #[serde(default)]
    pub mode: QueryMode,
    /// Errors attached before execution (e.g. by the host's parser);
    /// a non-thing query carrying errors short-circuits to empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<QueryMessage>,
}

impl Query {
    /// Create an instance-mode query with default limit.
    pub fn new(description: Description) -> Self {
        Self {
            description,
            sort_keys: SortKeys::none(),
            limit: DEFAULT_LIMIT,
            offset: 0,
            mode: QueryMode::Instance,
            errors: Vec::new(),
        }
    }

    /// Set the mode, fluent.
    pub fn with_mode(mut self, mode: QueryMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the limit, fluent.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the offset, fluent.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Set the sort keys, fluent.
    pub fn with_sort_keys(mut self, sort_keys: SortKeys) -> Self {
        self.sort_keys = sort_keys;
        self
    }

    /// Attach a pre-execution error, fluent.
    pub fn with_error(mut self, error: QueryMessage) -> Self {
        self.errors.push(error);
        self
    }

    /// Whether the query carries unrecoverable pre-execution errors and
    /// is not a trivial thing query.
    ///
    /// Such queries short-circuit to an empty result before any
    /// condition is built.
    pub fn is_known_bad(&self) -> bool {
        !self.errors.is_empty() && !self.description.is_thing()
    }
}

/// The outcome of executing a query.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Matched entities in result order (instance mode)
    pub entities: Vec<PageRef>,
    /// Result count (count mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    /// Rendered query text (debug mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_text: Option<String>,
    /// Whether the backend had at least one more row past the limit
    pub has_further_results: bool,
    /// User-facing errors and warnings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<QueryMessage>,
}

impl QueryResult {
    /// An empty result carrying the given messages.
    pub fn empty(messages: Vec<QueryMessage>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    /// A count-mode result.
    pub fn of_count(count: u64) -> Self {
        Self {
            count: Some(count),
            ..Self::default()
        }
    }

    /// An instance-mode result; `has_more` is the look-ahead flag.
    pub fn of_entities(entities: Vec<PageRef>, has_more: bool) -> Self {
        Self {
            entities,
            has_further_results: has_more,
            ..Self::default()
        }
    }

    /// A debug-mode result.
    pub fn of_debug(text: impl Into<String>) -> Self {
        Self {
            debug_text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Attach a message, fluent.
    pub fn with_message(mut self, message: QueryMessage) -> Self {
        self.messages.push(message);
        self
    }
}
