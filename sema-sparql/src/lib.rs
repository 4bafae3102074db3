//! # Sema SPARQL Backend
//!
//! Compiles description trees into SPARQL conditions and runs them
//! against a triple store.
//!
//! # Architecture
//!
//! The pipeline follows the shared two-phase shape:
//!
//! 1. **Build**: [`ConditionBuilder`] recurses over the description via
//!    the interpreter registry, producing a structured [`Condition`]
//!    (clause lists, never concatenated text). A post-pass back-fills
//!    order-by bindings for untouched sort keys, then the redirect
//!    property path and redirect-exclusion filter are added.
//! 2. **Serialize & run**: the serializer renders the WHERE body (weak
//!    conditions first, catch-all if unsafe, cogent clauses last) and
//!    the engine picks ASK / COUNT / SELECT per query mode, with
//!    trivial results short-circuiting before any backend call.
//!
//! # Example
//!
//! ```
//! use sema_core::InMemoryTypeRegistry;
//! use sema_describe::Description;
//! use sema_sparql::{ConditionBuilder, serializer};
//! use std::sync::Arc;
//!
//! let mut builder = ConditionBuilder::new(Arc::new(InMemoryTypeRegistry::new()));
//! let condition = builder
//!     .build_condition(&Description::namespace(0))
//!     .unwrap();
//! let query = serializer::select_query(&condition, "result", &Default::default());
//! assert!(query.contains("SELECT ?result WHERE {"));
//! ```

pub mod builder;
pub mod condition;
pub mod connection;
pub mod engine;
pub mod interpreters;
pub mod pattern;
pub mod result;
pub mod serializer;
pub mod term;

pub use builder::ConditionBuilder;
pub use condition::{Condition, ConditionKind};
pub use connection::{
    AskResponse, ConnectionError, ConnectionResult, SelectResultSet, SparqlConnection,
};
pub use engine::SparqlQueryEngine;
pub use pattern::{like_pattern_to_regex, FilterExpr, GraphClause};
pub use serializer::SelectOptions;
pub use term::{Exporter, Term};
