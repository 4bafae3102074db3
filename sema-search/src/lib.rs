//! # Sema Search Backend
//!
//! Compiles description trees into document-index bool queries and runs
//! them against a search endpoint.
//!
//! # Architecture
//!
//! The pipeline mirrors the SPARQL backend, with the graph-pattern
//! payload replaced by boolean-clause buckets:
//!
//! 1. **Build**: [`SearchConditionBuilder`] recurses over the
//!    description through the interpreter registry. Join variables have
//!    no meaning in a flat document index; the builder instead threads
//!    a *property field scope* through the recursion. A post-pass binds
//!    sort fields for every configured sort key.
//! 2. **Serialize & run**: [`SearchCondition::to_value`] flattens the
//!    nested bool structure into one JSON body; the engine picks count
//!    or search per query mode, resolves hit ids back to entities in
//!    one bulk lookup, and surfaces endpoint truncation as warnings.
//!
//! Constructs the index cannot express (property chains, inverse
//! properties, concepts) degrade to permissive conditions with warnings
//! rather than failing the query.

pub mod builder;
pub mod condition;
pub mod connection;
pub mod engine;
pub mod field;
pub mod interpreters;
pub mod result;

pub use builder::SearchConditionBuilder;
pub use condition::{
    Aggregations, BoolQuery, ClauseType, QueryPart, SearchCondition, SearchConditionKind,
};
pub use connection::{ConnectionError, ConnectionResult, SearchConnection, SearchResponse};
pub use engine::SearchQueryEngine;
pub use field::{FieldMapper, PropertyFields};
