//! # Sema Describe
//!
//! The backend-independent query language and the shared compiler
//! machinery both backends build on:
//!
//! - [`Description`]: the input AST (conjunctions, disjunctions, property
//!   constraints, class/namespace/value filters)
//! - [`SortKeys`] / [`SortDirection`]: requested result ordering
//! - [`Query`] / [`QueryResult`]: the request/response envelope
//! - [`DescriptionInterpreter`] / [`InterpreterRegistry`]: ordered
//!   first-match-wins dispatch with a mandatory default interpreter
//! - [`BuildContext`]: per-build variable allocation and configuration
//!
//! # Architecture
//!
//! A backend implements [`ConditionCompiler`] for its condition builder
//! and registers one interpreter per `Description` variant. The same
//! tree is walked once per backend with different leaf semantics; the
//! recursion shape, dispatch order, and variable allocation live here so
//! the two walks cannot drift.

pub mod concept;
pub mod context;
pub mod description;
pub mod dispatch;
pub mod query;
pub mod sort;

pub use concept::{ConceptResolver, InMemoryConcepts};
pub use context::BuildContext;
pub use description::{Description, DescriptionNode, PrintRequest};
pub use dispatch::{ConditionCompiler, DescriptionInterpreter, InterpreterRegistry};
pub use query::{Query, QueryMode, QueryResult, DEFAULT_LIMIT};
pub use sort::{SortDirection, SortKeys};
