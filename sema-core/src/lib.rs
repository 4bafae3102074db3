//! # Sema Core
//!
//! Shared data model for the sema query-translation core:
//!
//! - [`DataItem`]: the typed value model (pages, text, numbers, time, ...)
//! - [`PageRef`] / [`PropertyRef`]: entity and property references
//! - [`Comparator`]: value-comparison operators
//! - [`TypeRegistry`] / [`EntityResolver`]: collaborator traits the host
//!   system implements (property typing, id resolution)
//! - [`BuildError`] / [`QueryMessage`]: the error taxonomy shared by both
//!   backend engines
//!
//! This crate is backend-neutral; the SPARQL and search backends both
//! build on it.

pub mod comparator;
pub mod error;
pub mod item;
pub mod property;
pub mod registry;

pub use comparator::Comparator;
pub use error::{BuildError, MessageCode, QueryMessage, Result};
pub use item::{DataItem, DataItemKind, PageRef};
pub use property::PropertyRef;
pub use registry::{
    EntityResolver, InMemoryResolver, InMemoryTypeRegistry, TypeRegistry,
};
