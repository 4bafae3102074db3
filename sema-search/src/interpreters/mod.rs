//! Description interpreters for the document-index backend
//!
//! Parallel to the SPARQL set: one interpreter per description variant,
//! ordered registry, Thing as the mandatory default. The default
//! registry is a lazily built process-wide static.

mod class;
mod concept;
mod conjunction;
mod disjunction;
mod namespace;
mod some_property;
mod thing;
mod value;

pub use class::ClassInterpreter;
pub use concept::ConceptInterpreter;
pub use conjunction::ConjunctionInterpreter;
pub use disjunction::DisjunctionInterpreter;
pub use namespace::NamespaceInterpreter;
pub use some_property::SomePropertyInterpreter;
pub use thing::ThingInterpreter;
pub use value::ValueInterpreter;

use crate::builder::SearchConditionBuilder;
use once_cell::sync::Lazy;
use sema_describe::InterpreterRegistry;
use std::sync::Arc;

static REGISTRY: Lazy<Arc<InterpreterRegistry<SearchConditionBuilder>>> = Lazy::new(|| {
    Arc::new(
        InterpreterRegistry::new(Arc::new(ThingInterpreter))
            .with(Arc::new(ConjunctionInterpreter))
            .with(Arc::new(DisjunctionInterpreter))
            .with(Arc::new(SomePropertyInterpreter))
            .with(Arc::new(ClassInterpreter))
            .with(Arc::new(NamespaceInterpreter))
            .with(Arc::new(ValueInterpreter))
            .with(Arc::new(ConceptInterpreter)),
    )
});

/// The default interpreter registry.
pub fn default_registry() -> &'static Arc<InterpreterRegistry<SearchConditionBuilder>> {
    &REGISTRY
}
