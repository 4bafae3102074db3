//! Description interpreters for the SPARQL backend
//!
//! One interpreter per description variant, registered in an ordered
//! registry with the Thing interpreter as the mandatory default. The
//! default registry is process-wide, built lazily once, and read-only
//! thereafter; hosts that add description variants build their own
//! registry and hand it to the builder.

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

use crate::builder::ConditionBuilder;
use once_cell::sync::Lazy;
use sema_describe::InterpreterRegistry;
use std::sync::Arc;

static REGISTRY: Lazy<Arc<InterpreterRegistry<ConditionBuilder>>> = Lazy::new(|| {
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
pub fn default_registry() -> &'static Arc<InterpreterRegistry<ConditionBuilder>> {
    &REGISTRY
}
