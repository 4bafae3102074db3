//! Interpreter dispatch
//!
//! Each backend registers one interpreter per description variant in an
//! ordered registry. Dispatch returns the first interpreter whose
//! `can_interpret` matches, falling back to a mandatory default (the
//! Thing interpreter). Registration order matters: a refined interpreter
//! registered earlier shadows a more general one.
//!
//! The registry hands out `Arc` clones so a builder can pick an
//! interpreter and then pass itself `&mut` into it.

use crate::context::BuildContext;
use crate::description::Description;
use crate::sort::SortKeys;
use sema_core::PropertyRef;
use std::sync::Arc;

/// The recursive compiler surface interpreters program against.
///
/// A backend's condition builder implements this; interpreters use it to
/// process sub-descriptions and allocate join variables, which is what
/// makes the whole structure one recursive-descent compiler rather than
/// a set of independent translators.
pub trait ConditionCompiler {
    /// The backend's condition type.
    type Condition;

    /// Recursively compile a sub-description against `join_var`.
    ///
    /// `order_by` names the property whose value the produced condition
    /// should expose for ordering, if any.
    fn map_description(
        &mut self,
        description: &Description,
        join_var: &str,
        order_by: Option<&PropertyRef>,
    ) -> Self::Condition;

    /// Allocate a fresh join variable with the given prefix.
    fn next_variable(&mut self, prefix: &str) -> String;

    /// The active sort-key configuration.
    fn sort_keys(&self) -> &SortKeys;

    /// The per-build context (result variable, counter).
    fn context(&self) -> &BuildContext;
}

/// One strategy for interpreting a description variant.
pub trait DescriptionInterpreter<B: ConditionCompiler>: Send + Sync {
    /// Whether this interpreter handles `description`.
    fn can_interpret(&self, description: &Description) -> bool;

    /// Produce the backend condition for `description`.
    ///
    /// Never fails: unsupported shapes degrade to the backend's
    /// permissive True condition rather than failing the tree.
    fn interpret(
        &self,
        builder: &mut B,
        description: &Description,
        join_var: &str,
        order_by: Option<&PropertyRef>,
    ) -> B::Condition;
}

/// Ordered interpreter registry with a mandatory default.
pub struct InterpreterRegistry<B: ConditionCompiler> {
    interpreters: Vec<Arc<dyn DescriptionInterpreter<B>>>,
    default: Arc<dyn DescriptionInterpreter<B>>,
}

impl<B: ConditionCompiler> InterpreterRegistry<B> {
    /// Create a registry around its default interpreter.
    pub fn new(default: Arc<dyn DescriptionInterpreter<B>>) -> Self {
        Self {
            interpreters: Vec::new(),
            default,
        }
    }

    /// Append an interpreter, fluent. Earlier registrations win.
    pub fn with(mut self, interpreter: Arc<dyn DescriptionInterpreter<B>>) -> Self {
        self.interpreters.push(interpreter);
        self
    }

    /// Append an interpreter.
    pub fn register(&mut self, interpreter: Arc<dyn DescriptionInterpreter<B>>) {
        self.interpreters.push(interpreter);
    }

    /// The first interpreter claiming `description`, else the default.
    pub fn interpreter_for(
        &self,
        description: &Description,
    ) -> Arc<dyn DescriptionInterpreter<B>> {
        self.interpreters
            .iter()
            .find(|i| i.can_interpret(description))
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.default))
    }

    /// Number of registered interpreters (excluding the default).
    pub fn len(&self) -> usize {
        self.interpreters.len()
    }

    /// Whether only the default is registered.
    pub fn is_empty(&self) -> bool {
        self.interpreters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::DescriptionNode;

    /// Minimal compiler whose conditions are plain strings.
    struct TextCompiler {
        ctx: BuildContext,
    }

    impl ConditionCompiler for TextCompiler {
        type Condition = String;

        fn map_description(
            &mut self,
            description: &Description,
            _join_var: &str,
            _order_by: Option<&PropertyRef>,
        ) -> String {
            format!("{:?}", description.node)
        }

        fn next_variable(&mut self, prefix: &str) -> String {
            self.ctx.next_variable(prefix)
        }

        fn sort_keys(&self) -> &SortKeys {
            self.ctx.sort_keys()
        }

        fn context(&self) -> &BuildContext {
            &self.ctx
        }
    }

    struct TagInterpreter {
        tag: &'static str,
        thing_only: bool,
    }

    impl DescriptionInterpreter<TextCompiler> for TagInterpreter {
        fn can_interpret(&self, description: &Description) -> bool {
            !self.thing_only || matches!(description.node, DescriptionNode::Thing)
        }

        fn interpret(
            &self,
            _builder: &mut TextCompiler,
            _description: &Description,
            _join_var: &str,
            _order_by: Option<&PropertyRef>,
        ) -> String {
            self.tag.to_string()
        }
    }

    fn registry() -> InterpreterRegistry<TextCompiler> {
        InterpreterRegistry::new(Arc::new(TagInterpreter {
            tag: "default",
            thing_only: false,
        }))
    }

    #[test]
    fn test_first_match_wins() {
        let reg = registry()
            .with(Arc::new(TagInterpreter {
                tag: "first",
                thing_only: true,
            }))
            .with(Arc::new(TagInterpreter {
                tag: "second",
                thing_only: false,
            }));

        let mut compiler = TextCompiler {
            ctx: BuildContext::new(),
        };
        let thing = Description::thing();
        let ns = Description::namespace(0);

        let i = reg.interpreter_for(&thing);
        assert_eq!(i.interpret(&mut compiler, &thing, "result", None), "first");

        let i = reg.interpreter_for(&ns);
        assert_eq!(i.interpret(&mut compiler, &ns, "result", None), "second");
    }

    #[test]
    fn test_falls_back_to_default() {
        let reg = registry().with(Arc::new(TagInterpreter {
            tag: "things",
            thing_only: true,
        }));
        let mut compiler = TextCompiler {
            ctx: BuildContext::new(),
        };
        let ns = Description::namespace(14);
        let i = reg.interpreter_for(&ns);
        assert_eq!(i.interpret(&mut compiler, &ns, "result", None), "default");
    }
}
