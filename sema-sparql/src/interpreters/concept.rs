//! Concept (stored description) interpreter

use crate::builder::ConditionBuilder;
use crate::condition::Condition;
use sema_core::{PropertyRef, QueryMessage};
use sema_describe::{ConditionCompiler, Description, DescriptionInterpreter, DescriptionNode};
use tracing::warn;

/// Expands a concept into its stored definition.
///
/// Expansion recurses through the attached concept resolver; an
/// unresolvable or cyclic concept degrades to the universal condition
/// with a warning rather than failing the tree.
pub struct ConceptInterpreter;

impl DescriptionInterpreter<ConditionBuilder> for ConceptInterpreter {
    fn can_interpret(&self, description: &Description) -> bool {
        matches!(description.node, DescriptionNode::Concept { .. })
    }

    fn interpret(
        &self,
        builder: &mut ConditionBuilder,
        description: &Description,
        join_var: &str,
        order_by: Option<&PropertyRef>,
    ) -> Condition {
        let DescriptionNode::Concept { concept } = &description.node else {
            return Condition::universal();
        };

        match builder.resolve_concept(concept) {
            Some(definition) => {
                builder.enter_concept(concept.clone());
                let condition = builder.map_description(&definition, join_var, order_by);
                builder.exit_concept();
                condition
            }
            None => {
                warn!(concept = %concept, "concept not expandable, degrading to universal");
                builder.record_message(QueryMessage::unsupported(format!(
                    "The concept '{concept}' could not be expanded; its condition was ignored.",
                )));
                let mut condition = Condition::universal();
                builder.add_order_by_data_for_property(&mut condition, join_var, order_by, None);
                condition
            }
        }
    }
}
