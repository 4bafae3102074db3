//! Class (category membership) interpreter

use crate::builder::ConditionBuilder;
use crate::condition::Condition;
use crate::pattern::GraphClause;
use crate::term::Term;
use sema_core::{DataItemKind, PropertyRef};
use sema_describe::{Description, DescriptionInterpreter, DescriptionNode};

/// Interprets membership in at least one of a set of categories.
pub struct ClassInterpreter;

impl DescriptionInterpreter<ConditionBuilder> for ClassInterpreter {
    fn can_interpret(&self, description: &Description) -> bool {
        matches!(description.node, DescriptionNode::Class { .. })
    }

    fn interpret(
        &self,
        builder: &mut ConditionBuilder,
        description: &Description,
        join_var: &str,
        order_by: Option<&PropertyRef>,
    ) -> Condition {
        let DescriptionNode::Class { categories } = &description.node else {
            return Condition::universal();
        };

        // nothing to be a member of
        if categories.is_empty() {
            return Condition::empty();
        }

        let membership = builder.exporter().store_term(sema_vocab::store::INSTANCE_OF);
        let mut branches: Vec<Vec<GraphClause>> = categories
            .iter()
            .map(|category| {
                vec![GraphClause::Triple {
                    subject: Term::var(join_var),
                    predicate: membership.clone(),
                    object: builder.exporter().page_term(category),
                }]
            })
            .collect();

        let clauses = if branches.len() == 1 {
            branches.pop().unwrap_or_default()
        } else {
            vec![GraphClause::Union(branches)]
        };

        let mut condition = Condition::pattern(clauses);
        builder.add_order_by_data_for_property(
            &mut condition,
            join_var,
            order_by,
            Some(DataItemKind::Page),
        );
        condition
    }
}
