//! Property constraint interpreter

use crate::builder::ConditionBuilder;
use crate::condition::{Condition, ConditionKind};
use crate::pattern::GraphClause;
use crate::term::Term;
use sema_core::{DataItemKind, PropertyRef};
use sema_describe::{ConditionCompiler, Description, DescriptionInterpreter, DescriptionNode};

/// Interprets "has property P whose value matches the inner description".
///
/// The inner description builds against a fresh join variable. A
/// singleton inner result collapses into a constant object term - one
/// triple pattern instead of a variable plus an equality filter. An
/// inverse property swaps subject and object roles; the wire term is
/// always the canonical property.
pub struct SomePropertyInterpreter;

impl DescriptionInterpreter<ConditionBuilder> for SomePropertyInterpreter {
    fn can_interpret(&self, description: &Description) -> bool {
        matches!(description.node, DescriptionNode::SomeProperty { .. })
    }

    fn interpret(
        &self,
        builder: &mut ConditionBuilder,
        description: &Description,
        join_var: &str,
        order_by: Option<&PropertyRef>,
    ) -> Condition {
        let DescriptionNode::SomeProperty { property, inner } = &description.node else {
            return Condition::universal();
        };
        let canonical = property.canonical();

        // The property is its own sort target when the caller asked to
        // order by it; the inner build then exposes the order variable.
        let inner_order = if builder.sort_keys().contains(&canonical.key) {
            Some(canonical.clone())
        } else {
            None
        };

        let object_var = builder.next_variable("v");
        let mut inner_condition =
            builder.map_description(inner, &object_var, inner_order.as_ref());

        if matches!(inner_condition.kind, ConditionKind::False) {
            return Condition::empty();
        }

        let kind = builder.types().kind_of(&canonical);
        let predicate = builder.exporter().property_term(&canonical, kind);

        // Take the inner payload; a singleton's resolved term becomes the
        // object, everything else joins through the fresh variable.
        let taken = std::mem::replace(&mut inner_condition.kind, ConditionKind::True);
        let (object_term, nested, inline_filter) = match taken {
            ConditionKind::Singleton { term, clauses, .. } => (term, clauses, None),
            ConditionKind::Where { clauses } => (Term::var(&object_var), clauses, None),
            ConditionKind::Filter { expr } => (Term::var(&object_var), Vec::new(), Some(expr)),
            ConditionKind::True => (Term::var(&object_var), Vec::new(), None),
            ConditionKind::False => unreachable!("handled above"),
        };

        let (subject, object) = if property.inverse {
            (object_term, Term::var(join_var))
        } else {
            (Term::var(join_var), object_term)
        };

        let mut clauses = vec![GraphClause::Triple {
            subject,
            predicate,
            object,
        }];

        // Materialize the inner condition's weak patterns at this nesting
        // point; their variables live inside this scope from here on.
        let weak: Vec<GraphClause> =
            std::mem::take(&mut inner_condition.weak_conditions)
                .into_values()
                .map(GraphClause::Optional)
                .collect();

        if let Some(expr) = inline_filter {
            // a filter must stay in the scope of the variable it constrains
            clauses.extend(weak);
            clauses.push(GraphClause::Filter(expr));
        } else if !nested.is_empty() || !weak.is_empty() {
            let mut block = nested;
            block.extend(weak);
            clauses.push(GraphClause::Block(block));
        }

        let mut condition = Condition::pattern(clauses);
        condition.merge_aux(&mut inner_condition);

        // Propagate the inner order variable for this property when it
        // was the active sort target.
        if inner_order.is_some() {
            if let Some(order_var) = inner_condition.order_by_variable.clone() {
                condition
                    .order_variables
                    .insert(canonical.key.clone(), order_var);
            }
        }

        // The hint holds because a property condition always yields an
        // entity column. When the requested order is this property
        // itself, the propagation above already answered it.
        let outer_order = order_by.filter(|p| p.canonical().key != canonical.key);
        builder.add_order_by_data_for_property(
            &mut condition,
            join_var,
            outer_order,
            Some(DataItemKind::Page),
        );
        condition
    }
}
