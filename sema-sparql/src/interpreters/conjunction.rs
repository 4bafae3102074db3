//! Conjunction interpreter

use crate::builder::ConditionBuilder;
use crate::condition::{Condition, ConditionKind};
use crate::pattern::{FilterExpr, GraphClause};
use crate::term::Term;
use sema_core::{DataItem, PropertyRef};
use sema_describe::{ConditionCompiler, Description, DescriptionInterpreter, DescriptionNode};
use tracing::debug;

/// Interprets a conjunction by building every child against the same
/// join variable and combining.
///
/// True children are identity elements; any False child makes the whole
/// conjunction False; two different singleton values cannot both hold.
/// Ordering is decided once for the conjunction as a whole, so children
/// build with no order-by property.
pub struct ConjunctionInterpreter;

impl DescriptionInterpreter<ConditionBuilder> for ConjunctionInterpreter {
    fn can_interpret(&self, description: &Description) -> bool {
        matches!(description.node, DescriptionNode::Conjunction(_))
    }

    fn interpret(
        &self,
        builder: &mut ConditionBuilder,
        description: &Description,
        join_var: &str,
        order_by: Option<&PropertyRef>,
    ) -> Condition {
        let DescriptionNode::Conjunction(children) = &description.node else {
            return Condition::universal();
        };

        let mut singleton: Option<(DataItem, Term)> = None;
        let mut clauses: Vec<GraphClause> = Vec::new();
        let mut filters: Vec<FilterExpr> = Vec::new();
        let mut aux = Condition::universal();

        for child in children {
            let mut built = builder.map_description(child, join_var, None);
            let kind = std::mem::replace(&mut built.kind, ConditionKind::True);
            match kind {
                ConditionKind::False => {
                    debug!("conjunction short-circuits to empty");
                    return Condition::empty();
                }
                ConditionKind::True => {}
                ConditionKind::Singleton {
                    element,
                    term,
                    clauses: inner,
                } => {
                    match &singleton {
                        Some((existing, _)) if *existing != element => {
                            // two different forced values cannot both hold
                            debug!("conflicting singletons, conjunction is empty");
                            return Condition::empty();
                        }
                        Some(_) => {}
                        None => singleton = Some((element, term)),
                    }
                    clauses.extend(inner);
                }
                ConditionKind::Where { clauses: inner } => clauses.extend(inner),
                ConditionKind::Filter { expr } => filters.push(expr),
            }
            aux.merge_aux(&mut built);
        }

        let mut condition = match singleton {
            Some((element, term)) => {
                if !filters.is_empty() {
                    clauses.push(GraphClause::Filter(FilterExpr::and(filters)));
                }
                Condition::singleton_with_pattern(element, term, clauses)
            }
            None if clauses.is_empty() && !filters.is_empty() => {
                Condition::filter(FilterExpr::and(filters))
            }
            None if !clauses.is_empty() => {
                if !filters.is_empty() {
                    clauses.push(GraphClause::Filter(FilterExpr::and(filters)));
                }
                Condition::pattern(clauses)
            }
            None => Condition::universal(),
        };

        condition.merge_aux(&mut aux);
        builder.add_order_by_data_for_property(&mut condition, join_var, order_by, None);
        condition
    }
}
