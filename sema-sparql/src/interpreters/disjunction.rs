//! Disjunction interpreter

use crate::builder::ConditionBuilder;
use crate::condition::{Condition, ConditionKind};
use crate::pattern::{rename_all, FilterExpr, GraphClause};
use crate::term::Term;
use sema_core::PropertyRef;
use sema_describe::{ConditionCompiler, Description, DescriptionInterpreter, DescriptionNode};
use tracing::debug;

/// Interprets a disjunction.
///
/// False children are identity elements; a True child short-circuits
/// the whole disjunction. Pattern children become UNION branches; a
/// pattern-free singleton degenerates to an equality filter. When both
/// branches and filters accumulate they cannot share a scope, so the
/// union moves onto a fresh variable inside an OPTIONAL and the filter
/// reconnects it: `OPTIONAL { ... } FILTER( orig = fresh || ... )`.
///
/// Order variables discovered inside disjuncts are dropped: a union has
/// no single consistent ordering source.
pub struct DisjunctionInterpreter;

impl DescriptionInterpreter<ConditionBuilder> for DisjunctionInterpreter {
    fn can_interpret(&self, description: &Description) -> bool {
        matches!(description.node, DescriptionNode::Disjunction(_))
    }

    fn interpret(
        &self,
        builder: &mut ConditionBuilder,
        description: &Description,
        join_var: &str,
        order_by: Option<&PropertyRef>,
    ) -> Condition {
        let DescriptionNode::Disjunction(children) = &description.node else {
            return Condition::universal();
        };

        let mut branches: Vec<Vec<GraphClause>> = Vec::new();
        let mut filters: Vec<FilterExpr> = Vec::new();
        let mut aux = Condition::universal();

        for child in children {
            let mut built = builder.map_description(child, join_var, None);
            let kind = std::mem::replace(&mut built.kind, ConditionKind::True);
            match kind {
                ConditionKind::True => {
                    debug!("disjunction short-circuits to universal");
                    let mut condition = Condition::universal();
                    builder.add_order_by_data_for_property(
                        &mut condition,
                        join_var,
                        order_by,
                        None,
                    );
                    return condition;
                }
                ConditionKind::False => continue,
                ConditionKind::Singleton {
                    term,
                    clauses: inner,
                    ..
                } => {
                    if inner.is_empty() {
                        filters.push(FilterExpr::var_equals(join_var, term));
                    } else {
                        let mut branch = inner;
                        branch.push(GraphClause::Filter(FilterExpr::var_equals(
                            join_var, term,
                        )));
                        branches.push(branch);
                    }
                }
                ConditionKind::Where { clauses: inner } => branches.push(inner),
                ConditionKind::Filter { expr } => filters.push(expr),
            }
            // order variables of individual disjuncts are dropped
            built.order_variables.clear();
            built.order_by_variable = None;
            aux.merge_aux(&mut built);
        }

        let mut condition = match (branches.is_empty(), filters.is_empty()) {
            (true, true) => Condition::empty(),
            (false, true) => Condition::pattern(union_clauses(branches)),
            (true, false) => Condition::filter(FilterExpr::or(filters)),
            (false, false) => {
                // A UNION cannot be ORed with a bare filter at the same
                // scope; move the union onto a fresh variable and let the
                // filter reconnect it.
                let fresh = builder.next_variable("v");
                for branch in &mut branches {
                    rename_all(branch, join_var, &fresh);
                }
                let mut or_parts =
                    vec![FilterExpr::var_equals(join_var, Term::var(&fresh))];
                or_parts.extend(filters);
                Condition::pattern(vec![
                    GraphClause::Optional(union_clauses(branches)),
                    GraphClause::Filter(FilterExpr::or(or_parts)),
                ])
            }
        };

        condition.merge_aux(&mut aux);
        builder.add_order_by_data_for_property(&mut condition, join_var, order_by, None);
        condition
    }
}

/// Wrap branches in a UNION, inlining a lone branch.
fn union_clauses(mut branches: Vec<Vec<GraphClause>>) -> Vec<GraphClause> {
    if branches.len() == 1 {
        branches.pop().unwrap_or_default()
    } else {
        vec![GraphClause::Union(branches)]
    }
}
