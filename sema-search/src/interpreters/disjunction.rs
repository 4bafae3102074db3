//! Disjunction interpreter

use crate::builder::SearchConditionBuilder;
use crate::condition::{BoolQuery, ClauseType, QueryPart, SearchCondition, SearchConditionKind};
use crate::field::SUBJECT_ID_FIELD;
use sema_core::{DataItem, PropertyRef};
use sema_describe::{ConditionCompiler, Description, DescriptionInterpreter, DescriptionNode};
use serde_json::json;
use tracing::debug;

/// Interprets a disjunction: children combine into the should bucket.
///
/// False children are identity elements; a True child short-circuits
/// the whole disjunction. A pattern-free singleton degenerates to an
/// exact subject-id term. Order fields discovered inside disjuncts are
/// dropped, matching the SPARQL backend: a union has no single
/// consistent ordering source.
pub struct DisjunctionInterpreter;

impl DescriptionInterpreter<SearchConditionBuilder> for DisjunctionInterpreter {
    fn can_interpret(&self, description: &Description) -> bool {
        matches!(description.node, DescriptionNode::Disjunction(_))
    }

    fn interpret(
        &self,
        builder: &mut SearchConditionBuilder,
        description: &Description,
        join_var: &str,
        order_by: Option<&PropertyRef>,
    ) -> SearchCondition {
        let DescriptionNode::Disjunction(children) = &description.node else {
            return SearchCondition::universal();
        };

        let mut query = BoolQuery::new();
        let mut logs = Vec::new();

        for child in children {
            let mut built = builder.map_description(child, join_var, None);
            let kind = std::mem::replace(&mut built.kind, SearchConditionKind::True);
            logs.append(&mut built.logs);
            match kind {
                SearchConditionKind::True => {
                    debug!("disjunction short-circuits to universal");
                    let mut condition = SearchCondition::universal();
                    condition.logs = logs;
                    builder.add_order_by_data_for_property(&mut condition, order_by);
                    return condition;
                }
                SearchConditionKind::False => continue,
                SearchConditionKind::Singleton { element, query: inner } => {
                    let part = singleton_part(builder, &element, inner);
                    query.push(ClauseType::Should, part);
                }
                SearchConditionKind::Query(inner) => {
                    query.push(ClauseType::Should, QueryPart::Bool(Box::new(inner)));
                }
            }
            // order fields of individual disjuncts are dropped
        }

        let mut condition = if query.is_empty() {
            SearchCondition::empty()
        } else {
            SearchCondition::query(query)
        };
        condition.logs.splice(0..0, logs);
        builder.add_order_by_data_for_property(&mut condition, order_by);
        condition
    }
}

/// A should-branch for a singleton disjunct: property-scope singletons
/// become exact terms on the scope's field, subject-scope ones match
/// the subject id.
fn singleton_part(
    builder: &mut SearchConditionBuilder,
    element: &DataItem,
    inner: Option<BoolQuery>,
) -> QueryPart {
    let mut query = inner.unwrap_or_default();
    match builder.current_scope().cloned() {
        Some(scope) => {
            let part = builder
                .exact_value_part(&scope, element)
                .unwrap_or(QueryPart::Raw(json!({ "match_none": {} })));
            query.push(ClauseType::Must, part);
        }
        None => {
            if let DataItem::Page(page) = element {
                let part = match builder.mapper().page_id(page) {
                    Some(id) => json!({ "term": { (SUBJECT_ID_FIELD): id } }),
                    None => json!({ "match_none": {} }),
                };
                query.push(ClauseType::Must, QueryPart::Raw(part));
            }
        }
    }
    if query.is_empty() {
        QueryPart::Raw(json!({ "match_none": {} }))
    } else {
        QueryPart::Bool(Box::new(query))
    }
}
