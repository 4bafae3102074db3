//! Conjunction interpreter

use crate::builder::SearchConditionBuilder;
use crate::condition::{BoolQuery, ClauseType, QueryPart, SearchCondition, SearchConditionKind};
use sema_core::{DataItem, PropertyRef};
use sema_describe::{ConditionCompiler, Description, DescriptionInterpreter, DescriptionNode};
use tracing::debug;

/// Interprets a conjunction: children combine into the must bucket.
///
/// The combination table matches the SPARQL backend: True children are
/// identity elements, any False child empties the whole conjunction,
/// and two different singleton values cannot both hold.
pub struct ConjunctionInterpreter;

impl DescriptionInterpreter<SearchConditionBuilder> for ConjunctionInterpreter {
    fn can_interpret(&self, description: &Description) -> bool {
        matches!(description.node, DescriptionNode::Conjunction(_))
    }

    fn interpret(
        &self,
        builder: &mut SearchConditionBuilder,
        description: &Description,
        join_var: &str,
        order_by: Option<&PropertyRef>,
    ) -> SearchCondition {
        let DescriptionNode::Conjunction(children) = &description.node else {
            return SearchCondition::universal();
        };

        let mut singleton: Option<DataItem> = None;
        let mut query = BoolQuery::new();
        let mut aux = SearchCondition::universal();

        for child in children {
            let mut built = builder.map_description(child, join_var, None);
            let kind = std::mem::replace(&mut built.kind, SearchConditionKind::True);
            match kind {
                SearchConditionKind::False => {
                    debug!("conjunction short-circuits to empty");
                    return SearchCondition::empty();
                }
                SearchConditionKind::True => {}
                SearchConditionKind::Singleton { element, query: inner } => {
                    match &singleton {
                        Some(existing) if *existing != element => {
                            debug!("conflicting singletons, conjunction is empty");
                            return SearchCondition::empty();
                        }
                        Some(_) => {}
                        None => singleton = Some(element),
                    }
                    if let Some(inner) = inner {
                        query.push(ClauseType::Must, QueryPart::Bool(Box::new(inner)));
                    }
                }
                SearchConditionKind::Query(inner) => {
                    query.push(ClauseType::Must, QueryPart::Bool(Box::new(inner)));
                }
            }
            aux.merge_aux(&mut built);
        }

        let mut condition = match singleton {
            Some(element) if query.is_empty() => SearchCondition::singleton(element),
            Some(element) => SearchCondition::singleton_with_query(element, query),
            None if query.is_empty() => SearchCondition::universal(),
            None => SearchCondition::query(query),
        };
        condition.merge_aux(&mut aux);
        builder.add_order_by_data_for_property(&mut condition, order_by);
        condition
    }
}
