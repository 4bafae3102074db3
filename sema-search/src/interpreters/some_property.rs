//! Property constraint interpreter

use crate::builder::SearchConditionBuilder;
use crate::condition::{BoolQuery, ClauseType, QueryPart, SearchCondition, SearchConditionKind};
use sema_core::{PropertyRef, QueryMessage};
use sema_describe::{ConditionCompiler, Description, DescriptionInterpreter, DescriptionNode};
use serde_json::json;
use tracing::{debug, warn};

/// Interprets "has property P whose value matches the inner description".
///
/// The inner description builds inside the property's field scope. A
/// singleton inner result collapses into an exact term query; a
/// universal inner result into an existence check. Properties the store
/// has no id for match nothing; inverse traversal and nested entity
/// joins are not expressible against a flat document index and degrade
/// with a warning.
pub struct SomePropertyInterpreter;

impl DescriptionInterpreter<SearchConditionBuilder> for SomePropertyInterpreter {
    fn can_interpret(&self, description: &Description) -> bool {
        matches!(description.node, DescriptionNode::SomeProperty { .. })
    }

    fn interpret(
        &self,
        builder: &mut SearchConditionBuilder,
        description: &Description,
        join_var: &str,
        order_by: Option<&PropertyRef>,
    ) -> SearchCondition {
        let DescriptionNode::SomeProperty { property, inner } = &description.node else {
            return SearchCondition::universal();
        };
        let canonical = property.canonical();

        if property.inverse {
            warn!(property = %canonical.key, "inverse property unsupported by this backend");
            builder.record_message(QueryMessage::unsupported(format!(
                "Inverse property conditions are not supported by the search backend; \
                 '{}' was ignored.",
                canonical.key
            )));
            return SearchCondition::universal();
        }

        let Some(fields) = builder.mapper().property_fields(&canonical) else {
            debug!(property = %canonical.key, "unknown property, matching nothing");
            return SearchCondition::empty()
                .with_log(format!("property '{}' has no field", canonical.key));
        };

        if matches!(
            inner.node,
            DescriptionNode::SomeProperty { .. }
        ) {
            warn!(property = %canonical.key, "nested property chain unsupported by this backend");
            builder.record_message(QueryMessage::unsupported(format!(
                "Property chains are not supported by the search backend; only the \
                 existence of '{}' was required.",
                canonical.key
            )));
            let mut condition = SearchCondition::query(BoolQuery::single(
                ClauseType::Must,
                QueryPart::Raw(json!({ "exists": { "field": fields.exists_field() } })),
            ));
            builder.add_order_by_data_for_property(&mut condition, order_by);
            return condition;
        }

        let inner_order = if builder.sort_keys().contains(&canonical.key) {
            Some(canonical.clone())
        } else {
            None
        };

        builder.push_scope(fields.clone());
        let mut inner_condition = builder.map_description(inner, join_var, inner_order.as_ref());
        builder.pop_scope();

        let taken = std::mem::replace(&mut inner_condition.kind, SearchConditionKind::True);
        let part = match taken {
            SearchConditionKind::False => return SearchCondition::empty(),
            SearchConditionKind::True => {
                QueryPart::Raw(json!({ "exists": { "field": fields.exists_field() } }))
            }
            SearchConditionKind::Singleton {
                element,
                query: constraint,
            } => {
                match builder.exact_value_part(&fields, &element) {
                    Some(part) => match constraint {
                        // keep the singleton's own constraints alongside
                        Some(mut constrained) => {
                            constrained.push(ClauseType::Must, part);
                            QueryPart::Bool(Box::new(constrained))
                        }
                        None => part,
                    },
                    None => {
                        // the referenced page does not exist, nothing matches
                        return SearchCondition::empty().with_log(format!(
                            "value of '{}' resolves to no id",
                            fields.key
                        ));
                    }
                }
            }
            SearchConditionKind::Query(query) => QueryPart::Bool(Box::new(query)),
        };

        let mut condition = SearchCondition::query(BoolQuery::single(ClauseType::Must, part));
        condition.merge_aux(&mut inner_condition);

        if inner_order.is_some() {
            if let Some(field) = inner_condition.order_by_field.clone() {
                condition.order_fields.insert(canonical.key.clone(), field);
            }
        }

        // When the requested order is this property itself, the
        // propagation above already answered it.
        let outer_order = order_by.filter(|p| p.canonical().key != canonical.key);
        builder.add_order_by_data_for_property(&mut condition, outer_order);
        condition
    }
}
