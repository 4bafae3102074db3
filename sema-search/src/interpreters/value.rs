//! Value comparison interpreter

use crate::builder::SearchConditionBuilder;
use crate::condition::{BoolQuery, ClauseType, QueryPart, SearchCondition};
use crate::field::{PropertyFields, SUBJECT_SORT_FIELD};
use sema_core::{Comparator, DataItem, PropertyRef, QueryMessage};
use sema_describe::{Description, DescriptionInterpreter, DescriptionNode};
use serde_json::{json, Value};
use tracing::warn;

/// Interprets a comparison against a constant.
///
/// In a property scope the comparison targets the property's typed
/// fields: equality collapses to a singleton (the enclosing property
/// interpreter turns it into an exact term query), ordering comparators
/// become range clauses, LIKE becomes a regexp on the text field. At
/// subject scope only page equality and sort-key patterns are
/// expressible; everything else degrades to universal with a warning.
pub struct ValueInterpreter;

impl DescriptionInterpreter<SearchConditionBuilder> for ValueInterpreter {
    fn can_interpret(&self, description: &Description) -> bool {
        matches!(description.node, DescriptionNode::Value { .. })
    }

    fn interpret(
        &self,
        builder: &mut SearchConditionBuilder,
        description: &Description,
        _join_var: &str,
        order_by: Option<&PropertyRef>,
    ) -> SearchCondition {
        let DescriptionNode::Value { value, comparator } = &description.node else {
            return SearchCondition::universal();
        };

        let mut condition = match builder.current_scope().cloned() {
            Some(scope) => self.in_property_scope(builder, &scope, value, *comparator),
            None => self.in_subject_scope(builder, value, *comparator),
        };
        builder.add_order_by_data_for_property(&mut condition, order_by);
        condition
    }
}

impl ValueInterpreter {
    fn in_property_scope(
        &self,
        builder: &mut SearchConditionBuilder,
        scope: &PropertyFields,
        value: &DataItem,
        comparator: Comparator,
    ) -> SearchCondition {
        match comparator {
            Comparator::Eq => SearchCondition::singleton(value.clone()),
            Comparator::Like | Comparator::NotLike => {
                if !value.kind().is_text_like() {
                    warn!(kind = ?value.kind(), "LIKE on non-text value, degrading to universal");
                    builder.record_message(QueryMessage::unsupported(
                        "Pattern matching is only supported for text values; the condition was ignored.",
                    ));
                    return SearchCondition::universal();
                }
                let part = QueryPart::Raw(regexp_query(
                    &scope.text_field(),
                    &value.lexical_form().unwrap_or_default(),
                ));
                let clause = if comparator == Comparator::NotLike {
                    ClauseType::MustNot
                } else {
                    ClauseType::Must
                };
                SearchCondition::query(BoolQuery::single(clause, part))
            }
            Comparator::Neq => {
                let part = QueryPart::Raw(term_query(scope, value, builder));
                SearchCondition::query(BoolQuery::single(ClauseType::MustNot, part))
            }
            ordering => {
                let bound = match ordering {
                    Comparator::Less => "lt",
                    Comparator::Greater => "gt",
                    Comparator::Leq => "lte",
                    Comparator::Geq => "gte",
                    _ => unreachable!("remaining comparators handled above"),
                };
                let part = QueryPart::Raw(json!({
                    "range": { (scope.sort_field()): { (bound): comparison_value(value) } }
                }));
                SearchCondition::query(BoolQuery::single(ClauseType::Must, part))
            }
        }
    }

    fn in_subject_scope(
        &self,
        builder: &mut SearchConditionBuilder,
        value: &DataItem,
        comparator: Comparator,
    ) -> SearchCondition {
        match (comparator, value) {
            (Comparator::Eq, DataItem::Page(_)) => SearchCondition::singleton(value.clone()),
            (Comparator::Like | Comparator::NotLike, _) if value.kind().is_text_like() => {
                let part = QueryPart::Raw(regexp_query(
                    SUBJECT_SORT_FIELD,
                    &value.lexical_form().unwrap_or_default(),
                ));
                let clause = if comparator == Comparator::NotLike {
                    ClauseType::MustNot
                } else {
                    ClauseType::Must
                };
                SearchCondition::query(BoolQuery::single(clause, part))
            }
            _ => {
                warn!(?comparator, "unsupported subject-level comparison, degrading");
                builder.record_message(QueryMessage::unsupported(
                    "This value comparison is not expressible here; the condition was ignored.",
                ));
                SearchCondition::universal()
            }
        }
    }
}

/// Exact-match term query for a value in a property scope.
fn term_query(
    scope: &PropertyFields,
    value: &DataItem,
    builder: &mut SearchConditionBuilder,
) -> Value {
    match value {
        DataItem::Page(page) => match builder.mapper().page_id(page) {
            Some(id) => json!({ "term": { (scope.value_field()): id } }),
            // an unknown page can never be referenced
            None => json!({ "match_none": {} }),
        },
        other => json!({ "term": { (scope.value_field()): comparison_value(other) } }),
    }
}

/// The JSON value a comparison compares against.
///
/// Entity references compare through their sort key; numbers stay
/// numeric so range semantics hold.
fn comparison_value(value: &DataItem) -> Value {
    match value {
        DataItem::Page(page) => json!(page.sort_key()),
        DataItem::Number(n) => json!(n),
        DataItem::Quantity { value: n, .. } => json!(n),
        DataItem::Boolean(b) => json!(b),
        other => json!(other.lexical_form().unwrap_or_default()),
    }
}

/// A regexp query from a SQL-LIKE wildcard pattern.
///
/// The index's regexp matching is implicitly anchored, so no `^`/`$`
/// are added: `%` maps to `.*`, `_` to `.`, `\` escapes, and the rest
/// is regex-escaped.
fn regexp_query(field: &str, pattern: &str) -> Value {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '%' => out.push_str(".*"),
            '_' => out.push('.'),
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push_str(&regex::escape(&escaped.to_string()));
                }
            }
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    json!({ "regexp": { (field): out } })
}
