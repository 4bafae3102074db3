//! Value comparison interpreter

use crate::builder::ConditionBuilder;
use crate::condition::{Condition, ConditionKind};
use crate::pattern::{like_pattern_to_regex, FilterExpr};
use crate::term::Term;
use sema_core::{Comparator, DataItem, PropertyRef, QueryMessage};
use sema_describe::{Description, DescriptionInterpreter, DescriptionNode};
use tracing::warn;

/// Interprets a comparison of the join variable against a constant.
///
/// Equality collapses to a singleton; LIKE translates to a regex filter
/// on text-like kinds and degrades to the universal condition otherwise;
/// ordering comparators become filters on the order-by variable. The
/// degradations are deliberate: a query must lose precision rather than
/// fail as a whole.
pub struct ValueInterpreter;

impl DescriptionInterpreter<ConditionBuilder> for ValueInterpreter {
    fn can_interpret(&self, description: &Description) -> bool {
        matches!(description.node, DescriptionNode::Value { .. })
    }

    fn interpret(
        &self,
        builder: &mut ConditionBuilder,
        description: &Description,
        join_var: &str,
        order_by: Option<&PropertyRef>,
    ) -> Condition {
        let DescriptionNode::Value { value, comparator } = &description.node else {
            return Condition::universal();
        };

        let mut condition = match comparator {
            Comparator::Eq => {
                let term = builder.exporter().data_item_term(value);
                Condition::singleton(value.clone(), term)
            }
            Comparator::Like | Comparator::NotLike => {
                self.like_condition(builder, value, *comparator, join_var)
            }
            ordering => self.ordering_condition(builder, value, *ordering, join_var),
        };

        builder.add_order_by_data_for_property(
            &mut condition,
            join_var,
            order_by,
            Some(value.kind()),
        );
        condition
    }
}

impl ValueInterpreter {
    fn like_condition(
        &self,
        builder: &mut ConditionBuilder,
        value: &DataItem,
        comparator: Comparator,
        join_var: &str,
    ) -> Condition {
        if !value.kind().is_text_like() {
            warn!(kind = ?value.kind(), "LIKE on non-text value, degrading to universal");
            builder.record_message(QueryMessage::unsupported(
                "Pattern matching is only supported for text values; the condition was ignored.",
            ));
            return Condition::universal();
        }
        let pattern = like_pattern_to_regex(&value.lexical_form().unwrap_or_default());
        Condition::filter(FilterExpr::Regex {
            term: Term::var(join_var),
            pattern,
            negated: comparator == Comparator::NotLike,
        })
    }

    fn ordering_condition(
        &self,
        builder: &mut ConditionBuilder,
        value: &DataItem,
        comparator: Comparator,
        join_var: &str,
    ) -> Condition {
        // An empty filter carrying just the order-by allocation; the
        // comparison then targets whatever variable ordering bound
        // (entity references route through the sort-key hop).
        let mut condition = Condition::pattern(Vec::new());
        builder.add_order_by_data(&mut condition, join_var, value.kind());
        let order_var = condition
            .order_by_variable
            .clone()
            .unwrap_or_else(|| join_var.to_string());

        let expr = FilterExpr::Compare {
            lhs: Term::var(order_var),
            op: comparator,
            rhs: builder.exporter().comparison_literal(value),
        };
        expr.collect_namespaces(&mut condition.namespaces);
        condition.kind = ConditionKind::Filter { expr };
        condition
    }
}
