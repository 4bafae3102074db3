//! Namespace restriction interpreter

use crate::builder::SearchConditionBuilder;
use crate::condition::{BoolQuery, ClauseType, QueryPart, SearchCondition};
use crate::field::SUBJECT_NAMESPACE_FIELD;
use sema_core::{PropertyRef, QueryMessage};
use sema_describe::{Description, DescriptionInterpreter, DescriptionNode};
use serde_json::json;
use tracing::warn;

/// Interprets a wiki-namespace restriction as a term filter on the
/// subject namespace field.
pub struct NamespaceInterpreter;

impl DescriptionInterpreter<SearchConditionBuilder> for NamespaceInterpreter {
    fn can_interpret(&self, description: &Description) -> bool {
        matches!(description.node, DescriptionNode::Namespace { .. })
    }

    fn interpret(
        &self,
        builder: &mut SearchConditionBuilder,
        description: &Description,
        _join_var: &str,
        order_by: Option<&PropertyRef>,
    ) -> SearchCondition {
        let DescriptionNode::Namespace { namespace } = &description.node else {
            return SearchCondition::universal();
        };

        if builder.current_scope().is_some() {
            warn!("namespace condition inside a property scope, degrading");
            builder.record_message(QueryMessage::unsupported(
                "A namespace condition cannot apply to a property value here; it was ignored.",
            ));
            return SearchCondition::universal();
        }

        let mut condition = SearchCondition::query(BoolQuery::single(
            ClauseType::Filter,
            QueryPart::Raw(json!({ "term": { (SUBJECT_NAMESPACE_FIELD): namespace } })),
        ));
        builder.add_order_by_data_for_property(&mut condition, order_by);
        condition
    }
}
