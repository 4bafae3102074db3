//! Concept interpreter
//!
//! The document index has no stored-query expansion; concepts always
//! degrade to the universal condition with a warning. (The SPARQL
//! backend expands them through its concept resolver.)

use crate::builder::SearchConditionBuilder;
use crate::condition::SearchCondition;
use sema_core::{PropertyRef, QueryMessage};
use sema_describe::{Description, DescriptionInterpreter, DescriptionNode};
use tracing::warn;

/// Degrades concept descriptions to the universal condition.
pub struct ConceptInterpreter;

impl DescriptionInterpreter<SearchConditionBuilder> for ConceptInterpreter {
    fn can_interpret(&self, description: &Description) -> bool {
        matches!(description.node, DescriptionNode::Concept { .. })
    }

    fn interpret(
        &self,
        builder: &mut SearchConditionBuilder,
        description: &Description,
        _join_var: &str,
        order_by: Option<&PropertyRef>,
    ) -> SearchCondition {
        let DescriptionNode::Concept { concept } = &description.node else {
            return SearchCondition::universal();
        };
        warn!(concept = %concept, "concept queries unsupported by this backend, degrading");
        builder.record_message(QueryMessage::unsupported(format!(
            "Concept queries are not supported by the search backend; '{concept}' was ignored.",
        )));
        let mut condition = SearchCondition::universal()
            .with_log(format!("concept '{concept}' degraded to match_all"));
        builder.add_order_by_data_for_property(&mut condition, order_by);
        condition
    }
}
