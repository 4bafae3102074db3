//! Class (category membership) interpreter

use crate::builder::SearchConditionBuilder;
use crate::condition::{BoolQuery, ClauseType, QueryPart, SearchCondition};
use crate::field::CATEGORY_FIELD;
use sema_core::{PropertyRef, QueryMessage};
use sema_describe::{Description, DescriptionInterpreter, DescriptionNode};
use serde_json::json;
use tracing::{debug, warn};

/// Interprets category membership as should-terms over the category
/// id field.
///
/// Inside a property scope there is no document to constrain, so the
/// condition degrades to universal with a warning.
pub struct ClassInterpreter;

impl DescriptionInterpreter<SearchConditionBuilder> for ClassInterpreter {
    fn can_interpret(&self, description: &Description) -> bool {
        matches!(description.node, DescriptionNode::Class { .. })
    }

    fn interpret(
        &self,
        builder: &mut SearchConditionBuilder,
        description: &Description,
        _join_var: &str,
        order_by: Option<&PropertyRef>,
    ) -> SearchCondition {
        let DescriptionNode::Class { categories } = &description.node else {
            return SearchCondition::universal();
        };

        if builder.current_scope().is_some() {
            warn!("class condition inside a property scope, degrading");
            builder.record_message(QueryMessage::unsupported(
                "A category condition cannot apply to a property value here; it was ignored.",
            ));
            return SearchCondition::universal();
        }

        if categories.is_empty() {
            return SearchCondition::empty();
        }

        let mut query = BoolQuery::new();
        let mut resolved = 0;
        for category in categories {
            match builder.mapper().page_id(category) {
                Some(id) => {
                    resolved += 1;
                    query.push(
                        ClauseType::Should,
                        QueryPart::Raw(json!({ "term": { (CATEGORY_FIELD): id } })),
                    );
                }
                None => debug!(category = %category, "unknown category, skipping branch"),
            }
        }
        if resolved == 0 {
            // none of the categories exist, nothing can be a member
            return SearchCondition::empty()
                .with_log("all categories unknown, matching nothing".to_string());
        }

        let mut condition = SearchCondition::query(query);
        builder.add_order_by_data_for_property(&mut condition, order_by);
        condition
    }
}
