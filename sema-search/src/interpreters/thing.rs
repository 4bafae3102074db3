//! The universal (Thing) interpreter, also the dispatch default

use crate::builder::SearchConditionBuilder;
use crate::condition::SearchCondition;
use sema_core::PropertyRef;
use sema_describe::{Description, DescriptionInterpreter, DescriptionNode};

/// Interprets the universal description; matches everything.
pub struct ThingInterpreter;

impl DescriptionInterpreter<SearchConditionBuilder> for ThingInterpreter {
    fn can_interpret(&self, description: &Description) -> bool {
        matches!(description.node, DescriptionNode::Thing)
    }

    fn interpret(
        &self,
        builder: &mut SearchConditionBuilder,
        _description: &Description,
        _join_var: &str,
        order_by: Option<&PropertyRef>,
    ) -> SearchCondition {
        let mut condition = SearchCondition::universal();
        builder.add_order_by_data_for_property(&mut condition, order_by);
        condition
    }
}
