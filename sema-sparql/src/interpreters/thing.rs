//! The universal (Thing) interpreter, also the dispatch default

use crate::builder::ConditionBuilder;
use crate::condition::Condition;
use sema_core::PropertyRef;
use sema_describe::{Description, DescriptionInterpreter, DescriptionNode};

/// Interprets the universal description; matches everything.
pub struct ThingInterpreter;

impl DescriptionInterpreter<ConditionBuilder> for ThingInterpreter {
    fn can_interpret(&self, description: &Description) -> bool {
        matches!(description.node, DescriptionNode::Thing)
    }

    fn interpret(
        &self,
        builder: &mut ConditionBuilder,
        _description: &Description,
        join_var: &str,
        order_by: Option<&PropertyRef>,
    ) -> Condition {
        let mut condition = Condition::universal();
        // no hint: the join variable holds whatever the order-by
        // property's registry kind says
        builder.add_order_by_data_for_property(&mut condition, join_var, order_by, None);
        condition
    }
}
