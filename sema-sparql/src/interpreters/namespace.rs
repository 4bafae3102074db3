//! Namespace restriction interpreter

use crate::builder::ConditionBuilder;
use crate::condition::Condition;
use crate::pattern::GraphClause;
use crate::term::Term;
use sema_core::{DataItemKind, PropertyRef};
use sema_describe::{Description, DescriptionInterpreter, DescriptionNode};

/// Interprets a wiki-namespace restriction as a single equality pattern
/// against the namespace-encoding term.
pub struct NamespaceInterpreter;

impl DescriptionInterpreter<ConditionBuilder> for NamespaceInterpreter {
    fn can_interpret(&self, description: &Description) -> bool {
        matches!(description.node, DescriptionNode::Namespace { .. })
    }

    fn interpret(
        &self,
        builder: &mut ConditionBuilder,
        description: &Description,
        join_var: &str,
        order_by: Option<&PropertyRef>,
    ) -> Condition {
        let DescriptionNode::Namespace { namespace } = &description.node else {
            return Condition::universal();
        };

        let mut condition = Condition::pattern(vec![GraphClause::Triple {
            subject: Term::var(join_var),
            predicate: builder
                .exporter()
                .store_term(sema_vocab::store::PAGE_NAMESPACE),
            object: builder.exporter().namespace_literal(*namespace),
        }]);
        builder.add_order_by_data_for_property(
            &mut condition,
            join_var,
            order_by,
            Some(DataItemKind::Page),
        );
        condition
    }
}
