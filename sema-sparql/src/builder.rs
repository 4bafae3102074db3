//! Compound condition builder
//!
//! Owns variable allocation, sort-key bookkeeping, and the top-level
//! recursive descent. After the tree is built it back-fills order-by
//! bindings for sort keys the recursion never touched, then adds the
//! redirect-resolution pattern and the redirect-exclusion filter.
//!
//! One builder serves one build at a time; instantiate per request or
//! serialize access (the `&mut` recursion makes reentrant use a compile
//! error rather than a footgun).

use crate::condition::{Condition, ConditionKind};
use crate::interpreters::default_registry;
use crate::pattern::{FilterExpr, GraphClause};
use crate::term::{Exporter, Term};
use sema_core::{
    BuildError, DataItem, DataItemKind, PageRef, PropertyRef, QueryMessage, Result, TypeRegistry,
};
use sema_describe::{
    BuildContext, ConceptResolver, ConditionCompiler, Description, InterpreterRegistry, SortKeys,
};
use std::sync::Arc;
use tracing::debug;

/// Recursive compiler from descriptions to SPARQL conditions.
pub struct ConditionBuilder {
    registry: Arc<InterpreterRegistry<ConditionBuilder>>,
    types: Arc<dyn TypeRegistry>,
    concepts: Option<Arc<dyn ConceptResolver>>,
    exporter: Exporter,
    ctx: BuildContext,
    concept_stack: Vec<PageRef>,
    messages: Vec<QueryMessage>,
}

impl ConditionBuilder {
    /// Create a builder over the default interpreter registry.
    pub fn new(types: Arc<dyn TypeRegistry>) -> Self {
        Self::with_registry(types, Arc::clone(default_registry()))
    }

    /// Create a builder with a custom registry.
    pub fn with_registry(
        types: Arc<dyn TypeRegistry>,
        registry: Arc<InterpreterRegistry<ConditionBuilder>>,
    ) -> Self {
        Self {
            registry,
            types,
            concepts: None,
            exporter: Exporter,
            ctx: BuildContext::new(),
            concept_stack: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// Attach a concept resolver, fluent.
    pub fn with_concept_resolver(mut self, concepts: Arc<dyn ConceptResolver>) -> Self {
        self.concepts = Some(concepts);
        self
    }

    /// Set the result variable, fluent.
    pub fn set_result_variable(mut self, name: impl Into<String>) -> Self {
        self.ctx = std::mem::take(&mut self.ctx).with_result_variable(name.into());
        self
    }

    /// Set the sort keys, fluent.
    pub fn set_sort_keys(mut self, sort_keys: SortKeys) -> Self {
        self.ctx = std::mem::take(&mut self.ctx).with_sort_keys(sort_keys);
        self
    }

    /// The term exporter.
    pub fn exporter(&self) -> Exporter {
        self.exporter
    }

    /// The property type registry.
    pub fn types(&self) -> &dyn TypeRegistry {
        self.types.as_ref()
    }

    /// Record a degradation warning for the final result.
    pub fn record_message(&mut self, message: QueryMessage) {
        self.messages.push(message);
    }

    /// Drain the warnings collected during the last build.
    pub fn take_messages(&mut self) -> Vec<QueryMessage> {
        std::mem::take(&mut self.messages)
    }

    /// Look up a concept definition, guarding against cyclic expansion.
    ///
    /// Returns `None` when no resolver is attached, the concept is
    /// undefined, or it is already being expanded further up the stack.
    pub fn resolve_concept(&mut self, concept: &PageRef) -> Option<Description> {
        if self.concept_stack.contains(concept) {
            debug!(concept = %concept, "cyclic concept expansion, degrading");
            return None;
        }
        self.concepts
            .as_ref()
            .and_then(|c| c.concept_description(concept))
    }

    /// Push a concept onto the expansion stack for the duration of its
    /// recursive build.
    pub fn enter_concept(&mut self, concept: PageRef) {
        self.concept_stack.push(concept);
    }

    /// Pop the concept expansion stack.
    pub fn exit_concept(&mut self) {
        self.concept_stack.pop();
    }

    /// Build the condition for a whole description tree.
    ///
    /// Resets the variable counter, recurses from the result variable,
    /// back-fills missing order-by bindings, and applies the redirect
    /// passes.
    pub fn build_condition(&mut self, description: &Description) -> Result<Condition> {
        validate_sort_keys(self.ctx.sort_keys())?;
        self.ctx.reset();
        let result_var = self.ctx.result_variable().to_string();
        let mut condition = self.map_description(description, &result_var, None);
        self.add_missing_order_by_conditions(&mut condition)?;
        self.add_property_path_to_match_redirect_targets(&mut condition);
        self.add_filter_to_remove_entities_that_contain_redirect_predicate(&mut condition);
        Ok(condition)
    }

    /// Attach order-by data for a property, if one was requested.
    ///
    /// No-op when `property` is `None`. The value kind decides the
    /// ordering strategy; `hint` short-cuts the registry lookup when
    /// the caller already knows the kind.
    pub fn add_order_by_data_for_property(
        &mut self,
        condition: &mut Condition,
        main_variable: &str,
        property: Option<&PropertyRef>,
        hint: Option<DataItemKind>,
    ) {
        let Some(property) = property else {
            return;
        };
        let kind = hint.unwrap_or_else(|| self.types.kind_of(&property.canonical()));
        self.add_order_by_data(condition, main_variable, kind);
    }

    /// Bind the variable this condition would be ordered by.
    ///
    /// Entity references have no direct order; their sortable value is
    /// only reachable through the sort-key property, bound by a weak
    /// condition that stays dormant until ordering is actually
    /// serialized. Every other kind orders on the variable itself.
    pub fn add_order_by_data(
        &mut self,
        condition: &mut Condition,
        main_variable: &str,
        kind: DataItemKind,
    ) {
        if kind.is_entity_reference() {
            let sk_variable = format!("{main_variable}sk");
            condition.weak_conditions.insert(
                sk_variable.clone(),
                vec![GraphClause::Triple {
                    subject: Term::var(main_variable),
                    predicate: self.exporter.store_term(sema_vocab::store::SORT_KEY),
                    object: Term::var(&sk_variable),
                }],
            );
            condition
                .namespaces
                .insert(sema_vocab::prefixes::STORE.0);
            condition.order_by_variable = Some(sk_variable);
        } else {
            condition.order_by_variable = Some(main_variable.to_string());
        }
    }

    /// Guarantee every configured sort key ends up in `order_variables`.
    ///
    /// Keys never touched by the recursion get an auxiliary
    /// `SomeProperty(key, Thing)` built against the result variable; the
    /// auxiliary pattern is spliced in as a weak condition so ordering
    /// support never narrows the result set.
    pub fn add_missing_order_by_conditions(&mut self, condition: &mut Condition) -> Result<()> {
        let result_var = self.ctx.result_variable().to_string();
        let keys: Vec<String> = self
            .ctx
            .sort_keys()
            .iter()
            .map(|(k, _)| k.to_string())
            .collect();
        for key in keys {
            if condition.order_variables.contains_key(&key) {
                continue;
            }
            if key.is_empty() {
                // the implicit subject sort key
                self.add_order_by_data(condition, &result_var, DataItemKind::Page);
                if let Some(var) = condition.order_by_variable.clone() {
                    condition.order_variables.insert(String::new(), var);
                }
            } else {
                self.add_order_by_condition_for_property(condition, &result_var, &key)?;
            }
        }
        Ok(())
    }

    fn add_order_by_condition_for_property(
        &mut self,
        condition: &mut Condition,
        result_var: &str,
        key: &str,
    ) -> Result<()> {
        let property = PropertyRef::new(key);
        let auxiliary =
            Description::some_property(property.clone(), Description::thing());
        let mut aux_condition =
            self.map_description(&auxiliary, result_var, Some(&property));

        let Some(order_var) = aux_condition.order_variables.get(key).cloned() else {
            return Err(BuildError::MissingOrderVariable(key.to_string()));
        };

        // The auxiliary pattern and its own weak conditions together form
        // the weak condition backing this order variable.
        let mut weak_clauses: Vec<GraphClause> = aux_condition.clauses().to_vec();
        for (_, mut clauses) in std::mem::take(&mut aux_condition.weak_conditions) {
            weak_clauses.append(&mut clauses);
        }
        condition.order_variables.insert(key.to_string(), order_var.clone());
        condition.weak_conditions.insert(order_var, weak_clauses);
        condition.namespaces.append(&mut aux_condition.namespaces);
        Ok(())
    }

    /// Let a singleton match succeed through redirect hops.
    ///
    /// `ASK { wiki:X (sema:redirectsTo)* ?r1 . <pattern on ?r1> }`:
    /// zero hops is the direct match, more hops follow aliases to their
    /// target. Only singletons over pages with a real pattern qualify;
    /// a pattern-free singleton never reaches the backend.
    fn add_property_path_to_match_redirect_targets(&mut self, condition: &mut Condition) {
        let result_var = self.ctx.result_variable().to_string();
        let ConditionKind::Singleton {
            element: DataItem::Page(_),
            term,
            clauses,
        } = &mut condition.kind
        else {
            return;
        };
        if clauses.is_empty() {
            return;
        }
        let redirect_var = self.ctx.next_variable("r");
        crate::pattern::rename_all(clauses, &result_var, &redirect_var);
        clauses.insert(
            0,
            GraphClause::Path {
                subject: term.clone(),
                predicate: self.exporter.store_term(sema_vocab::store::REDIRECTS_TO),
                object: Term::var(&redirect_var),
            },
        );
        condition.namespaces.insert(sema_vocab::prefixes::STORE.0);
        debug!(variable = %redirect_var, "added redirect property path");
    }

    /// Exclude redirect (alias) pages from the result set.
    ///
    /// Added as a cogent condition: an OPTIONAL bound-check that holds
    /// regardless of the condition's own safety.
    fn add_filter_to_remove_entities_that_contain_redirect_predicate(
        &mut self,
        condition: &mut Condition,
    ) {
        match condition.kind {
            ConditionKind::False | ConditionKind::Singleton { .. } => return,
            _ => {}
        }
        let result_var = self.ctx.result_variable().to_string();
        let check_var = self.ctx.next_variable("o");
        condition.cogent_conditions.push(GraphClause::Optional(vec![
            GraphClause::Triple {
                subject: Term::var(&result_var),
                predicate: self.exporter.store_term(sema_vocab::store::REDIRECTS_TO),
                object: Term::var(&check_var),
            },
        ]));
        condition
            .cogent_conditions
            .push(GraphClause::Filter(FilterExpr::Bound {
                var: check_var,
                negated: true,
            }));
        condition.namespaces.insert(sema_vocab::prefixes::STORE.0);
    }
}

impl ConditionCompiler for ConditionBuilder {
    type Condition = Condition;

    fn map_description(
        &mut self,
        description: &Description,
        join_var: &str,
        order_by: Option<&PropertyRef>,
    ) -> Condition {
        let registry = Arc::clone(&self.registry);
        let interpreter = registry.interpreter_for(description);
        interpreter.interpret(self, description, join_var, order_by)
    }

    fn next_variable(&mut self, prefix: &str) -> String {
        self.ctx.next_variable(prefix)
    }

    fn sort_keys(&self) -> &SortKeys {
        self.ctx.sort_keys()
    }

    fn context(&self) -> &BuildContext {
        &self.ctx
    }
}

/// Reject sort keys that cannot name a property.
fn validate_sort_keys(sort_keys: &SortKeys) -> Result<()> {
    for (key, _) in sort_keys.iter() {
        if key.contains(['?', '\n', '#']) {
            return Err(BuildError::InvalidSortKey(key.to_string()));
        }
    }
    Ok(())
}
