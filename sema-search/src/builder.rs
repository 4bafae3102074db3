//! Search condition builder
//!
//! The document-index counterpart of the SPARQL compound builder. The
//! recursion shape is identical; instead of join variables it threads a
//! *field scope*: the property whose typed fields the current
//! sub-description constrains. Subject scope (no property) is the top
//! of the tree.

use crate::condition::{QueryPart, SearchCondition};
use crate::field::{FieldMapper, PropertyFields, SUBJECT_SORT_FIELD};
use crate::interpreters::default_registry;
use sema_core::{
    BuildError, DataItem, EntityResolver, PropertyRef, QueryMessage, Result, TypeRegistry,
};
use serde_json::json;
use sema_describe::{
    BuildContext, ConditionCompiler, Description, InterpreterRegistry, SortKeys,
};
use std::sync::Arc;
use tracing::debug;

/// Recursive compiler from descriptions to search conditions.
pub struct SearchConditionBuilder {
    registry: Arc<InterpreterRegistry<SearchConditionBuilder>>,
    mapper: FieldMapper,
    ctx: BuildContext,
    scopes: Vec<PropertyFields>,
    messages: Vec<QueryMessage>,
}

impl SearchConditionBuilder {
    /// Create a builder over the default interpreter registry.
    pub fn new(resolver: Arc<dyn EntityResolver>, types: Arc<dyn TypeRegistry>) -> Self {
        Self::with_registry(FieldMapper::new(resolver, types), Arc::clone(default_registry()))
    }

    /// Create a builder with a custom registry.
    pub fn with_registry(
        mapper: FieldMapper,
        registry: Arc<InterpreterRegistry<SearchConditionBuilder>>,
    ) -> Self {
        Self {
            registry,
            mapper,
            ctx: BuildContext::new(),
            scopes: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// Set the sort keys, fluent.
    pub fn set_sort_keys(mut self, sort_keys: SortKeys) -> Self {
        self.ctx = std::mem::take(&mut self.ctx).with_sort_keys(sort_keys);
        self
    }

    /// The field mapper.
    pub fn mapper(&self) -> &FieldMapper {
        &self.mapper
    }

    /// The property scope the current sub-description constrains, if
    /// any; subject scope otherwise.
    pub fn current_scope(&self) -> Option<&PropertyFields> {
        self.scopes.last()
    }

    /// Enter a property scope for the duration of an inner build.
    pub fn push_scope(&mut self, fields: PropertyFields) {
        self.scopes.push(fields);
    }

    /// Leave the innermost property scope.
    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Record a degradation warning for the final result.
    pub fn record_message(&mut self, message: QueryMessage) {
        self.messages.push(message);
    }

    /// Exact-match query part for a property value.
    ///
    /// Entity values match by referenced page id; `None` when the page
    /// has no id (then nothing can reference it).
    pub fn exact_value_part(
        &self,
        fields: &PropertyFields,
        element: &DataItem,
    ) -> Option<QueryPart> {
        let value = match element {
            DataItem::Page(page) => json!(self.mapper.page_id(page)?),
            DataItem::Number(n) => json!(n),
            DataItem::Quantity { value, .. } => json!(value),
            DataItem::Boolean(b) => json!(b),
            other => json!(other.lexical_form().unwrap_or_default()),
        };
        Some(QueryPart::Raw(
            json!({ "term": { (fields.value_field()): value } }),
        ))
    }

    /// Drain the warnings collected during the last build.
    pub fn take_messages(&mut self) -> Vec<QueryMessage> {
        std::mem::take(&mut self.messages)
    }

    /// Build the condition for a whole description tree.
    pub fn build_condition(&mut self, description: &Description) -> Result<SearchCondition> {
        validate_sort_keys(self.ctx.sort_keys())?;
        self.ctx.reset();
        self.scopes.clear();
        let mut condition = self.map_description(description, "", None);
        self.add_missing_order_by_conditions(&mut condition)?;
        Ok(condition)
    }

    /// Bind the sort field a requested order-by property resolves to.
    ///
    /// No-op when `property` is `None` or the property has no id (the
    /// miss is logged; the post-pass raises if the key stays unbound).
    pub fn add_order_by_data_for_property(
        &mut self,
        condition: &mut SearchCondition,
        property: Option<&PropertyRef>,
    ) {
        let Some(property) = property else {
            return;
        };
        match self.mapper.property_fields(property) {
            Some(fields) => condition.order_by_field = Some(fields.sort_field()),
            None => {
                debug!(property = %property, "no field for order-by property");
                condition
                    .logs
                    .push(format!("order-by property '{property}' has no field"));
            }
        }
    }

    /// Guarantee every configured sort key ends up in `order_fields`.
    ///
    /// The empty key binds the subject sort field directly; property
    /// keys go through an auxiliary `SomeProperty(key, Thing)` build so
    /// the field resolution stays in one place.
    pub fn add_missing_order_by_conditions(
        &mut self,
        condition: &mut SearchCondition,
    ) -> Result<()> {
        let keys: Vec<String> = self
            .ctx
            .sort_keys()
            .iter()
            .map(|(k, _)| k.to_string())
            .collect();
        for key in keys {
            if condition.order_fields.contains_key(&key) {
                continue;
            }
            if key.is_empty() {
                condition
                    .order_fields
                    .insert(String::new(), SUBJECT_SORT_FIELD.to_string());
                continue;
            }
            let property = PropertyRef::new(&key);
            let auxiliary = Description::some_property(property.clone(), Description::thing());
            let mut aux = self.map_description(&auxiliary, "", Some(&property));
            let Some(field) = aux.order_fields.get(&key).cloned() else {
                return Err(BuildError::MissingOrderVariable(key));
            };
            condition.order_fields.insert(key, field);
            condition.logs.append(&mut aux.logs);
        }
        Ok(())
    }
}

impl ConditionCompiler for SearchConditionBuilder {
    type Condition = SearchCondition;

    fn map_description(
        &mut self,
        description: &Description,
        join_var: &str,
        order_by: Option<&PropertyRef>,
    ) -> SearchCondition {
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
