//! Query engine orchestration
//!
//! Builds the condition once, then branches on the query mode. Trivial
//! outcomes (False, pattern-free singletons) never touch the backend;
//! singletons with a pattern become ASK queries; everything else runs
//! as COUNT or SELECT with look-ahead pagination. DEBUG renders the
//! query text instead of executing it.

use crate::builder::ConditionBuilder;
use crate::condition::{Condition, ConditionKind};
use crate::connection::{ConnectionError, SparqlConnection};
use crate::result::convert_entities;
use crate::serializer::{ask_query, count_query, select_query, SelectOptions};
use sema_core::{DataItem, QueryMessage, Result, TypeRegistry};
use sema_describe::{
    ConceptResolver, ConditionCompiler, Query, QueryMode, QueryResult,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Size budget for incoming description trees.
const MAX_DESCRIPTION_SIZE: usize = 64;

/// Depth budget for incoming description trees.
const MAX_DESCRIPTION_DEPTH: usize = 8;

/// The SPARQL query engine.
///
/// One engine instance serves many queries; every call builds its own
/// condition builder, so concurrent calls never share mutable state.
pub struct SparqlQueryEngine<C> {
    connection: C,
    types: Arc<dyn TypeRegistry>,
    concepts: Option<Arc<dyn ConceptResolver>>,
}

impl<C: SparqlConnection> SparqlQueryEngine<C> {
    /// Create an engine over a connection and type registry.
    pub fn new(connection: C, types: Arc<dyn TypeRegistry>) -> Self {
        Self {
            connection,
            types,
            concepts: None,
        }
    }

    /// Attach a concept resolver, fluent.
    pub fn with_concept_resolver(mut self, concepts: Arc<dyn ConceptResolver>) -> Self {
        self.concepts = Some(concepts);
        self
    }

    /// Execute a query and adapt the answer.
    ///
    /// Backend failures surface as messages on the result; only
    /// structural build errors propagate as `Err`.
    pub async fn get_query_result(&self, query: &Query) -> Result<QueryResult> {
        if query.mode == QueryMode::None {
            return Ok(QueryResult::empty(query.errors.clone()));
        }
        if query.is_known_bad() {
            debug!("query carries errors, skipping condition build");
            return Ok(QueryResult::empty(query.errors.clone()));
        }

        let mut messages = query.errors.clone();
        let mut description = query.description.clone();
        if description.prune(MAX_DESCRIPTION_SIZE, MAX_DESCRIPTION_DEPTH) {
            messages.push(QueryMessage::unsupported(
                "The query was too complex and was simplified; results may be broader than requested.",
            ));
        }

        let mut builder = ConditionBuilder::new(Arc::clone(&self.types))
            .set_sort_keys(query.sort_keys.clone());
        if let Some(concepts) = &self.concepts {
            builder = builder.with_concept_resolver(Arc::clone(concepts));
        }
        let condition = builder.build_condition(&description)?;
        messages.append(&mut builder.take_messages());
        let result_var = builder.context().result_variable().to_string();

        let mut result = match query.mode {
            QueryMode::Count => self.count_result(&condition, &result_var).await,
            QueryMode::Debug => self.debug_result(query, &condition, &result_var),
            QueryMode::Instance => self.instance_result(query, &condition, &result_var).await,
            QueryMode::None => unreachable!("handled above"),
        };
        result.messages.splice(0..0, messages);
        Ok(result)
    }

    async fn count_result(&self, condition: &Condition, result_var: &str) -> QueryResult {
        match &condition.kind {
            ConditionKind::False => QueryResult::of_count(0),
            ConditionKind::Singleton { clauses, .. } if clauses.is_empty() => {
                // trivially known without touching the backend
                QueryResult::of_count(1)
            }
            ConditionKind::Singleton { .. } => {
                match self.connection.ask(&ask_query(condition, result_var)).await {
                    Ok(answer) => QueryResult::of_count(answer.is_true.into()),
                    Err(e) => unreachable_result(e),
                }
            }
            _ => {
                let query = count_query(condition, result_var);
                match self.connection.select_count(&query).await {
                    Ok(response) => {
                        let count = response
                            .column_values("count")
                            .next()
                            .and_then(|c| c.parse::<u64>().ok())
                            .unwrap_or(0);
                        let mut result = QueryResult::of_count(count);
                        if response.incomplete {
                            result = result.with_message(QueryMessage::incomplete());
                        }
                        result
                    }
                    Err(e) => unreachable_result(e),
                }
            }
        }
    }

    async fn instance_result(
        &self,
        query: &Query,
        condition: &Condition,
        result_var: &str,
    ) -> QueryResult {
        match &condition.kind {
            ConditionKind::False => QueryResult::empty(Vec::new()),
            ConditionKind::Singleton {
                element, clauses, ..
            } if clauses.is_empty() => singleton_entities(element),
            ConditionKind::Singleton { element, .. } => {
                match self.connection.ask(&ask_query(condition, result_var)).await {
                    Ok(answer) if answer.is_true => singleton_entities(element),
                    Ok(_) => QueryResult::empty(Vec::new()),
                    Err(e) => unreachable_result(e),
                }
            }
            _ => {
                let options = self.select_options(query, condition);
                let text = select_query(condition, result_var, &options);
                match self.connection.select(&text).await {
                    Ok(response) => {
                        let (entities, has_more) =
                            convert_entities(response.column_values(result_var), query.limit);
                        let mut result = QueryResult::of_entities(entities, has_more);
                        if response.incomplete {
                            result = result.with_message(QueryMessage::incomplete());
                        }
                        result
                    }
                    Err(e) => unreachable_result(e),
                }
            }
        }
    }

    fn debug_result(&self, query: &Query, condition: &Condition, result_var: &str) -> QueryResult {
        let text = match &condition.kind {
            ConditionKind::False => "Empty result, no query needed.".to_string(),
            ConditionKind::Singleton { clauses, .. } if clauses.is_empty() => {
                "Singleton result, no query needed.".to_string()
            }
            ConditionKind::Singleton { .. } => ask_query(condition, result_var),
            _ => select_query(condition, result_var, &self.select_options(query, condition)),
        };
        QueryResult::of_debug(text)
    }

    /// SELECT options: distinct, look-ahead limit, and the ORDER BY
    /// entries the sort keys resolve to through `order_variables`.
    fn select_options(&self, query: &Query, condition: &Condition) -> SelectOptions {
        let mut order_by = Vec::new();
        for (key, direction) in query.sort_keys.iter() {
            match condition.order_variables.get(key) {
                Some(variable) => order_by.push((variable.clone(), direction)),
                None => {
                    // post-pass guarantees a binding; a miss here means a
                    // disjunction dropped it, which is documented behavior
                    warn!(key, "sort key has no order variable, skipping");
                }
            }
        }
        SelectOptions {
            distinct: true,
            limit: Some(query.limit + 1),
            offset: query.offset,
            order_by,
        }
    }
}

fn singleton_entities(element: &DataItem) -> QueryResult {
    match element {
        DataItem::Page(page) => QueryResult::of_entities(vec![page.clone()], false),
        _ => QueryResult::empty(Vec::new()),
    }
}

fn unreachable_result(error: ConnectionError) -> QueryResult {
    warn!(%error, "backend call failed");
    QueryResult::empty(vec![QueryMessage::unreachable(error.to_string())])
}
