//! Query engine orchestration
//!
//! The document-index twin of the SPARQL engine: build the condition
//! once, then branch on the query mode. Trivial outcomes never reach
//! the backend; a constrained singleton pins the subject id and asks
//! for that one document; everything else runs as count or search with
//! look-ahead pagination. Debug mode renders the DSL body and still
//! issues a validate call.

use crate::builder::SearchConditionBuilder;
use crate::condition::{
    Aggregations, BoolQuery, ClauseType, QueryPart, SearchCondition, SearchConditionKind,
};
use crate::connection::{ConnectionError, SearchConnection};
use crate::field::SUBJECT_ID_FIELD;
use crate::result::{convert_entities, is_incomplete, parse_hit_ids};
use sema_core::{
    DataItem, EntityResolver, PropertyRef, QueryMessage, Result, TypeRegistry,
};
use sema_describe::{Query, QueryMode, QueryResult, SortDirection};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Size budget for incoming description trees.
const MAX_DESCRIPTION_SIZE: usize = 64;

/// Depth budget for incoming description trees.
const MAX_DESCRIPTION_DEPTH: usize = 8;

/// The document-index query engine.
pub struct SearchQueryEngine<C> {
    connection: C,
    types: Arc<dyn TypeRegistry>,
    resolver: Arc<dyn EntityResolver>,
}

impl<C: SearchConnection> SearchQueryEngine<C> {
    /// Create an engine over a connection, type registry, and entity
    /// resolver.
    pub fn new(
        connection: C,
        types: Arc<dyn TypeRegistry>,
        resolver: Arc<dyn EntityResolver>,
    ) -> Self {
        Self {
            connection,
            types,
            resolver,
        }
    }

    /// Execute a query and adapt the answer.
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

        let mut builder =
            SearchConditionBuilder::new(Arc::clone(&self.resolver), Arc::clone(&self.types))
                .set_sort_keys(query.sort_keys.clone());
        let condition = builder.build_condition(&description)?;
        messages.append(&mut builder.take_messages());

        let mut result = match query.mode {
            QueryMode::Count => self.count_result(&condition).await,
            QueryMode::Debug => self.debug_result(query, &condition).await,
            QueryMode::Instance => self.instance_result(query, &condition).await,
            QueryMode::None => unreachable!("handled above"),
        };
        result.messages.splice(0..0, messages);
        Ok(result)
    }

    /// Value counts for a property over the query's matches, via a
    /// terms aggregation (no documents fetched).
    pub async fn facet_counts(
        &self,
        query: &Query,
        property: &PropertyRef,
    ) -> Result<Vec<(String, u64)>> {
        let mut builder =
            SearchConditionBuilder::new(Arc::clone(&self.resolver), Arc::clone(&self.types));
        let condition = builder.build_condition(&query.description)?;
        let Some(fields) = builder.mapper().property_fields(property) else {
            return Ok(Vec::new());
        };
        let aggregation = Aggregations::terms("facets", fields.sort_field(), query.limit);
        let body = json!({
            "query": condition.to_value(),
            "size": 0,
            "aggs": aggregation.to_value(),
        });
        match self.connection.search(&body).await {
            Ok(response) => {
                let buckets = response.raw["aggregations"]["facets"]["buckets"]
                    .as_array()
                    .cloned()
                    .unwrap_or_default();
                Ok(buckets
                    .iter()
                    .filter_map(|b| {
                        let key = match &b["key"] {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        Some((key, b["doc_count"].as_u64()?))
                    })
                    .collect())
            }
            Err(e) => {
                warn!(%e, "facet search failed");
                Ok(Vec::new())
            }
        }
    }

    async fn count_result(&self, condition: &SearchCondition) -> QueryResult {
        match &condition.kind {
            SearchConditionKind::False => QueryResult::of_count(0),
            SearchConditionKind::Singleton { query: None, .. } => QueryResult::of_count(1),
            SearchConditionKind::Singleton {
                element,
                query: Some(query),
            } => match self.singleton_body(element, query) {
                Some(body) => match self.connection.count(&json!({ "query": body })).await {
                    Ok(count) => QueryResult::of_count(count.min(1)),
                    Err(e) => unreachable_result(e),
                },
                None => QueryResult::of_count(0),
            },
            _ => {
                let body = json!({ "query": condition.to_value() });
                match self.connection.count(&body).await {
                    Ok(count) => QueryResult::of_count(count),
                    Err(e) => unreachable_result(e),
                }
            }
        }
    }

    async fn instance_result(&self, query: &Query, condition: &SearchCondition) -> QueryResult {
        match &condition.kind {
            SearchConditionKind::False => QueryResult::empty(Vec::new()),
            SearchConditionKind::Singleton {
                element,
                query: None,
            } => singleton_entities(element),
            SearchConditionKind::Singleton {
                element,
                query: Some(bool_query),
            } => match self.singleton_body(element, bool_query) {
                Some(body) => {
                    let body = json!({ "query": body, "size": 1 });
                    match self.connection.search(&body).await {
                        Ok(response) if !parse_hit_ids(&response.raw).is_empty() => {
                            singleton_entities(element)
                        }
                        Ok(_) => QueryResult::empty(Vec::new()),
                        Err(e) => unreachable_result(e),
                    }
                }
                None => QueryResult::empty(Vec::new()),
            },
            _ => {
                let body = self.search_body(query, condition);
                match self.connection.search(&body).await {
                    Ok(response) => {
                        let ids = parse_hit_ids(&response.raw);
                        let (entities, has_more) =
                            convert_entities(&ids, self.resolver.as_ref(), query.limit);
                        let mut result = QueryResult::of_entities(entities, has_more);
                        if is_incomplete(&response.raw) {
                            result = result.with_message(QueryMessage::incomplete());
                        }
                        for error in response.errors {
                            result = result.with_message(QueryMessage::new(
                                sema_core::MessageCode::BackendIncomplete,
                                error,
                            ));
                        }
                        result
                    }
                    Err(e) => unreachable_result(e),
                }
            }
        }
    }

    async fn debug_result(&self, query: &Query, condition: &SearchCondition) -> QueryResult {
        let body = self.search_body(query, condition);
        let rendered =
            serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string());
        let mut text = rendered;
        match self.connection.validate(&body).await {
            Ok(valid) => {
                text.push_str(&format!("\n\nvalid: {valid}"));
            }
            Err(e) => {
                text.push_str(&format!("\n\nvalidation unavailable: {e}"));
            }
        }
        if !condition.logs.is_empty() {
            text.push_str("\n\nlog:");
            for line in &condition.logs {
                text.push_str(&format!("\n- {line}"));
            }
        }
        QueryResult::of_debug(text)
    }

    /// The full search body: query, look-ahead paging, and sorts.
    fn search_body(&self, query: &Query, condition: &SearchCondition) -> Value {
        let mut sorts = Vec::new();
        for (key, direction) in query.sort_keys.iter() {
            // random order is recognized but has no stable mapping here
            if direction == SortDirection::Random {
                continue;
            }
            let Some(field) = condition.order_fields.get(key) else {
                warn!(key, "sort key has no order field, skipping");
                continue;
            };
            let order = match direction {
                SortDirection::Asc => "asc",
                SortDirection::Desc => "desc",
                SortDirection::Random => unreachable!("skipped above"),
            };
            sorts.push(json!({ (field): { "order": order } }));
        }
        let mut body = json!({
            "query": condition.to_value(),
            "size": query.limit + 1,
            "from": query.offset,
        });
        if !sorts.is_empty() {
            body["sort"] = Value::Array(sorts);
        }
        body
    }

    /// The one-document body for a constrained singleton, or `None`
    /// when the element has no id (then nothing can match).
    fn singleton_body(&self, element: &DataItem, query: &BoolQuery) -> Option<Value> {
        let DataItem::Page(page) = element else {
            return None;
        };
        let id = self.resolver.resolve_id(page)?;
        let mut pinned = query.clone();
        pinned.push(
            ClauseType::Filter,
            QueryPart::Raw(json!({ "term": { (SUBJECT_ID_FIELD): id } })),
        );
        Some(pinned.to_value())
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
