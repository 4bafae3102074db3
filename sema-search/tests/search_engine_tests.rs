//! End-to-end engine tests against a scripted mock connection: mode
//! branching, id resolution, look-ahead pagination, and the debug
//! validate call.

use async_trait::async_trait;
use sema_core::{
    Comparator, DataItem, DataItemKind, InMemoryResolver, InMemoryTypeRegistry, MessageCode,
    PageRef, PropertyRef,
};
use sema_describe::{Description, Query, QueryMode, SortDirection, SortKeys};
use sema_search::{
    ConnectionError, ConnectionResult, SearchConnection, SearchQueryEngine, SearchResponse,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A connection that serves canned answers and records every call.
#[derive(Default)]
struct MockConnection {
    hit_ids: Vec<u64>,
    count: u64,
    timed_out: bool,
    fail: bool,
    calls: AtomicUsize,
    validations: AtomicUsize,
    last_body: Mutex<Value>,
}

impl MockConnection {
    fn with_hits(hit_ids: Vec<u64>) -> Self {
        Self {
            count: hit_ids.len() as u64,
            hit_ids,
            ..Self::default()
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_body(&self) -> Value {
        self.last_body.lock().unwrap().clone()
    }

    fn record(&self, body: &Value) -> ConnectionResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_body.lock().unwrap() = body.clone();
        if self.fail {
            return Err(ConnectionError::Unreachable("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl SearchConnection for MockConnection {
    async fn count(&self, body: &Value) -> ConnectionResult<u64> {
        self.record(body)?;
        Ok(self.count)
    }

    async fn search(&self, body: &Value) -> ConnectionResult<SearchResponse> {
        self.record(body)?;
        let hits: Vec<Value> = self
            .hit_ids
            .iter()
            .map(|id| json!({ "_id": id, "_score": 1.0 }))
            .collect();
        Ok(SearchResponse {
            raw: json!({
                "timed_out": self.timed_out,
                "hits": { "total": { "value": self.hit_ids.len() }, "hits": hits }
            }),
            errors: Vec::new(),
        })
    }

    async fn validate(&self, _body: &Value) -> ConnectionResult<bool> {
        self.validations.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }
}

fn resolver() -> Arc<InMemoryResolver> {
    Arc::new(
        InMemoryResolver::new()
            .with_page(PageRef::property("Located_in"), 42)
            .with_page(PageRef::property("Population"), 43)
            .with_page(PageRef::category("City"), 14)
            .with_page(PageRef::main("Berlin"), 7)
            .with_page(PageRef::main("Hamburg"), 9)
            .with_page(PageRef::main("Munich"), 11),
    )
}

fn engine(connection: Arc<MockConnection>) -> SearchQueryEngine<Arc<MockConnection>> {
    let types = Arc::new(
        InMemoryTypeRegistry::new().with("Population", DataItemKind::Number),
    );
    SearchQueryEngine::new(connection, types, resolver())
}

fn city_query() -> Query {
    Query::new(Description::class(vec![PageRef::category("City")]))
}

#[tokio::test]
async fn test_false_condition_makes_no_backend_call() {
    let connection = Arc::new(MockConnection::default());
    let engine = engine(Arc::clone(&connection));

    let description = Description::class(Vec::new());
    let counted = engine
        .get_query_result(&Query::new(description.clone()).with_mode(QueryMode::Count))
        .await
        .unwrap();
    assert_eq!(counted.count, Some(0));

    let listed = engine
        .get_query_result(&Query::new(description))
        .await
        .unwrap();
    assert!(listed.entities.is_empty());
    assert_eq!(connection.call_count(), 0);
}

#[tokio::test]
async fn test_trivial_singleton_answers_without_backend() {
    let connection = Arc::new(MockConnection::default());
    let engine = engine(Arc::clone(&connection));

    let berlin = PageRef::main("Berlin");
    let description = Description::value(DataItem::Page(berlin.clone()), Comparator::Eq);

    let counted = engine
        .get_query_result(&Query::new(description.clone()).with_mode(QueryMode::Count))
        .await
        .unwrap();
    assert_eq!(counted.count, Some(1));

    let listed = engine
        .get_query_result(&Query::new(description))
        .await
        .unwrap();
    assert_eq!(listed.entities, vec![berlin]);
    assert_eq!(connection.call_count(), 0);
}

#[tokio::test]
async fn test_constrained_singleton_pins_subject_id() {
    let connection = Arc::new(MockConnection::with_hits(vec![7]));
    let engine = engine(Arc::clone(&connection));

    let berlin = PageRef::main("Berlin");
    let description = Description::conjunction(vec![
        Description::value(DataItem::Page(berlin.clone()), Comparator::Eq),
        Description::namespace(0),
    ]);

    let result = engine
        .get_query_result(&Query::new(description))
        .await
        .unwrap();
    assert_eq!(result.entities, vec![berlin]);
    assert_eq!(connection.call_count(), 1);
    let body = connection.last_body();
    assert_eq!(body["query"]["bool"]["filter"][0]["term"]["subject.id"], 7);
    assert_eq!(body["size"], 1);
}

#[tokio::test]
async fn test_instance_mode_resolves_ids_and_paginates() {
    let connection = Arc::new(MockConnection::with_hits(vec![7, 9, 11]));
    let engine = engine(Arc::clone(&connection));

    let result = engine
        .get_query_result(&city_query().with_limit(2))
        .await
        .unwrap();
    assert_eq!(
        result.entities,
        vec![PageRef::main("Berlin"), PageRef::main("Hamburg")]
    );
    assert!(result.has_further_results);
    let body = connection.last_body();
    assert_eq!(body["size"], 3);
    assert_eq!(body["from"], 0);
}

#[tokio::test]
async fn test_deleted_ids_are_dropped() {
    // id 99 is not resolvable any more
    let connection = Arc::new(MockConnection::with_hits(vec![7, 99]));
    let engine = engine(Arc::clone(&connection));

    let result = engine.get_query_result(&city_query()).await.unwrap();
    assert_eq!(result.entities, vec![PageRef::main("Berlin")]);
}

#[tokio::test]
async fn test_count_mode_uses_count_api() {
    let connection = Arc::new(MockConnection {
        count: 12,
        ..MockConnection::default()
    });
    let engine = engine(Arc::clone(&connection));

    let result = engine
        .get_query_result(&city_query().with_mode(QueryMode::Count))
        .await
        .unwrap();
    assert_eq!(result.count, Some(12));
    let body = connection.last_body();
    assert_eq!(body["query"]["bool"]["should"][0]["term"]["category"], 14);
}

#[tokio::test]
async fn test_sorts_are_emitted_from_order_fields() {
    let connection = Arc::new(MockConnection::with_hits(vec![7]));
    let engine = engine(Arc::clone(&connection));

    let query = city_query().with_sort_keys(
        SortKeys::none()
            .with("Population", SortDirection::Desc)
            .with("", SortDirection::Asc),
    );
    engine.get_query_result(&query).await.unwrap();

    let body = connection.last_body();
    assert_eq!(body["sort"][0]["P:43.numField"]["order"], "desc");
    assert_eq!(body["sort"][1]["subject.sortkey"]["order"], "asc");
}

#[tokio::test]
async fn test_backend_failure_surfaces_as_message() {
    let connection = Arc::new(MockConnection {
        fail: true,
        ..MockConnection::default()
    });
    let engine = engine(Arc::clone(&connection));

    let result = engine.get_query_result(&city_query()).await.unwrap();
    assert!(result.entities.is_empty());
    assert_eq!(result.messages[0].code, MessageCode::BackendUnreachable);
    assert_eq!(connection.call_count(), 1);
}

#[tokio::test]
async fn test_timed_out_response_warns_incomplete() {
    let connection = Arc::new(MockConnection {
        hit_ids: vec![7],
        timed_out: true,
        ..MockConnection::default()
    });
    let engine = engine(Arc::clone(&connection));

    let result = engine.get_query_result(&city_query()).await.unwrap();
    assert_eq!(result.entities.len(), 1);
    assert!(result
        .messages
        .iter()
        .any(|m| m.code == MessageCode::BackendIncomplete));
}

#[tokio::test]
async fn test_debug_mode_renders_and_validates() {
    let connection = Arc::new(MockConnection::default());
    let engine = engine(Arc::clone(&connection));

    let result = engine
        .get_query_result(&city_query().with_mode(QueryMode::Debug))
        .await
        .unwrap();
    let text = result.debug_text.unwrap();
    assert!(text.contains("\"query\""));
    assert!(text.contains("valid: true"));
    // only the validate call ran, no search
    assert_eq!(connection.call_count(), 0);
    assert_eq!(connection.validations.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concept_degrades_with_warning() {
    let connection = Arc::new(MockConnection::with_hits(vec![7]));
    let engine = engine(Arc::clone(&connection));

    let result = engine
        .get_query_result(&Query::new(Description::concept(PageRef::concept("Cities"))))
        .await
        .unwrap();
    assert!(result
        .messages
        .iter()
        .any(|m| m.code == MessageCode::UnsupportedFeature));
    // degraded to match_all, still executed
    let body = connection.last_body();
    assert_eq!(body["query"], json!({ "match_all": {} }));
}

#[tokio::test]
async fn test_facet_counts_use_aggregations() {
    let connection = Arc::new(MockConnection::default());
    // canned aggregation response
    let engine = engine(Arc::clone(&connection));
    let facets = engine
        .facet_counts(&city_query(), &PropertyRef::new("Population"))
        .await
        .unwrap();
    // mock returns no aggregations; the call shape is what matters
    assert!(facets.is_empty());
    let body = connection.last_body();
    assert_eq!(body["size"], 0);
    assert_eq!(
        body["aggs"]["facets"]["terms"]["field"],
        "P:43.numField"
    );
}
