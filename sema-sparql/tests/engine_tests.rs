//! End-to-end engine tests against a scripted mock connection: mode
//! branching, trivial-result short-circuits, look-ahead pagination, and
//! backend-failure surfacing.

use async_trait::async_trait;
use sema_core::{
    Comparator, DataItem, DataItemKind, InMemoryTypeRegistry, MessageCode, PageRef,
    PropertyRef, QueryMessage,
};
use sema_describe::{Description, Query, QueryMode, SortDirection, SortKeys};
use sema_sparql::{
    AskResponse, ConnectionError, ConnectionResult, SelectResultSet, SparqlConnection,
    SparqlQueryEngine,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A connection that serves canned answers and records every call.
#[derive(Default)]
struct MockConnection {
    ask_answer: bool,
    rows: Vec<&'static str>,
    incomplete: bool,
    fail: bool,
    calls: AtomicUsize,
    last_query: Mutex<String>,
}

impl MockConnection {
    fn with_rows(rows: Vec<&'static str>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_query(&self) -> String {
        self.last_query.lock().unwrap().clone()
    }

    fn record(&self, query: &str) -> ConnectionResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = query.to_string();
        if self.fail {
            return Err(ConnectionError::Unreachable("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl SparqlConnection for MockConnection {
    async fn ask(&self, query: &str) -> ConnectionResult<AskResponse> {
        self.record(query)?;
        Ok(AskResponse {
            is_true: self.ask_answer,
        })
    }

    async fn select(&self, query: &str) -> ConnectionResult<SelectResultSet> {
        self.record(query)?;
        Ok(SelectResultSet {
            columns: vec!["result".to_string()],
            rows: self
                .rows
                .iter()
                .map(|r| vec![Some((*r).to_string())])
                .collect(),
            incomplete: self.incomplete,
        })
    }

    async fn select_count(&self, query: &str) -> ConnectionResult<SelectResultSet> {
        self.record(query)?;
        Ok(SelectResultSet {
            columns: vec!["count".to_string()],
            rows: vec![vec![Some(self.rows.len().to_string())]],
            incomplete: self.incomplete,
        })
    }
}

fn city_query() -> Query {
    Query::new(Description::class(vec![PageRef::category("City")]))
}

#[tokio::test]
async fn test_false_condition_makes_no_backend_call() {
    let connection = Arc::new(MockConnection::default());
    let engine = SparqlQueryEngine::new(
        Arc::clone(&connection),
        Arc::new(InMemoryTypeRegistry::new()),
    );

    // an empty class set can match nothing
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
    let engine = SparqlQueryEngine::new(
        Arc::clone(&connection),
        Arc::new(InMemoryTypeRegistry::new()),
    );

    let berlin = PageRef::main("Berlin");
    let description =
        Description::value(DataItem::Page(berlin.clone()), Comparator::Eq);

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
async fn test_constrained_singleton_issues_ask() {
    let connection = Arc::new(MockConnection {
        ask_answer: true,
        ..MockConnection::default()
    });
    let engine = SparqlQueryEngine::new(
        Arc::clone(&connection),
        Arc::new(InMemoryTypeRegistry::new()),
    );

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
    assert!(connection.last_query().contains("ASK WHERE {"));
}

#[tokio::test]
async fn test_instance_mode_look_ahead_pagination() {
    let connection = Arc::new(MockConnection::with_rows(vec![
        "wiki:A", "wiki:B", "wiki:C",
    ]));
    let engine = SparqlQueryEngine::new(
        Arc::clone(&connection),
        Arc::new(InMemoryTypeRegistry::new()),
    );

    let result = engine
        .get_query_result(&city_query().with_limit(2))
        .await
        .unwrap();
    assert_eq!(result.entities, vec![PageRef::main("A"), PageRef::main("B")]);
    assert!(result.has_further_results);
    // the backend was asked for limit + 1 rows
    assert!(connection.last_query().contains("LIMIT 3"));
    assert!(connection.last_query().contains("SELECT DISTINCT ?result"));
}

#[tokio::test]
async fn test_count_mode_parses_count_column() {
    let connection = Arc::new(MockConnection::with_rows(vec!["wiki:A", "wiki:B"]));
    let engine = SparqlQueryEngine::new(
        Arc::clone(&connection),
        Arc::new(InMemoryTypeRegistry::new()),
    );

    let result = engine
        .get_query_result(&city_query().with_mode(QueryMode::Count))
        .await
        .unwrap();
    assert_eq!(result.count, Some(2));
    assert!(connection.last_query().contains("COUNT( DISTINCT ?result )"));
}

#[tokio::test]
async fn test_backend_failure_surfaces_as_message() {
    let connection = Arc::new(MockConnection {
        fail: true,
        ..MockConnection::default()
    });
    let engine = SparqlQueryEngine::new(
        Arc::clone(&connection),
        Arc::new(InMemoryTypeRegistry::new()),
    );

    let result = engine.get_query_result(&city_query()).await.unwrap();
    assert!(result.entities.is_empty());
    assert_eq!(result.messages.len(), 1);
    assert_eq!(result.messages[0].code, MessageCode::BackendUnreachable);
    // exactly one attempt, no retries
    assert_eq!(connection.call_count(), 1);
}

#[tokio::test]
async fn test_incomplete_backend_result_warns() {
    let connection = Arc::new(MockConnection {
        rows: vec!["wiki:A"],
        incomplete: true,
        ..MockConnection::default()
    });
    let engine = SparqlQueryEngine::new(
        Arc::clone(&connection),
        Arc::new(InMemoryTypeRegistry::new()),
    );

    let result = engine.get_query_result(&city_query()).await.unwrap();
    assert_eq!(result.entities.len(), 1);
    assert!(result
        .messages
        .iter()
        .any(|m| m.code == MessageCode::BackendIncomplete));
}

#[tokio::test]
async fn test_debug_mode_renders_without_executing() {
    let connection = Arc::new(MockConnection::default());
    let engine = SparqlQueryEngine::new(
        Arc::clone(&connection),
        Arc::new(InMemoryTypeRegistry::new()),
    );

    let query = city_query()
        .with_mode(QueryMode::Debug)
        .with_sort_keys(SortKeys::none().with("", SortDirection::Asc));
    let result = engine.get_query_result(&query).await.unwrap();

    let text = result.debug_text.unwrap();
    assert!(text.contains("SELECT DISTINCT ?result"));
    assert!(text.contains("ORDER BY ASC("));
    assert_eq!(connection.call_count(), 0);
}

#[tokio::test]
async fn test_known_bad_query_short_circuits() {
    let connection = Arc::new(MockConnection::default());
    let engine = SparqlQueryEngine::new(
        Arc::clone(&connection),
        Arc::new(InMemoryTypeRegistry::new()),
    );

    let query = city_query()
        .with_error(QueryMessage::new(MessageCode::InvalidQuery, "parse error"));
    let result = engine.get_query_result(&query).await.unwrap();
    assert!(result.entities.is_empty());
    assert_eq!(result.messages[0].code, MessageCode::InvalidQuery);
    assert_eq!(connection.call_count(), 0);
}

#[tokio::test]
async fn test_degradation_warning_reaches_result() {
    let connection = Arc::new(MockConnection::with_rows(vec!["wiki:A"]));
    let types = Arc::new(
        InMemoryTypeRegistry::new().with("Population", DataItemKind::Number),
    );
    let engine = SparqlQueryEngine::new(Arc::clone(&connection), types);

    // LIKE against a numeric value degrades to universal with a warning
    let description = Description::conjunction(vec![
        Description::some_property(PropertyRef::new("Population"), Description::thing()),
        Description::value(DataItem::Number(5.0), Comparator::Like),
    ]);
    let result = engine
        .get_query_result(&Query::new(description))
        .await
        .unwrap();
    assert!(result
        .messages
        .iter()
        .any(|m| m.code == MessageCode::UnsupportedFeature));
}
