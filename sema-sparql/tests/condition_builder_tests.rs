//! Correctness-focused integration tests for the SPARQL condition
//! builder: combination algebra, order-by post-pass, and serialization
//! shape, without any backend.

use sema_core::{
    Comparator, DataItem, DataItemKind, InMemoryTypeRegistry, PageRef, PropertyRef,
};
use sema_describe::{
    Description, InMemoryConcepts, SortDirection, SortKeys,
};
use sema_sparql::serializer::{self, SelectOptions};
use sema_sparql::{ConditionBuilder, ConditionKind, GraphClause};
use std::sync::Arc;

fn types() -> Arc<InMemoryTypeRegistry> {
    Arc::new(
        InMemoryTypeRegistry::new()
            .with("Population", DataItemKind::Number)
            .with("Name", DataItemKind::Text)
            .with("Located_in", DataItemKind::Page),
    )
}

fn builder() -> ConditionBuilder {
    ConditionBuilder::new(types())
}

fn builder_with_sort(sort_keys: SortKeys) -> ConditionBuilder {
    ConditionBuilder::new(types()).set_sort_keys(sort_keys)
}

fn has_population() -> Description {
    Description::some_property(PropertyRef::new("Population"), Description::thing())
}

fn located_in_berlin() -> Description {
    Description::some_property(
        PropertyRef::new("Located_in"),
        Description::value(DataItem::Page(PageRef::main("Berlin")), Comparator::Eq),
    )
}

fn false_description() -> Description {
    // an empty class set can match nothing
    Description::class(Vec::new())
}

#[test]
fn test_build_is_deterministic() {
    let d = Description::conjunction(vec![located_in_berlin(), has_population()]);
    let sort = SortKeys::none().with("Population", SortDirection::Desc);

    let a = builder_with_sort(sort.clone()).build_condition(&d).unwrap();
    let b = builder_with_sort(sort).build_condition(&d).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_conjunction_absorbs_true() {
    let with_thing =
        Description::conjunction(vec![located_in_berlin(), Description::thing()]);
    let alone = located_in_berlin();

    let a = builder().build_condition(&with_thing).unwrap();
    let b = builder().build_condition(&alone).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_conjunction_short_circuits_on_false() {
    let d = Description::conjunction(vec![located_in_berlin(), false_description()]);
    let cond = builder().build_condition(&d).unwrap();
    assert!(matches!(cond.kind, ConditionKind::False));
    assert_eq!(serializer::convert_condition_to_string(&cond, "result"), "");
}

#[test]
fn test_conflicting_singletons_are_false() {
    let d = Description::conjunction(vec![
        Description::value(DataItem::Page(PageRef::main("Berlin")), Comparator::Eq),
        Description::value(DataItem::Page(PageRef::main("Paris")), Comparator::Eq),
    ]);
    let cond = builder().build_condition(&d).unwrap();
    assert!(matches!(cond.kind, ConditionKind::False));
}

#[test]
fn test_disjunction_absorbs_false() {
    let with_false =
        Description::disjunction(vec![located_in_berlin(), false_description()]);
    let alone = located_in_berlin();

    let a = builder().build_condition(&with_false).unwrap();
    let b = builder().build_condition(&alone).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_disjunction_short_circuits_on_true() {
    let d = Description::disjunction(vec![located_in_berlin(), Description::thing()]);
    let cond = builder().build_condition(&d).unwrap();
    assert!(matches!(cond.kind, ConditionKind::True));
    // an unsafe universal condition serializes with the catch-all
    let body = serializer::convert_condition_to_string(&cond, "result");
    assert!(body.contains("?result sema:sortKey ?exists ."));
}

#[test]
fn test_every_sort_key_gets_an_order_variable() {
    // sort keys disjoint from the query body
    let d = Description::class(vec![PageRef::category("City")]);
    let sort = SortKeys::none()
        .with("Population", SortDirection::Desc)
        .with("Name", SortDirection::Asc)
        .with("", SortDirection::Asc);
    let cond = builder_with_sort(sort).build_condition(&d).unwrap();

    assert!(cond.order_variables.contains_key("Population"));
    assert!(cond.order_variables.contains_key("Name"));
    assert!(cond.order_variables.contains_key(""));
    // the scalar property orders on its own variable, no sort-key hop
    assert!(!cond.order_variables["Population"].ends_with("sk"));
    assert_eq!(cond.order_variables[""], "resultsk");
}

#[test]
fn test_eq_value_round_trip_has_no_free_result_variable() {
    let d = Description::value(DataItem::Page(PageRef::main("Berlin")), Comparator::Eq);
    let cond = builder().build_condition(&d).unwrap();

    let ConditionKind::Singleton { term, .. } = &cond.kind else {
        panic!("expected singleton, got {:?}", cond.kind);
    };
    assert_eq!(term.to_string(), "wiki:Berlin");
    let body = serializer::convert_condition_to_string(&cond, "result");
    assert!(!body.contains("?result"));
}

#[test]
fn test_scenario_some_property_eq() {
    // SomeProperty(P, ValueDescription(X, EQ)) with no sort keys
    let cond = builder().build_condition(&located_in_berlin()).unwrap();

    let ConditionKind::Where { clauses } = &cond.kind else {
        panic!("expected where, got {:?}", cond.kind);
    };
    assert_eq!(clauses.len(), 1);
    match &clauses[0] {
        GraphClause::Triple {
            subject,
            predicate,
            object,
        } => {
            assert_eq!(subject.to_string(), "?result");
            assert_eq!(predicate.to_string(), "property:Located_in");
            assert_eq!(object.to_string(), "wiki:Berlin");
        }
        other => panic!("expected triple, got {other:?}"),
    }
    assert!(cond.is_safe());
    assert!(cond.weak_conditions.is_empty());
}

#[test]
fn test_scenario_like_on_non_text_degrades() {
    // the LIKE target is numeric, so the value branch degrades to True
    // and the conjunction reduces to the property condition alone
    let d = Description::conjunction(vec![
        has_population(),
        Description::value(DataItem::Number(5.0), Comparator::Like),
    ]);
    let a = builder().build_condition(&d).unwrap();
    let b = builder().build_condition(&has_population()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_scenario_subject_sort_key_stays_weak_until_serialized() {
    let d = Description::class(vec![PageRef::category("City")]);
    let sort = SortKeys::none().with("", SortDirection::Asc);
    let cond = builder_with_sort(sort).build_condition(&d).unwrap();

    assert_eq!(cond.order_variables[""], "resultsk");
    assert!(cond.weak_conditions.contains_key("resultsk"));
    // not inlined into the main pattern
    assert!(!cond
        .clauses()
        .iter()
        .any(|c| matches!(c, GraphClause::Optional(_))));

    let body = serializer::convert_condition_to_string(&cond, "result");
    assert!(body.contains("OPTIONAL {"));
    assert!(body.contains("?result sema:sortKey ?resultsk ."));
}

#[test]
fn test_scenario_disjunction_of_property_singletons_uses_union() {
    let d = Description::disjunction(vec![
        Description::some_property(
            PropertyRef::new("Located_in"),
            Description::value(DataItem::Page(PageRef::main("Berlin")), Comparator::Eq),
        ),
        Description::some_property(
            PropertyRef::new("Located_in"),
            Description::value(DataItem::Page(PageRef::main("Paris")), Comparator::Eq),
        ),
    ]);
    let cond = builder().build_condition(&d).unwrap();
    let ConditionKind::Where { clauses } = &cond.kind else {
        panic!("expected where, got {:?}", cond.kind);
    };
    let GraphClause::Union(branches) = &clauses[0] else {
        panic!("expected union, got {:?}", clauses[0]);
    };
    assert_eq!(branches.len(), 2);

    let body = serializer::convert_condition_to_string(&cond, "result");
    assert!(body.contains("} UNION {"));
    assert!(body.contains("wiki:Berlin"));
    assert!(body.contains("wiki:Paris"));
}

#[test]
fn test_scenario_disjunction_of_bare_singletons_uses_equality_filter() {
    let d = Description::disjunction(vec![
        Description::value(DataItem::Page(PageRef::main("Berlin")), Comparator::Eq),
        Description::value(DataItem::Page(PageRef::main("Paris")), Comparator::Eq),
    ]);
    let cond = builder().build_condition(&d).unwrap();
    let ConditionKind::Filter { expr } = &cond.kind else {
        panic!("expected filter, got {:?}", cond.kind);
    };
    let rendered = expr.to_string();
    assert!(rendered.contains("?result = wiki:Berlin"));
    assert!(rendered.contains("||"));
    assert!(rendered.contains("?result = wiki:Paris"));
}

#[test]
fn test_disjunction_mixing_union_and_filter_rewrites_variables() {
    let d = Description::disjunction(vec![
        located_in_berlin(),
        Description::value(DataItem::Page(PageRef::main("Paris")), Comparator::Eq),
    ]);
    let cond = builder().build_condition(&d).unwrap();
    let body = serializer::convert_condition_to_string(&cond, "result");

    assert!(body.contains("OPTIONAL {"));
    // the union branch moved off the result variable
    let optional_start = body.find("OPTIONAL {").unwrap();
    let optional_end = body[optional_start..].find("FILTER").unwrap() + optional_start;
    assert!(!body[optional_start..optional_end].contains("?result "));
    // the filter reconnects the fresh variable
    assert!(body.contains("?result = ?v"));
    assert!(body.contains("?result = wiki:Paris"));
}

#[test]
fn test_disjunction_drops_inner_order_variables() {
    let sort = SortKeys::none().with("Population", SortDirection::Asc);
    let d = Description::disjunction(vec![
        has_population(),
        located_in_berlin(),
    ]);
    let cond = builder_with_sort(sort).build_condition(&d).unwrap();
    // the post-pass re-binds the key against the result variable instead
    assert!(cond.order_variables.contains_key("Population"));
    assert!(cond.weak_conditions.contains_key(&cond.order_variables["Population"]));
}

#[test]
fn test_ordering_comparator_on_entity_routes_through_sort_key() {
    let d = Description::some_property(
        PropertyRef::new("Located_in"),
        Description::value(DataItem::Page(PageRef::main("Berlin")), Comparator::Less),
    );
    let cond = builder().build_condition(&d).unwrap();
    let body = serializer::convert_condition_to_string(&cond, "result");
    // the comparison targets the sort-key variable, against the page's
    // sort key as a plain literal
    assert!(body.contains("?v1sk < \"Berlin\""));
    assert!(body.contains("sema:sortKey ?v1sk"));
}

#[test]
fn test_redirect_exclusion_is_cogent() {
    let cond = builder().build_condition(&located_in_berlin()).unwrap();
    assert!(!cond.cogent_conditions.is_empty());
    let body = serializer::convert_condition_to_string(&cond, "result");
    assert!(body.contains("sema:redirectsTo"));
    assert!(body.contains("!bound( ?o"));
}

#[test]
fn test_singleton_gets_redirect_property_path() {
    // a top-level singleton with a pattern resolves through redirects
    let d = Description::conjunction(vec![
        Description::value(DataItem::Page(PageRef::main("Berlin")), Comparator::Eq),
        Description::namespace(0),
    ]);
    let cond = builder().build_condition(&d).unwrap();
    assert!(matches!(cond.kind, ConditionKind::Singleton { .. }));
    let body = serializer::convert_condition_to_string(&cond, "result");
    assert!(body.contains("wiki:Berlin (sema:redirectsTo)* ?r"));
    assert!(!body.contains("?result"));
}

#[test]
fn test_concepts_expand_through_resolver() {
    let city_concept = PageRef::concept("Cities");
    let concepts = InMemoryConcepts::new().with(
        city_concept.clone(),
        Description::class(vec![PageRef::category("City")]),
    );
    let mut with_resolver =
        ConditionBuilder::new(types()).with_concept_resolver(Arc::new(concepts));
    let cond = with_resolver
        .build_condition(&Description::concept(city_concept.clone()))
        .unwrap();
    let body = serializer::convert_condition_to_string(&cond, "result");
    assert!(body.contains("sema:instanceOf category:City"));

    // without a resolver the concept degrades to universal
    let mut bare = builder();
    let degraded = bare
        .build_condition(&Description::concept(city_concept))
        .unwrap();
    assert!(matches!(degraded.kind, ConditionKind::True));
    assert!(!bare.take_messages().is_empty());
}

#[test]
fn test_select_query_orders_by_resolved_variables() {
    let d = Description::class(vec![PageRef::category("City")]);
    let sort = SortKeys::none().with("Population", SortDirection::Desc);
    let cond = builder_with_sort(sort).build_condition(&d).unwrap();

    let options = SelectOptions {
        distinct: true,
        limit: Some(11),
        offset: 0,
        order_by: vec![(
            cond.order_variables["Population"].clone(),
            SortDirection::Desc,
        )],
    };
    let query = serializer::select_query(&cond, "result", &options);
    assert!(query.starts_with("PREFIX"));
    assert!(query.contains("ORDER BY DESC("));
    assert!(query.contains("LIMIT 11"));
}

#[test]
fn test_namespace_condition_shape() {
    let cond = builder()
        .build_condition(&Description::namespace(14))
        .unwrap();
    let body = serializer::convert_condition_to_string(&cond, "result");
    assert!(body.contains("?result sema:pageNamespace \"14\"^^xsd:integer ."));
}
