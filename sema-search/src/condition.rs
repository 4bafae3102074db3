//! Bool-query condition model
//!
//! The document-index condition parallels the SPARQL one: the same
//! True/False/Singleton short-circuit variants, with the pattern payload
//! replaced by a recursive structure of boolean-clause buckets. Nested
//! conditions flatten into a single JSON body on `to_value()`; debug
//! logs merge upward when conditions combine.

use sema_core::DataItem;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// The boolean clause a query part joins its parent with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClauseType {
    /// Must match, contributes to score
    Must,
    /// At least one should match
    Should,
    /// Must not match
    MustNot,
    /// Must match, no scoring
    Filter,
}

/// One entry in a bool bucket: raw DSL or a nested bool query.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryPart {
    /// A leaf DSL object (term, range, regexp, exists, ...)
    Raw(Value),
    /// A nested bool query, flattened on serialization
    Bool(Box<BoolQuery>),
}

impl QueryPart {
    fn to_value(&self) -> Value {
        match self {
            QueryPart::Raw(value) => value.clone(),
            QueryPart::Bool(bool_query) => bool_query.to_value(),
        }
    }
}

/// A bool query under construction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoolQuery {
    /// Must bucket
    pub must: Vec<QueryPart>,
    /// Should bucket
    pub should: Vec<QueryPart>,
    /// Must-not bucket
    pub must_not: Vec<QueryPart>,
    /// Filter bucket
    pub filter: Vec<QueryPart>,
}

impl BoolQuery {
    /// Empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// A query with a single part in the given bucket.
    pub fn single(clause: ClauseType, part: QueryPart) -> Self {
        let mut q = Self::new();
        q.push(clause, part);
        q
    }

    /// Append a part to a bucket.
    pub fn push(&mut self, clause: ClauseType, part: QueryPart) {
        match clause {
            ClauseType::Must => self.must.push(part),
            ClauseType::Should => self.should.push(part),
            ClauseType::MustNot => self.must_not.push(part),
            ClauseType::Filter => self.filter.push(part),
        }
    }

    /// Whether no bucket has any part.
    pub fn is_empty(&self) -> bool {
        self.must.is_empty()
            && self.should.is_empty()
            && self.must_not.is_empty()
            && self.filter.is_empty()
    }

    /// Flatten into the `{"bool": {...}}` DSL shape.
    ///
    /// A lone must part serializes as itself; a bool with only should
    /// parts pins `minimum_should_match` so OR semantics survive later
    /// embedding under another must.
    pub fn to_value(&self) -> Value {
        if self.must.len() == 1
            && self.should.is_empty()
            && self.must_not.is_empty()
            && self.filter.is_empty()
        {
            return self.must[0].to_value();
        }

        let mut body = serde_json::Map::new();
        let buckets: [(&str, &Vec<QueryPart>); 4] = [
            ("must", &self.must),
            ("should", &self.should),
            ("must_not", &self.must_not),
            ("filter", &self.filter),
        ];
        for (name, parts) in buckets {
            if !parts.is_empty() {
                body.insert(
                    name.to_string(),
                    Value::Array(parts.iter().map(QueryPart::to_value).collect()),
                );
            }
        }
        if !self.should.is_empty() {
            body.insert("minimum_should_match".to_string(), json!(1));
        }
        json!({ "bool": body })
    }
}

/// The variant of a search condition.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchConditionKind {
    /// Matches everything
    True,
    /// Matches nothing
    False,
    /// Resolved to exactly one fixed value
    Singleton {
        /// The matched element
        element: DataItem,
        /// Constraining query, `None` when the match is unconditional
        query: Option<BoolQuery>,
    },
    /// A bool query
    Query(BoolQuery),
}

/// A search condition with its auxiliary state.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchCondition {
    /// Variant and payload
    pub kind: SearchConditionKind,
    /// Which document field holds each property's sortable value
    pub order_fields: BTreeMap<String, String>,
    /// The field this condition itself would be ordered by
    pub order_by_field: Option<String>,
    /// Debug log lines, merged upward on combination
    pub logs: Vec<String>,
}

impl SearchCondition {
    fn new(kind: SearchConditionKind) -> Self {
        Self {
            kind,
            order_fields: BTreeMap::new(),
            order_by_field: None,
            logs: Vec::new(),
        }
    }

    /// The universal condition.
    pub fn universal() -> Self {
        Self::new(SearchConditionKind::True)
    }

    /// The empty condition.
    pub fn empty() -> Self {
        Self::new(SearchConditionKind::False)
    }

    /// A singleton without a constraining query.
    pub fn singleton(element: DataItem) -> Self {
        Self::new(SearchConditionKind::Singleton {
            element,
            query: None,
        })
    }

    /// A singleton with a constraining query.
    pub fn singleton_with_query(element: DataItem, query: BoolQuery) -> Self {
        Self::new(SearchConditionKind::Singleton {
            element,
            query: Some(query),
        })
    }

    /// A bool-query condition.
    pub fn query(query: BoolQuery) -> Self {
        Self::new(SearchConditionKind::Query(query))
    }

    /// Attach a log line, fluent.
    pub fn with_log(mut self, line: impl Into<String>) -> Self {
        self.logs.push(line.into());
        self
    }

    /// Merge another condition's auxiliary state (order fields, logs).
    pub fn merge_aux(&mut self, other: &mut SearchCondition) {
        self.order_fields.append(&mut other.order_fields);
        self.logs.append(&mut other.logs);
    }

    /// The full DSL body for this condition.
    pub fn to_value(&self) -> Value {
        match &self.kind {
            SearchConditionKind::True => json!({ "match_all": {} }),
            SearchConditionKind::False => json!({ "match_none": {} }),
            SearchConditionKind::Singleton { query, .. } => match query {
                Some(q) => q.to_value(),
                None => json!({ "match_all": {} }),
            },
            SearchConditionKind::Query(q) => q.to_value(),
        }
    }
}

/// A named aggregation, nestable, flattened like conditions.
#[derive(Clone, Debug, PartialEq)]
pub struct Aggregations {
    /// Aggregation name in the response
    pub name: String,
    /// The aggregation body (terms, value_count, ...)
    pub body: Value,
    /// Sub-aggregations
    pub sub: Vec<Aggregations>,
    /// Debug log lines
    pub logs: Vec<String>,
}

impl Aggregations {
    /// A terms aggregation over a field.
    pub fn terms(name: impl Into<String>, field: impl AsRef<str>, size: usize) -> Self {
        Self {
            name: name.into(),
            body: json!({ "terms": { "field": field.as_ref(), "size": size } }),
            sub: Vec::new(),
            logs: Vec::new(),
        }
    }

    /// Nest a sub-aggregation, fluent.
    pub fn with_sub(mut self, sub: Aggregations) -> Self {
        self.sub.push(sub);
        self
    }

    /// Flatten into the `{"name": {...}}` DSL shape, merging sub logs.
    pub fn to_value(&self) -> Value {
        let mut body = self.body.clone();
        if !self.sub.is_empty() {
            let mut aggs = serde_json::Map::new();
            for sub in &self.sub {
                if let Value::Object(map) = sub.to_value() {
                    aggs.extend(map);
                }
            }
            if let Value::Object(map) = &mut body {
                map.insert("aggs".to_string(), Value::Object(aggs));
            }
        }
        let mut out = serde_json::Map::new();
        out.insert(self.name.clone(), body);
        Value::Object(out)
    }

    /// All log lines, this aggregation's first.
    pub fn merged_logs(&self) -> Vec<String> {
        let mut logs = self.logs.clone();
        for sub in &self.sub {
            logs.extend(sub.merged_logs());
        }
        logs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sema_core::PageRef;

    #[test]
    fn test_single_must_flattens() {
        let q = BoolQuery::single(
            ClauseType::Must,
            QueryPart::Raw(json!({ "term": { "subject.namespace": 0 } })),
        );
        assert_eq!(q.to_value(), json!({ "term": { "subject.namespace": 0 } }));
    }

    #[test]
    fn test_bool_shape_with_buckets() {
        let mut q = BoolQuery::new();
        q.push(ClauseType::Must, QueryPart::Raw(json!({ "exists": { "field": "P:1.txtField" } })));
        q.push(ClauseType::MustNot, QueryPart::Raw(json!({ "term": { "subject.namespace": 14 } })));
        let v = q.to_value();
        assert_eq!(v["bool"]["must"][0]["exists"]["field"], "P:1.txtField");
        assert_eq!(v["bool"]["must_not"][0]["term"]["subject.namespace"], 14);
    }

    #[test]
    fn test_should_pins_minimum_should_match() {
        let mut q = BoolQuery::new();
        q.push(ClauseType::Should, QueryPart::Raw(json!({ "term": { "category": 7 } })));
        q.push(ClauseType::Should, QueryPart::Raw(json!({ "term": { "category": 9 } })));
        let v = q.to_value();
        assert_eq!(v["bool"]["minimum_should_match"], 1);
    }

    #[test]
    fn test_nested_bool_flattening() {
        let inner = BoolQuery::single(
            ClauseType::Should,
            QueryPart::Raw(json!({ "term": { "category": 7 } })),
        );
        let outer = BoolQuery::single(ClauseType::Must, QueryPart::Bool(Box::new(inner)));
        let v = outer.to_value();
        assert_eq!(v["bool"]["should"][0]["term"]["category"], 7);
    }

    #[test]
    fn test_condition_values() {
        assert_eq!(SearchCondition::universal().to_value(), json!({ "match_all": {} }));
        assert_eq!(SearchCondition::empty().to_value(), json!({ "match_none": {} }));
        let s = SearchCondition::singleton(DataItem::Page(PageRef::main("Berlin")));
        assert_eq!(s.to_value(), json!({ "match_all": {} }));
    }

    #[test]
    fn test_aggregation_nesting_and_logs() {
        let agg = Aggregations::terms("by_value", "P:3.txtField.keyword", 10)
            .with_sub(Aggregations::terms("by_ns", "subject.namespace", 5));
        let v = agg.to_value();
        assert_eq!(v["by_value"]["terms"]["field"], "P:3.txtField.keyword");
        assert_eq!(v["by_value"]["aggs"]["by_ns"]["terms"]["field"], "subject.namespace");
        assert!(agg.merged_logs().is_empty());
    }
}
