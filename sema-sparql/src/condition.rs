//! The SPARQL condition model
//!
//! A `Condition` is the intermediate representation between a
//! description tree and the serialized WHERE clause. The variant
//! records what kind of result the condition stands for; the shared
//! fields carry namespace usage, deferred ordering patterns, and forced
//! extra clauses.

use crate::pattern::{FilterExpr, GraphClause};
use crate::term::Term;
use sema_core::DataItem;
use std::collections::{BTreeMap, BTreeSet};

/// The variant of a condition.
#[derive(Clone, Debug, PartialEq)]
pub enum ConditionKind {
    /// Matches everything; carries no pattern of its own
    True,
    /// Matches nothing; serialization is skipped entirely
    False,
    /// Resolved to exactly one fixed value
    Singleton {
        /// The matched element (kept for trivial-result answers)
        element: DataItem,
        /// Its resolved term
        term: Term,
        /// Constraining pattern, empty when the match is unconditional
        clauses: Vec<GraphClause>,
    },
    /// A graph pattern
    Where {
        /// The pattern clauses
        clauses: Vec<GraphClause>,
    },
    /// A boolean expression only, no graph pattern
    Filter {
        /// The expression
        expr: FilterExpr,
    },
}

/// A condition under construction or ready for serialization.
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    /// Variant and payload
    pub kind: ConditionKind,
    /// Namespace ids referenced by any clause of this condition
    pub namespaces: BTreeSet<u32>,
    /// Deferred ordering patterns, keyed by the variable they bind;
    /// materialized only at serialization
    pub weak_conditions: BTreeMap<String, Vec<GraphClause>>,
    /// Which variable holds each property's sortable value
    pub order_variables: BTreeMap<String, String>,
    /// The variable this condition itself would be ordered by
    pub order_by_variable: Option<String>,
    /// Forced clauses appended regardless of safety (redirect exclusion)
    pub cogent_conditions: Vec<GraphClause>,
}

impl Condition {
    fn new(kind: ConditionKind) -> Self {
        let mut namespaces = BTreeSet::new();
        match &kind {
            ConditionKind::Singleton { term, clauses, .. } => {
                term.collect_namespaces(&mut namespaces);
                for c in clauses {
                    c.collect_namespaces(&mut namespaces);
                }
            }
            ConditionKind::Where { clauses } => {
                for c in clauses {
                    c.collect_namespaces(&mut namespaces);
                }
            }
            ConditionKind::Filter { expr } => expr.collect_namespaces(&mut namespaces),
            ConditionKind::True | ConditionKind::False => {}
        }
        Self {
            kind,
            namespaces,
            weak_conditions: BTreeMap::new(),
            order_variables: BTreeMap::new(),
            order_by_variable: None,
            cogent_conditions: Vec::new(),
        }
    }

    /// The universal condition.
    pub fn universal() -> Self {
        Self::new(ConditionKind::True)
    }

    /// The empty condition.
    pub fn empty() -> Self {
        Self::new(ConditionKind::False)
    }

    /// A singleton condition without a constraining pattern.
    pub fn singleton(element: DataItem, term: Term) -> Self {
        Self::new(ConditionKind::Singleton {
            element,
            term,
            clauses: Vec::new(),
        })
    }

    /// A singleton condition with a constraining pattern.
    pub fn singleton_with_pattern(
        element: DataItem,
        term: Term,
        clauses: Vec<GraphClause>,
    ) -> Self {
        Self::new(ConditionKind::Singleton {
            element,
            term,
            clauses,
        })
    }

    /// A graph-pattern condition.
    pub fn pattern(clauses: Vec<GraphClause>) -> Self {
        Self::new(ConditionKind::Where { clauses })
    }

    /// A filter-only condition.
    pub fn filter(expr: FilterExpr) -> Self {
        Self::new(ConditionKind::Filter { expr })
    }

    /// Whether this condition alone determines a bounded result set.
    ///
    /// A bare filter constrains nothing by itself, and the universal
    /// condition has no pattern at all; both need a catch-all pattern
    /// ahead of them at serialization. A pattern counts once it has at
    /// least one non-filter clause.
    pub fn is_safe(&self) -> bool {
        match &self.kind {
            ConditionKind::True => false,
            ConditionKind::False => true,
            ConditionKind::Singleton { .. } => true,
            ConditionKind::Where { clauses } => clauses.iter().any(GraphClause::is_pattern),
            ConditionKind::Filter { .. } => false,
        }
    }

    /// The main pattern clauses, if this variant has any.
    pub fn clauses(&self) -> &[GraphClause] {
        match &self.kind {
            ConditionKind::Singleton { clauses, .. } | ConditionKind::Where { clauses } => clauses,
            _ => &[],
        }
    }

    /// Merge the auxiliary state of `other` into `self`: namespaces,
    /// weak conditions, order variables, and cogent clauses.
    ///
    /// `order_by_variable` is deliberately not merged; it names the
    /// receiver's own ordering source and is set by the builder.
    pub fn merge_aux(&mut self, other: &mut Condition) {
        self.namespaces.append(&mut other.namespaces);
        self.weak_conditions.append(&mut other.weak_conditions);
        self.order_variables.append(&mut other.order_variables);
        self.cogent_conditions.append(&mut other.cogent_conditions);
    }

    /// Rename a variable throughout the condition, including weak and
    /// cogent clauses.
    pub fn rename_variable(&mut self, from: &str, to: &str) {
        match &mut self.kind {
            ConditionKind::Singleton { clauses, .. } | ConditionKind::Where { clauses } => {
                for c in clauses {
                    c.rename_variable(from, to);
                }
            }
            ConditionKind::Filter { expr } => expr.rename_variable(from, to),
            ConditionKind::True | ConditionKind::False => {}
        }
        for clauses in self.weak_conditions.values_mut() {
            for c in clauses {
                c.rename_variable(from, to);
            }
        }
        for c in &mut self.cogent_conditions {
            c.rename_variable(from, to);
        }
        if self.order_by_variable.as_deref() == Some(from) {
            self.order_by_variable = Some(to.to_string());
        }
    }
}
