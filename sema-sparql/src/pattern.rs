//! Structured graph patterns and filter expressions
//!
//! Conditions accumulate structured clause lists during building and
//! only become text at serialization. This keeps quoting/escaping in
//! one place and lets the disjunction rewrite rename variables
//! structurally instead of by string surgery.

use crate::term::Term;
use sema_core::Comparator;
use std::collections::BTreeSet;
use std::fmt;

/// A boolean expression usable inside a FILTER.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterExpr {
    /// `lhs op rhs` for the ordering comparators and equality
    Compare {
        /// Left operand
        lhs: Term,
        /// Comparison operator; never `Like`/`NotLike`
        op: Comparator,
        /// Right operand
        rhs: Term,
    },
    /// `regex(str(term), "pattern", "s")`, optionally negated
    Regex {
        /// The term the pattern is tested against
        term: Term,
        /// Backend regex pattern (already translated from wildcards)
        pattern: String,
        /// `true` renders `!regex(...)`
        negated: bool,
    },
    /// `bound(?var)`, optionally negated
    Bound {
        /// Variable name without the `?` sigil
        var: String,
        /// `true` renders `!bound(...)`
        negated: bool,
    },
    /// All sub-expressions hold (`&&`)
    And(Vec<FilterExpr>),
    /// At least one sub-expression holds (`||`)
    Or(Vec<FilterExpr>),
}

impl FilterExpr {
    /// Equality test between a variable and a term.
    pub fn var_equals(var: impl Into<String>, term: Term) -> Self {
        FilterExpr::Compare {
            lhs: Term::Variable(var.into()),
            op: Comparator::Eq,
            rhs: term,
        }
    }

    /// Flatten a list into an AND, avoiding a needless wrapper for a
    /// single expression.
    pub fn and(mut exprs: Vec<FilterExpr>) -> Self {
        if exprs.len() == 1 {
            exprs.pop().unwrap_or(FilterExpr::And(Vec::new()))
        } else {
            FilterExpr::And(exprs)
        }
    }

    /// Flatten a list into an OR, avoiding a needless wrapper for a
    /// single expression.
    pub fn or(mut exprs: Vec<FilterExpr>) -> Self {
        if exprs.len() == 1 {
            exprs.pop().unwrap_or(FilterExpr::Or(Vec::new()))
        } else {
            FilterExpr::Or(exprs)
        }
    }

    /// Rename every reference to variable `from` into `to`.
    pub fn rename_variable(&mut self, from: &str, to: &str) {
        match self {
            FilterExpr::Compare { lhs, rhs, .. } => {
                rename_term(lhs, from, to);
                rename_term(rhs, from, to);
            }
            FilterExpr::Regex { term, .. } => rename_term(term, from, to),
            FilterExpr::Bound { var, .. } => {
                if var == from {
                    *var = to.to_string();
                }
            }
            FilterExpr::And(exprs) | FilterExpr::Or(exprs) => {
                for e in exprs {
                    e.rename_variable(from, to);
                }
            }
        }
    }

    /// Replace every reference to variable `var` by a constant term.
    pub fn substitute_variable(&mut self, var: &str, term: &Term) {
        match self {
            FilterExpr::Compare { lhs, rhs, .. } => {
                substitute_term(lhs, var, term);
                substitute_term(rhs, var, term);
            }
            FilterExpr::Regex { term: t, .. } => substitute_term(t, var, term),
            FilterExpr::Bound { .. } => {}
            FilterExpr::And(exprs) | FilterExpr::Or(exprs) => {
                for e in exprs {
                    e.substitute_variable(var, term);
                }
            }
        }
    }

    /// Record the namespace prefixes this expression references.
    pub fn collect_namespaces(&self, out: &mut BTreeSet<u32>) {
        match self {
            FilterExpr::Compare { lhs, rhs, .. } => {
                lhs.collect_namespaces(out);
                rhs.collect_namespaces(out);
            }
            FilterExpr::Regex { term, .. } => term.collect_namespaces(out),
            FilterExpr::Bound { .. } => {}
            FilterExpr::And(exprs) | FilterExpr::Or(exprs) => {
                for e in exprs {
                    e.collect_namespaces(out);
                }
            }
        }
    }
}

impl fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterExpr::Compare { lhs, op, rhs } => {
                let op = match op {
                    Comparator::Eq => "=",
                    other => other.operator_str().unwrap_or("="),
                };
                write!(f, "{lhs} {op} {rhs}")
            }
            FilterExpr::Regex {
                term,
                pattern,
                negated,
            } => {
                let bang = if *negated { "!" } else { "" };
                write!(
                    f,
                    "{bang}regex( str( {term} ), \"{}\", \"s\" )",
                    crate::term::escape_literal(pattern)
                )
            }
            FilterExpr::Bound { var, negated } => {
                let bang = if *negated { "!" } else { "" };
                write!(f, "{bang}bound( ?{var} )")
            }
            FilterExpr::And(exprs) => write_joined(f, exprs, " && "),
            FilterExpr::Or(exprs) => write_joined(f, exprs, " || "),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, exprs: &[FilterExpr], sep: &str) -> fmt::Result {
    for (i, e) in exprs.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        // Parenthesize nested junctions so precedence survives the text
        match e {
            FilterExpr::And(_) | FilterExpr::Or(_) => write!(f, "( {e} )")?,
            other => write!(f, "{other}")?,
        }
    }
    Ok(())
}

/// One element of a graph pattern.
#[derive(Clone, Debug, PartialEq)]
pub enum GraphClause {
    /// `subject predicate object .`
    Triple {
        /// Subject term
        subject: Term,
        /// Predicate term
        predicate: Term,
        /// Object term
        object: Term,
    },
    /// `subject (predicate)* object .` - zero-or-more property path,
    /// used for redirect resolution
    Path {
        /// Subject term
        subject: Term,
        /// The repeated predicate
        predicate: Term,
        /// Object term
        object: Term,
    },
    /// `{ ... }` group
    Block(Vec<GraphClause>),
    /// `{ A } UNION { B } ...`
    Union(Vec<Vec<GraphClause>>),
    /// `OPTIONAL { ... }`
    Optional(Vec<GraphClause>),
    /// `FILTER( expr )`
    Filter(FilterExpr),
}

impl GraphClause {
    /// Rename every reference to variable `from` into `to`, recursively.
    pub fn rename_variable(&mut self, from: &str, to: &str) {
        match self {
            GraphClause::Triple {
                subject,
                predicate,
                object,
            }
            | GraphClause::Path {
                subject,
                predicate,
                object,
            } => {
                rename_term(subject, from, to);
                rename_term(predicate, from, to);
                rename_term(object, from, to);
            }
            GraphClause::Block(clauses) | GraphClause::Optional(clauses) => {
                rename_all(clauses, from, to)
            }
            GraphClause::Union(branches) => {
                for branch in branches {
                    rename_all(branch, from, to);
                }
            }
            GraphClause::Filter(expr) => expr.rename_variable(from, to),
        }
    }

    /// Replace every reference to variable `var` by a constant term.
    pub fn substitute_variable(&mut self, var: &str, term: &Term) {
        match self {
            GraphClause::Triple {
                subject,
                predicate,
                object,
            }
            | GraphClause::Path {
                subject,
                predicate,
                object,
            } => {
                substitute_term(subject, var, term);
                substitute_term(predicate, var, term);
                substitute_term(object, var, term);
            }
            GraphClause::Block(clauses) | GraphClause::Optional(clauses) => {
                for c in clauses {
                    c.substitute_variable(var, term);
                }
            }
            GraphClause::Union(branches) => {
                for branch in branches {
                    for c in branch {
                        c.substitute_variable(var, term);
                    }
                }
            }
            GraphClause::Filter(expr) => expr.substitute_variable(var, term),
        }
    }

    /// Record the namespace prefixes this clause references.
    pub fn collect_namespaces(&self, out: &mut BTreeSet<u32>) {
        match self {
            GraphClause::Triple {
                subject,
                predicate,
                object,
            }
            | GraphClause::Path {
                subject,
                predicate,
                object,
            } => {
                subject.collect_namespaces(out);
                predicate.collect_namespaces(out);
                object.collect_namespaces(out);
            }
            GraphClause::Block(clauses) | GraphClause::Optional(clauses) => {
                for c in clauses {
                    c.collect_namespaces(out);
                }
            }
            GraphClause::Union(branches) => {
                for branch in branches {
                    for c in branch {
                        c.collect_namespaces(out);
                    }
                }
            }
            GraphClause::Filter(expr) => expr.collect_namespaces(out),
        }
    }

    /// Whether this clause constrains the graph (anything but a filter).
    pub fn is_pattern(&self) -> bool {
        !matches!(self, GraphClause::Filter(_))
    }
}

/// Rename across a clause list.
pub fn rename_all(clauses: &mut [GraphClause], from: &str, to: &str) {
    for c in clauses {
        c.rename_variable(from, to);
    }
}

fn rename_term(term: &mut Term, from: &str, to: &str) {
    if let Term::Variable(name) = term {
        if name == from {
            *name = to.to_string();
        }
    }
}

fn substitute_term(slot: &mut Term, var: &str, term: &Term) {
    if slot.is_variable(var) {
        *slot = term.clone();
    }
}

/// Translate a SQL-LIKE wildcard pattern into an anchored regex.
///
/// `%` matches any run, `_` any single character; `\` escapes the next
/// character. Everything else is regex-escaped literally.
pub fn like_pattern_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 2);
    out.push('^');
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '%' => out.push_str(".*"),
            '_' => out.push('.'),
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push_str(&regex::escape(&escaped.to_string()));
                }
            }
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out.push('$');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_translation() {
        assert_eq!(like_pattern_to_regex("Ber%"), "^Ber.*$");
        assert_eq!(like_pattern_to_regex("B_rlin"), "^B.rlin$");
        assert_eq!(like_pattern_to_regex("100\\%"), "^100%$");
        assert_eq!(like_pattern_to_regex("a.b"), "^a\\.b$");
    }

    #[test]
    fn test_filter_display() {
        let e = FilterExpr::Or(vec![
            FilterExpr::var_equals("result", Term::var("v1")),
            FilterExpr::Compare {
                lhs: Term::var("v2"),
                op: Comparator::Less,
                rhs: Term::Literal {
                    lexical: "5".to_string(),
                    datatype: Some(sema_vocab::xsd::DOUBLE),
                },
            },
        ]);
        assert_eq!(e.to_string(), "?result = ?v1 || ?v2 < \"5\"^^xsd:double");
    }

    #[test]
    fn test_rename_recurses_into_unions() {
        let mut clause = GraphClause::Union(vec![
            vec![GraphClause::Triple {
                subject: Term::var("result"),
                predicate: Term::var("p"),
                object: Term::var("o"),
            }],
            vec![GraphClause::Filter(FilterExpr::Bound {
                var: "result".to_string(),
                negated: false,
            })],
        ]);
        clause.rename_variable("result", "v9");
        match &clause {
            GraphClause::Union(branches) => {
                assert!(matches!(
                    &branches[0][0],
                    GraphClause::Triple { subject: Term::Variable(v), .. } if v == "v9"
                ));
                assert!(matches!(
                    &branches[1][0],
                    GraphClause::Filter(FilterExpr::Bound { var, .. }) if var == "v9"
                ));
            }
            other => panic!("expected union, got {other:?}"),
        }
    }

    #[test]
    fn test_substitute_variable_with_term() {
        let mut clause = GraphClause::Triple {
            subject: Term::var("result"),
            predicate: Term::var("p"),
            object: Term::var("o"),
        };
        let berlin = Term::Prefixed {
            ns: sema_vocab::prefixes::WIKI.0,
            local: "Berlin".to_string(),
        };
        clause.substitute_variable("result", &berlin);
        assert!(matches!(
            clause,
            GraphClause::Triple { subject: Term::Prefixed { .. }, .. }
        ));
    }
}
