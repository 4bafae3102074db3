//! Condition serialization
//!
//! Turns a finished condition into SPARQL text: the WHERE body (weak
//! conditions first, then a safety catch-all when needed, then the main
//! pattern, then cogent clauses) and the full ASK / SELECT / COUNT
//! query forms with their prologues.

use crate::condition::{Condition, ConditionKind};
use crate::pattern::GraphClause;
use crate::term::Term;
use sema_describe::SortDirection;
use std::collections::BTreeSet;
use std::fmt::Write as _;

/// Variable used by the safety catch-all pattern.
const EXISTS_VARIABLE: &str = "exists";

/// Options for SELECT assembly.
#[derive(Clone, Debug, Default)]
pub struct SelectOptions {
    /// Emit DISTINCT
    pub distinct: bool,
    /// LIMIT, if bounded
    pub limit: Option<usize>,
    /// OFFSET, when non-zero
    pub offset: usize,
    /// ORDER BY entries: variable and direction, in order
    pub order_by: Vec<(String, SortDirection)>,
}

/// Render the PREFIX prologue for the given namespace ids.
pub fn prologue(namespaces: &BTreeSet<u32>) -> String {
    let mut out = String::new();
    for id in namespaces {
        if let Some((_, prefix, iri)) = sema_vocab::prefixes::by_id(*id) {
            let _ = writeln!(out, "PREFIX {prefix}: <{iri}>");
        }
    }
    out
}

/// Render the WHERE body of a condition.
///
/// Weak conditions are materialized here and only here, wrapped in
/// OPTIONAL so ordering support never narrows the result set. If the
/// main pattern is empty and the condition is not safe, a catch-all
/// "entity exists" triple keeps the query bounded. For a singleton the
/// result variable is substituted by the resolved constant term.
pub fn convert_condition_to_string(condition: &Condition, result_var: &str) -> String {
    if matches!(condition.kind, ConditionKind::False) {
        return String::new();
    }

    let substitution = match &condition.kind {
        ConditionKind::Singleton { term, .. } => Some(term.clone()),
        _ => None,
    };

    let mut out = String::new();

    for clauses in condition.weak_conditions.values() {
        let clause = GraphClause::Optional(clauses.clone());
        render_clause(&prepare(clause, result_var, &substitution), "  ", &mut out);
    }

    let main = condition.clauses();
    if main.is_empty() && !condition.is_safe() {
        let _ = writeln!(
            out,
            "  ?{result_var} sema:sortKey ?{EXISTS_VARIABLE} ."
        );
    }
    for clause in main {
        render_clause(&prepare(clause.clone(), result_var, &substitution), "  ", &mut out);
    }
    if let ConditionKind::Filter { expr } = &condition.kind {
        let mut expr = expr.clone();
        if let Some(term) = &substitution {
            expr.substitute_variable(result_var, term);
        }
        let _ = writeln!(out, "  FILTER( {expr} )");
    }

    for clause in &condition.cogent_conditions {
        render_clause(&prepare(clause.clone(), result_var, &substitution), "  ", &mut out);
    }

    out
}

/// The namespaces a rendered condition references, including those the
/// serializer itself introduces (the catch-all pattern).
pub fn effective_namespaces(condition: &Condition) -> BTreeSet<u32> {
    let mut namespaces = condition.namespaces.clone();
    if condition.clauses().is_empty() && !condition.is_safe() {
        namespaces.insert(sema_vocab::prefixes::STORE.0);
    }
    namespaces
}

/// Render a full ASK query for a condition.
pub fn ask_query(condition: &Condition, result_var: &str) -> String {
    let body = convert_condition_to_string(condition, result_var);
    format!(
        "{}ASK WHERE {{\n{body}}}",
        prologue(&effective_namespaces(condition))
    )
}

/// Render a full SELECT query for a condition.
pub fn select_query(condition: &Condition, result_var: &str, options: &SelectOptions) -> String {
    let body = convert_condition_to_string(condition, result_var);
    let mut out = prologue(&effective_namespaces(condition));
    let distinct = if options.distinct { "DISTINCT " } else { "" };
    let _ = write!(out, "SELECT {distinct}?{result_var} WHERE {{\n{body}}}");
    append_solution_modifiers(&mut out, options);
    out
}

/// Render a COUNT query for a condition.
pub fn count_query(condition: &Condition, result_var: &str) -> String {
    let body = convert_condition_to_string(condition, result_var);
    let mut out = prologue(&effective_namespaces(condition));
    let _ = write!(
        out,
        "SELECT ( COUNT( DISTINCT ?{result_var} ) AS ?count ) WHERE {{\n{body}}}"
    );
    out
}

fn append_solution_modifiers(out: &mut String, options: &SelectOptions) {
    // RANDOM is recognized but backend-dependent; it never reaches the
    // ORDER BY clause here.
    let ordered: Vec<&(String, SortDirection)> = options
        .order_by
        .iter()
        .filter(|(_, d)| *d != SortDirection::Random)
        .collect();
    if !ordered.is_empty() {
        out.push_str("\nORDER BY");
        for (var, direction) in ordered {
            let keyword = match direction {
                SortDirection::Asc => "ASC",
                SortDirection::Desc => "DESC",
                SortDirection::Random => unreachable!("filtered above"),
            };
            let _ = write!(out, " {keyword}( ?{var} )");
        }
    }
    if let Some(limit) = options.limit {
        let _ = write!(out, "\nLIMIT {limit}");
    }
    if options.offset > 0 {
        let _ = write!(out, "\nOFFSET {}", options.offset);
    }
}

fn prepare(mut clause: GraphClause, result_var: &str, substitution: &Option<Term>) -> GraphClause {
    if let Some(term) = substitution {
        clause.substitute_variable(result_var, term);
    }
    clause
}

fn render_clause(clause: &GraphClause, indent: &str, out: &mut String) {
    match clause {
        GraphClause::Triple {
            subject,
            predicate,
            object,
        } => {
            let _ = writeln!(out, "{indent}{subject} {predicate} {object} .");
        }
        GraphClause::Path {
            subject,
            predicate,
            object,
        } => {
            let _ = writeln!(out, "{indent}{subject} ({predicate})* {object} .");
        }
        GraphClause::Block(clauses) => {
            let _ = writeln!(out, "{indent}{{");
            render_all(clauses, &deeper(indent), out);
            let _ = writeln!(out, "{indent}}}");
        }
        GraphClause::Union(branches) => {
            for (i, branch) in branches.iter().enumerate() {
                if i == 0 {
                    let _ = writeln!(out, "{indent}{{");
                } else {
                    let _ = writeln!(out, "{indent}}} UNION {{");
                }
                render_all(branch, &deeper(indent), out);
            }
            let _ = writeln!(out, "{indent}}}");
        }
        GraphClause::Optional(clauses) => {
            let _ = writeln!(out, "{indent}OPTIONAL {{");
            render_all(clauses, &deeper(indent), out);
            let _ = writeln!(out, "{indent}}}");
        }
        GraphClause::Filter(expr) => {
            let _ = writeln!(out, "{indent}FILTER( {expr} )");
        }
    }
}

fn render_all(clauses: &[GraphClause], indent: &str, out: &mut String) {
    for clause in clauses {
        render_clause(clause, indent, out);
    }
}

fn deeper(indent: &str) -> String {
    format!("{indent}  ")
}
