//! Turtle term model and exporter
//!
//! A `Term` is one token position in a graph pattern: a variable, a
//! prefixed name, a full IRI, or a typed literal. The exporter resolves
//! the shared data model (`PageRef`, `PropertyRef`, `DataItem`) into
//! terms, tracking which namespace prefixes the produced term needs.

use sema_core::{DataItem, DataItemKind, PageRef, PropertyRef};
use std::collections::BTreeSet;
use std::fmt;

/// One token position in a SPARQL graph pattern.
#[derive(Clone, Debug, PartialEq)]
pub enum Term {
    /// `?name`
    Variable(String),
    /// `prefix:local`, prefix identified by namespace id
    Prefixed {
        /// Namespace id (see `sema_vocab::prefixes`)
        ns: u32,
        /// Escaped local name
        local: String,
    },
    /// `<iri>`
    Iri(String),
    /// `"lexical"` or `"lexical"^^xsd:type`
    Literal {
        /// Lexical form, unescaped
        lexical: String,
        /// Full datatype IRI; plain string literal when `None`
        datatype: Option<&'static str>,
    },
}

impl Term {
    /// Convenience constructor for a variable term.
    pub fn var(name: impl Into<String>) -> Self {
        Term::Variable(name.into())
    }

    /// Whether this term is the variable `name`.
    pub fn is_variable(&self, name: &str) -> bool {
        matches!(self, Term::Variable(v) if v == name)
    }

    /// Record the namespace prefixes this term references.
    pub fn collect_namespaces(&self, out: &mut BTreeSet<u32>) {
        match self {
            Term::Prefixed { ns, .. } => {
                out.insert(*ns);
            }
            Term::Literal {
                datatype: Some(dt), ..
            } => {
                if dt.starts_with("http://www.w3.org/2001/XMLSchema#") {
                    out.insert(sema_vocab::prefixes::XSD.0);
                }
            }
            _ => {}
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(name) => write!(f, "?{name}"),
            Term::Prefixed { ns, local } => {
                let prefix = sema_vocab::prefixes::by_id(*ns)
                    .map(|(_, p, _)| p)
                    .unwrap_or("wiki");
                write!(f, "{prefix}:{local}")
            }
            Term::Iri(iri) => write!(f, "<{iri}>"),
            Term::Literal { lexical, datatype } => {
                write!(f, "\"{}\"", escape_literal(lexical))?;
                if let Some(dt) = datatype {
                    match dt.strip_prefix("http://www.w3.org/2001/XMLSchema#") {
                        Some(local) => write!(f, "^^xsd:{local}"),
                        None => write!(f, "^^<{dt}>"),
                    }
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Escape a string for use inside a double-quoted Turtle literal.
pub fn escape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

/// Escape a page title for use as the local part of a prefixed name.
///
/// Anything outside the safe identifier set is percent-encoded, the way
/// the store's own exporter writes page IRIs.
pub fn escape_local(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            out.push(c);
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{byte:02X}"));
            }
        }
    }
    out
}

/// Resolves data-model references into Turtle terms.
///
/// Stateless; namespace usage is reported through each term's
/// `collect_namespaces`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Exporter;

impl Exporter {
    /// The term naming a wiki page.
    ///
    /// Pages in namespaces without a dedicated prefix are encoded under
    /// the `wiki:` prefix with the namespace code folded into the local
    /// name.
    pub fn page_term(&self, page: &PageRef) -> Term {
        use sema_vocab::{ns, prefixes};
        let (ns_id, local) = match page.namespace {
            n if n == ns::MAIN => (prefixes::WIKI.0, escape_local(&page.title)),
            n if n == ns::CATEGORY => (prefixes::CATEGORY.0, escape_local(&page.title)),
            n if n == ns::PROPERTY => (prefixes::PROPERTY.0, escape_local(&page.title)),
            n if n == ns::CONCEPT => (prefixes::CONCEPT.0, escape_local(&page.title)),
            other => (
                prefixes::WIKI.0,
                format!("{other}-{}", escape_local(&page.title)),
            ),
        };
        Term::Prefixed { ns: ns_id, local }
    }

    /// The predicate term for a property, given the value kind it
    /// carries.
    ///
    /// Quantities need the auxiliary numeric projection: the property's
    /// plain term points at the full value node, the `-num` helper at
    /// the comparable magnitude. The inverse flag never reaches the
    /// term; direction is the caller's concern.
    pub fn property_term(&self, property: &PropertyRef, kind: DataItemKind) -> Term {
        let mut local = escape_local(&property.canonical().key);
        if kind == DataItemKind::Quantity {
            local.push_str("-num");
        }
        Term::Prefixed {
            ns: sema_vocab::prefixes::PROPERTY.0,
            local,
        }
    }

    /// A well-known ontology term (`sema:` prefix).
    pub fn store_term(&self, iri: &'static str) -> Term {
        let local = iri
            .strip_prefix(sema_vocab::store::BASE)
            .unwrap_or(iri)
            .to_string();
        Term::Prefixed {
            ns: sema_vocab::prefixes::STORE.0,
            local,
        }
    }

    /// The object term for a data item.
    ///
    /// Pages resolve to resource terms; everything else to a typed
    /// literal.
    pub fn data_item_term(&self, item: &DataItem) -> Term {
        match item {
            DataItem::Page(page) => self.page_term(page),
            other => Term::Literal {
                lexical: other.lexical_form().unwrap_or_default(),
                datatype: other.kind().xsd_datatype(),
            },
        }
    }

    /// The literal a value comparison compares against.
    ///
    /// Entity references compare through their sort key, never through
    /// the term name.
    pub fn comparison_literal(&self, item: &DataItem) -> Term {
        match item {
            DataItem::Page(page) => Term::Literal {
                lexical: page.sort_key(),
                datatype: None,
            },
            other => self.data_item_term(other),
        }
    }

    /// The namespace-encoding literal for a namespace filter.
    pub fn namespace_literal(&self, namespace: i32) -> Term {
        Term::Literal {
            lexical: namespace.to_string(),
            datatype: Some(sema_vocab::xsd::INTEGER),
        }
    }
}
