//! Typed value model
//!
//! `DataItem` is the closed set of value kinds a property can carry.
//! It mirrors the store's datatype system: entity references are pages,
//! everything else is a typed literal.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A reference to a wiki page (entity, category, property, or concept).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRef {
    /// Canonical (database-form) title, underscores instead of spaces
    pub title: String,
    /// Wiki namespace code (see `sema_vocab::ns`)
    pub namespace: i32,
}

impl PageRef {
    /// Create a page reference, normalizing spaces to underscores.
    pub fn new(title: impl AsRef<str>, namespace: i32) -> Self {
        Self {
            title: title.as_ref().replace(' ', "_"),
            namespace,
        }
    }

    /// A page in the main (article) namespace.
    pub fn main(title: impl AsRef<str>) -> Self {
        Self::new(title, sema_vocab::ns::MAIN)
    }

    /// A category page.
    pub fn category(title: impl AsRef<str>) -> Self {
        Self::new(title, sema_vocab::ns::CATEGORY)
    }

    /// A property page.
    pub fn property(title: impl AsRef<str>) -> Self {
        Self::new(title, sema_vocab::ns::PROPERTY)
    }

    /// A concept page.
    pub fn concept(title: impl AsRef<str>) -> Self {
        Self::new(title, sema_vocab::ns::CONCEPT)
    }

    /// The natural sort key of the page: its display title.
    ///
    /// Entity ordering always routes through sort keys, never through
    /// term names; comparisons against a page compare this value.
    pub fn sort_key(&self) -> String {
        self.title.replace('_', " ")
    }
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace == sema_vocab::ns::MAIN {
            write!(f, "{}", self.title)
        } else {
            write!(f, "ns{}:{}", self.namespace, self.title)
        }
    }
}

/// A typed value carried by a property.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DataItem {
    /// Reference to another page (entity reference)
    Page(PageRef),
    /// Plain text (xsd:string)
    Text(String),
    /// Numeric value (xsd:double)
    Number(f64),
    /// Unit-bearing numeric value; compares on the value part
    Quantity {
        /// Numeric magnitude
        value: f64,
        /// Unit label, already normalized by the host
        unit: String,
    },
    /// Point in time (xsd:dateTime)
    Time(DateTime<FixedOffset>),
    /// Boolean (xsd:boolean)
    Boolean(bool),
    /// External URI (xsd:anyURI)
    Uri(String),
}

impl DataItem {
    /// The kind of this item.
    pub fn kind(&self) -> DataItemKind {
        match self {
            DataItem::Page(_) => DataItemKind::Page,
            DataItem::Text(_) => DataItemKind::Text,
            DataItem::Number(_) => DataItemKind::Number,
            DataItem::Quantity { .. } => DataItemKind::Quantity,
            DataItem::Time(_) => DataItemKind::Time,
            DataItem::Boolean(_) => DataItemKind::Boolean,
            DataItem::Uri(_) => DataItemKind::Uri,
        }
    }

    /// The lexical form used when serializing this item as a literal.
    ///
    /// Pages have no lexical form here; their serialization is a term
    /// name and is owned by the backend exporters.
    pub fn lexical_form(&self) -> Option<String> {
        match self {
            DataItem::Page(_) => None,
            DataItem::Text(s) => Some(s.clone()),
            DataItem::Number(n) => Some(format_number(*n)),
            DataItem::Quantity { value, .. } => Some(format_number(*value)),
            DataItem::Time(t) => Some(t.to_rfc3339_opts(SecondsFormat::Secs, true)),
            DataItem::Boolean(b) => Some(b.to_string()),
            DataItem::Uri(u) => Some(u.clone()),
        }
    }

    /// The sort key of this item: the scalar ordering comparisons use.
    ///
    /// For pages this is the page sort key (requires the sort-key hop in
    /// the generated query); for literals it is the lexical form.
    pub fn sort_key(&self) -> String {
        match self {
            DataItem::Page(p) => p.sort_key(),
            other => other.lexical_form().unwrap_or_default(),
        }
    }
}

/// Render a float the way the store stores numerics: integral values
/// without a trailing `.0`.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// The closed set of value kinds, used by the type registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataItemKind {
    /// Entity reference
    Page,
    /// Plain text
    Text,
    /// Numeric
    Number,
    /// Unit-bearing numeric
    Quantity,
    /// Point in time
    Time,
    /// Boolean
    Boolean,
    /// External URI
    Uri,
    /// Concept (stored query definition)
    Concept,
}

impl DataItemKind {
    /// Whether values of this kind are entity references.
    ///
    /// Entity references are not directly orderable; ordering routes
    /// through the sort-key property.
    pub fn is_entity_reference(self) -> bool {
        matches!(self, DataItemKind::Page | DataItemKind::Concept)
    }

    /// Whether values of this kind are text-like (LIKE/NLKE applicable).
    pub fn is_text_like(self) -> bool {
        matches!(self, DataItemKind::Text | DataItemKind::Uri)
    }

    /// The XSD datatype IRI for literal kinds, if any.
    pub fn xsd_datatype(self) -> Option<&'static str> {
        match self {
            DataItemKind::Page | DataItemKind::Concept => None,
            DataItemKind::Text => Some(sema_vocab::xsd::STRING),
            DataItemKind::Number | DataItemKind::Quantity => Some(sema_vocab::xsd::DOUBLE),
            DataItemKind::Time => Some(sema_vocab::xsd::DATE_TIME),
            DataItemKind::Boolean => Some(sema_vocab::xsd::BOOLEAN),
            DataItemKind::Uri => Some(sema_vocab::xsd::ANY_URI),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_ref_normalizes_title() {
        let p = PageRef::main("New York");
        assert_eq!(p.title, "New_York");
        assert_eq!(p.sort_key(), "New York");
    }

    #[test]
    fn test_number_lexical_form() {
        assert_eq!(DataItem::Number(42.0).lexical_form().unwrap(), "42");
        assert_eq!(DataItem::Number(1.5).lexical_form().unwrap(), "1.5");
    }

    #[test]
    fn test_kind_predicates() {
        assert!(DataItemKind::Page.is_entity_reference());
        assert!(!DataItemKind::Text.is_entity_reference());
        assert!(DataItemKind::Text.is_text_like());
        assert!(DataItemKind::Uri.is_text_like());
        assert!(!DataItemKind::Number.is_text_like());
    }

    #[test]
    fn test_quantity_compares_on_value() {
        let q = DataItem::Quantity {
            value: 3.0,
            unit: "km".to_string(),
        };
        assert_eq!(q.lexical_form().unwrap(), "3");
    }
}
