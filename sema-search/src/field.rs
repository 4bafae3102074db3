//! Document field mapping
//!
//! The index stores one document per entity:
//!
//! ```text
//! {
//!   "subject":  { "id": 7, "title": "Berlin", "namespace": 0, "sortkey": "Berlin" },
//!   "category": [ 14, 92 ],
//!   "P:42":     { "wpgID": [9], "wpgField": ["Germany"], ... },
//!   "P:43":     { "numField": [3645000.0] }
//! }
//! ```
//!
//! Property fields are typed: one suffix per value kind, plus a sort
//! variant where ordering needs a different analyzer. The mapper
//! resolves property pages to their stable ids through the entity
//! resolver; a property the store does not know maps to no field at
//! all, which the interpreters treat as "nothing can match".

use sema_core::{DataItemKind, EntityResolver, PropertyRef, TypeRegistry};
use std::sync::Arc;

/// Subject sort-key field.
pub const SUBJECT_SORT_FIELD: &str = "subject.sortkey";

/// Subject namespace field.
pub const SUBJECT_NAMESPACE_FIELD: &str = "subject.namespace";

/// Subject id field.
pub const SUBJECT_ID_FIELD: &str = "subject.id";

/// Category membership field (category page ids).
pub const CATEGORY_FIELD: &str = "category";

/// The resolved fields of one property.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyFields {
    /// Canonical property key
    pub key: String,
    /// Stable property id
    pub id: u64,
    /// The value kind the property carries
    pub kind: DataItemKind,
}

impl PropertyFields {
    /// The field exact-value queries target.
    ///
    /// Entity values match on the referenced page id.
    pub fn value_field(&self) -> String {
        let suffix = match self.kind {
            DataItemKind::Page | DataItemKind::Concept => "wpgID",
            DataItemKind::Text => "txtField",
            DataItemKind::Number | DataItemKind::Quantity => "numField",
            DataItemKind::Time => "datField",
            DataItemKind::Boolean => "booField",
            DataItemKind::Uri => "uriField",
        };
        format!("P:{}.{suffix}", self.id)
    }

    /// The field text patterns match against.
    pub fn text_field(&self) -> String {
        let suffix = match self.kind {
            DataItemKind::Page | DataItemKind::Concept => "wpgField",
            DataItemKind::Uri => "uriField",
            _ => "txtField",
        };
        format!("P:{}.{suffix}", self.id)
    }

    /// The field ordering comparisons and sorts use.
    ///
    /// Entity values sort on the referenced page's sort key; text sorts
    /// on the keyword sub-field.
    pub fn sort_field(&self) -> String {
        match self.kind {
            DataItemKind::Page | DataItemKind::Concept => {
                format!("P:{}.wpgField.sort", self.id)
            }
            DataItemKind::Text => format!("P:{}.txtField.keyword", self.id),
            _ => self.value_field(),
        }
    }

    /// The field existence checks use (any typed value present).
    pub fn exists_field(&self) -> String {
        self.value_field()
    }
}

/// Resolves properties to their document fields.
#[derive(Clone)]
pub struct FieldMapper {
    resolver: Arc<dyn EntityResolver>,
    types: Arc<dyn TypeRegistry>,
}

impl FieldMapper {
    /// Create a mapper over the host's resolver and type registry.
    pub fn new(resolver: Arc<dyn EntityResolver>, types: Arc<dyn TypeRegistry>) -> Self {
        Self { resolver, types }
    }

    /// The fields of a property, or `None` when the store has no id for
    /// it (then no document can carry it).
    pub fn property_fields(&self, property: &PropertyRef) -> Option<PropertyFields> {
        let canonical = property.canonical();
        let id = self.resolver.resolve_id(&canonical.page())?;
        Some(PropertyFields {
            key: canonical.key.clone(),
            kind: self.types.kind_of(&canonical),
            id,
        })
    }

    /// The stable id of a page, if known.
    pub fn page_id(&self, page: &sema_core::PageRef) -> Option<u64> {
        self.resolver.resolve_id(page)
    }
}
