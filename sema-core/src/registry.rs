//! Collaborator traits provided by the host system
//!
//! The query core never talks to storage directly. It consumes two
//! narrow interfaces:
//!
//! - [`TypeRegistry`]: which value kind a property carries (drives the
//!   ordering strategy and value-comparison encoding)
//! - [`EntityResolver`]: stable integer ids for pages, and bulk reverse
//!   resolution of ids back to pages (used by the search backend's
//!   result adapter)
//!
//! In-memory implementations are provided for hosts that preload their
//! schema and for tests.

use crate::item::{DataItemKind, PageRef};
use crate::property::PropertyRef;
use std::collections::HashMap;

/// Maps a property to its underlying value kind.
pub trait TypeRegistry: Send + Sync {
    /// The value kind of `property`.
    ///
    /// Unknown properties default to `Page`: in this store an untyped
    /// property holds entity references.
    fn kind_of(&self, property: &PropertyRef) -> DataItemKind;
}

/// Resolves pages to stable integer ids and back.
pub trait EntityResolver: Send + Sync {
    /// The stable id of a page, if the store knows it.
    fn resolve_id(&self, page: &PageRef) -> Option<u64>;

    /// Bulk reverse lookup. Ids the store no longer knows are absent
    /// from the returned map (deleted pages).
    fn resolve_ids(&self, ids: &[u64]) -> HashMap<u64, PageRef>;
}

/// Hash-map backed type registry.
#[derive(Debug, Default)]
pub struct InMemoryTypeRegistry {
    kinds: HashMap<String, DataItemKind>,
}

impl InMemoryTypeRegistry {
    /// Create an empty registry (every property defaults to `Page`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a property's kind, fluent.
    pub fn with(mut self, key: impl AsRef<str>, kind: DataItemKind) -> Self {
        self.kinds
            .insert(key.as_ref().replace(' ', "_"), kind);
        self
    }
}

impl TypeRegistry for InMemoryTypeRegistry {
    fn kind_of(&self, property: &PropertyRef) -> DataItemKind {
        self.kinds
            .get(&property.key)
            .copied()
            .unwrap_or(DataItemKind::Page)
    }
}

/// Hash-map backed entity resolver.
#[derive(Debug, Default)]
pub struct InMemoryResolver {
    ids: HashMap<PageRef, u64>,
    pages: HashMap<u64, PageRef>,
}

impl InMemoryResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page with its id, fluent.
    pub fn with_page(mut self, page: PageRef, id: u64) -> Self {
        self.ids.insert(page.clone(), id);
        self.pages.insert(id, page);
        self
    }
}

impl EntityResolver for InMemoryResolver {
    fn resolve_id(&self, page: &PageRef) -> Option<u64> {
        self.ids.get(page).copied()
    }

    fn resolve_ids(&self, ids: &[u64]) -> HashMap<u64, PageRef> {
        ids.iter()
            .filter_map(|id| self.pages.get(id).map(|p| (*id, p.clone())))
            .collect()
    }
}
