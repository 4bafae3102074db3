//! Sort-key configuration
//!
//! A query carries an ordered map from property key to direction. The
//! empty key means "order by the subject's own sort key". Order of
//! insertion is the order of the final ORDER BY clause, so the map is
//! backed by a vector rather than a hash map.

use serde::{Deserialize, Serialize};

/// Direction token for one sort key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    /// Ascending
    #[default]
    Asc,
    /// Descending
    Desc,
    /// Backend-dependent random order; recognized everywhere, honored
    /// only where the backend supports it
    Random,
}

impl SortDirection {
    /// The keyword form used in serialized queries.
    pub fn keyword(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
            SortDirection::Random => "RANDOM",
        }
    }
}

/// Ordered sort-key map: property key (or `""` for the subject) to
/// direction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKeys {
    keys: Vec<(String, SortDirection)>,
}

impl SortKeys {
    /// Empty configuration (no ordering requested).
    pub fn none() -> Self {
        Self::default()
    }

    /// Add a sort key, fluent. A repeated key overwrites its direction
    /// but keeps its original position.
    pub fn with(mut self, key: impl AsRef<str>, direction: SortDirection) -> Self {
        self.insert(key, direction);
        self
    }

    /// Add or update a sort key.
    pub fn insert(&mut self, key: impl AsRef<str>, direction: SortDirection) {
        let key = key.as_ref().replace(' ', "_");
        if let Some(entry) = self.keys.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = direction;
        } else {
            self.keys.push((key, direction));
        }
    }

    /// The direction requested for `key`, if any.
    pub fn get(&self, key: &str) -> Option<SortDirection> {
        self.keys.iter().find(|(k, _)| k == key).map(|(_, d)| *d)
    }

    /// Whether `key` is a requested sort target.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterate keys in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, SortDirection)> {
        self.keys.iter().map(|(k, d)| (k.as_str(), *d))
    }

    /// Whether no ordering was requested.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of sort keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_preserved() {
        let keys = SortKeys::none()
            .with("Population", SortDirection::Desc)
            .with("", SortDirection::Asc);
        let order: Vec<_> = keys.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(order, vec!["Population", ""]);
    }

    #[test]
    fn test_repeated_key_keeps_position() {
        let keys = SortKeys::none()
            .with("A", SortDirection::Asc)
            .with("B", SortDirection::Asc)
            .with("A", SortDirection::Desc);
        assert_eq!(keys.len(), 2);
        assert_eq!(keys.get("A"), Some(SortDirection::Desc));
        assert_eq!(keys.iter().next().unwrap().0, "A");
    }

    #[test]
    fn test_space_normalization() {
        let keys = SortKeys::none().with("Located in", SortDirection::Asc);
        assert!(keys.contains("Located_in"));
    }
}
