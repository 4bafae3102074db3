//! Property references
//!
//! A `PropertyRef` names a property by its key (the property page title)
//! and records whether the traversal direction is inverted. The inverse
//! flag is a direction hint only; serialization always uses the
//! canonical, non-inverse identity.

use crate::item::PageRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a property, possibly traversed in inverse direction.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyRef {
    /// Property key (canonical page title in the property namespace)
    pub key: String,
    /// Whether subject/object roles are swapped when emitting patterns
    pub inverse: bool,
}

impl PropertyRef {
    /// Create a property reference.
    pub fn new(key: impl AsRef<str>) -> Self {
        Self {
            key: key.as_ref().replace(' ', "_"),
            inverse: false,
        }
    }

    /// Create an inverse property reference.
    pub fn inverse(key: impl AsRef<str>) -> Self {
        Self {
            inverse: true,
            ..Self::new(key)
        }
    }

    /// The canonical (non-inverse) identity of this property.
    pub fn canonical(&self) -> PropertyRef {
        PropertyRef {
            key: self.key.clone(),
            inverse: false,
        }
    }

    /// The property page backing this reference.
    pub fn page(&self) -> PageRef {
        PageRef::property(&self.key)
    }
}

impl fmt::Display for PropertyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inverse {
            write!(f, "-{}", self.key)
        } else {
            write!(f, "{}", self.key)
        }
    }
}
