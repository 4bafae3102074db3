//! Value-comparison operators

use serde::{Deserialize, Serialize};

/// Comparison operator attached to a value description.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    /// Equal - collapses to a singleton condition
    Eq,
    /// Strictly less than
    Less,
    /// Strictly greater than
    Greater,
    /// Less than or equal
    Leq,
    /// Greater than or equal
    Geq,
    /// Not equal
    Neq,
    /// SQL-LIKE wildcard match (`%`, `_`), text-like kinds only
    Like,
    /// Negated LIKE
    NotLike,
}

impl Comparator {
    /// The operator token for the ordering subset, as both backends'
    /// expression syntaxes spell it.
    ///
    /// Returns `None` for `Eq`, `Like`, and `NotLike`, which never render
    /// as bare binary operators.
    pub fn operator_str(self) -> Option<&'static str> {
        match self {
            Comparator::Less => Some("<"),
            Comparator::Greater => Some(">"),
            Comparator::Leq => Some("<="),
            Comparator::Geq => Some(">="),
            Comparator::Neq => Some("!="),
            Comparator::Eq | Comparator::Like | Comparator::NotLike => None,
        }
    }

    /// Whether this comparator orders values (everything except equality
    /// and pattern matching).
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            Comparator::Less
                | Comparator::Greater
                | Comparator::Leq
                | Comparator::Geq
                | Comparator::Neq
        )
    }

    /// Whether this is a wildcard-pattern comparator.
    pub fn is_like(self) -> bool {
        matches!(self, Comparator::Like | Comparator::NotLike)
    }
}
