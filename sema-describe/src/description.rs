//! The query description AST
//!
//! A `Description` is an immutable tree supplied by the caller: the
//! backend-independent statement of which entities a query matches.
//! Print requests ride along on nodes but play no role in condition
//! building; they only drive downstream projection.

use sema_core::{Comparator, DataItem, PageRef, PropertyRef};
use serde::{Deserialize, Serialize};

/// A query description node with its attached print requests.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Description {
    /// The structural node
    pub node: DescriptionNode,
    /// Print requests attached to this node (projection only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prints: Vec<PrintRequest>,
}

/// The closed set of description variants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DescriptionNode {
    /// Matches anything (universal truth)
    Thing,
    /// Membership in at least one of the given categories
    Class {
        /// Category pages; empty means nothing can match
        categories: Vec<PageRef>,
    },
    /// Pages in a fixed wiki namespace
    Namespace {
        /// Namespace code
        namespace: i32,
    },
    /// A value constraint on the current join variable
    Value {
        /// The constant to compare against
        value: DataItem,
        /// How to compare
        comparator: Comparator,
    },
    /// A stored concept (named sub-query)
    Concept {
        /// The concept page
        concept: PageRef,
    },
    /// "Has property P whose value matches the inner description"
    SomeProperty {
        /// The property, possibly inverse
        property: PropertyRef,
        /// Constraint on the property's value
        inner: Box<Description>,
    },
    /// All children must match
    Conjunction(Vec<Description>),
    /// At least one child must match
    Disjunction(Vec<Description>),
}

impl Description {
    fn from_node(node: DescriptionNode) -> Self {
        Self {
            node,
            prints: Vec::new(),
        }
    }

    /// The universal description.
    pub fn thing() -> Self {
        Self::from_node(DescriptionNode::Thing)
    }

    /// Class membership in any of `categories`.
    pub fn class(categories: Vec<PageRef>) -> Self {
        Self::from_node(DescriptionNode::Class { categories })
    }

    /// Namespace restriction.
    pub fn namespace(namespace: i32) -> Self {
        Self::from_node(DescriptionNode::Namespace { namespace })
    }

    /// Value comparison.
    pub fn value(value: DataItem, comparator: Comparator) -> Self {
        Self::from_node(DescriptionNode::Value { value, comparator })
    }

    /// Stored concept.
    pub fn concept(concept: PageRef) -> Self {
        Self::from_node(DescriptionNode::Concept { concept })
    }

    /// Property constraint.
    pub fn some_property(property: PropertyRef, inner: Description) -> Self {
        Self::from_node(DescriptionNode::SomeProperty {
            property,
            inner: Box::new(inner),
        })
    }

    /// Conjunction of `children`, flattening directly nested conjunctions.
    pub fn conjunction(children: Vec<Description>) -> Self {
        let mut flat = Vec::with_capacity(children.len());
        for child in children {
            match child.node {
                DescriptionNode::Conjunction(inner) if child.prints.is_empty() => {
                    flat.extend(inner)
                }
                _ => flat.push(child),
            }
        }
        Self::from_node(DescriptionNode::Conjunction(flat))
    }

    /// Disjunction of `children`, flattening directly nested disjunctions.
    pub fn disjunction(children: Vec<Description>) -> Self {
        let mut flat = Vec::with_capacity(children.len());
        for child in children {
            match child.node {
                DescriptionNode::Disjunction(inner) if child.prints.is_empty() => {
                    flat.extend(inner)
                }
                _ => flat.push(child),
            }
        }
        Self::from_node(DescriptionNode::Disjunction(flat))
    }

    /// Attach a print request, fluent.
    pub fn with_print(mut self, print: PrintRequest) -> Self {
        self.prints.push(print);
        self
    }

    /// Whether this is the bare universal description.
    pub fn is_thing(&self) -> bool {
        matches!(self.node, DescriptionNode::Thing)
    }

    /// Number of nodes in this tree.
    pub fn size(&self) -> usize {
        1 + match &self.node {
            DescriptionNode::SomeProperty { inner, .. } => inner.size(),
            DescriptionNode::Conjunction(children) | DescriptionNode::Disjunction(children) => {
                children.iter().map(Description::size).sum()
            }
            _ => 0,
        }
    }

    /// Nesting depth of this tree.
    ///
    /// Only `SomeProperty` adds a level: conjunctions and disjunctions
    /// join constraints on the same entity without traversing to a new
    /// one.
    pub fn depth(&self) -> usize {
        match &self.node {
            DescriptionNode::SomeProperty { inner, .. } => 1 + inner.depth(),
            DescriptionNode::Conjunction(children) | DescriptionNode::Disjunction(children) => {
                children.iter().map(Description::depth).max().unwrap_or(0)
            }
            _ => 0,
        }
    }

    /// Truncate this tree to the given size and depth budgets.
    ///
    /// Oversized subtrees are replaced by [`Description::thing`], which
    /// widens the result set but never drops matches. Returns `true` if
    /// anything was pruned, so the caller can attach a precision-loss
    /// warning.
    pub fn prune(&mut self, max_size: usize, max_depth: usize) -> bool {
        let mut budget = max_size;
        let pruned = self.prune_inner(&mut budget, max_depth);
        if pruned {
            tracing::debug!(max_size, max_depth, "description pruned to budget");
        }
        pruned
    }

    fn prune_inner(&mut self, budget: &mut usize, depth_left: usize) -> bool {
        if *budget == 0 || (depth_left == 0 && matches!(self.node, DescriptionNode::SomeProperty { .. })) {
            self.node = DescriptionNode::Thing;
            self.prints.clear();
            return true;
        }
        *budget -= 1;
        match &mut self.node {
            DescriptionNode::SomeProperty { inner, .. } => {
                inner.prune_inner(budget, depth_left - 1)
            }
            DescriptionNode::Conjunction(children) | DescriptionNode::Disjunction(children) => {
                let mut pruned = false;
                for child in children {
                    pruned |= child.prune_inner(budget, depth_left);
                }
                pruned
            }
            _ => false,
        }
    }
}

/// A requested output column.
///
/// Irrelevant to condition building; carried through so the engines can
/// hand them to the host's projection layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrintRequest {
    /// Column label
    pub label: String,
    /// The property to project, or `None` for the subject itself
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<PropertyRef>,
}

impl PrintRequest {
    /// Project the subject itself.
    pub fn subject(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            property: None,
        }
    }

    /// Project a property's values.
    pub fn property(label: impl Into<String>, property: PropertyRef) -> Self {
        Self {
            label: label.into(),
            property: Some(property),
        }
    }
}
