//! Schema catalogue: constraints and indexes captured with the snapshot.

use serde::{Deserialize, Serialize};

/// Kind of a declared constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// Property tuple must be unique for entities with this label.
    Unique,
    /// Compound key: unique and all properties present.
    NodeKey,
    /// Properties must exist; carries no identity information.
    Exists,
}

/// What the constraint is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintScope {
    Node,
    Relationship,
}

/// A declared constraint, read-only input to the export.
///
/// `Unique` and `NodeKey` node constraints double as identity-key candidates;
/// `Exists` constraints are catalogue input only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub label: String,
    /// Ordered property-key tuple, as declared.
    pub properties: Vec<String>,
    pub kind: ConstraintKind,
    pub scope: ConstraintScope,
}

impl Constraint {
    pub fn unique(label: impl Into<String>, properties: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            label: label.into(),
            properties: properties.into_iter().map(Into::into).collect(),
            kind: ConstraintKind::Unique,
            scope: ConstraintScope::Node,
        }
    }

    pub fn node_key(label: impl Into<String>, properties: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            label: label.into(),
            properties: properties.into_iter().map(Into::into).collect(),
            kind: ConstraintKind::NodeKey,
            scope: ConstraintScope::Node,
        }
    }

    pub fn exists(label: impl Into<String>, properties: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            label: label.into(),
            properties: properties.into_iter().map(Into::into).collect(),
            kind: ConstraintKind::Exists,
            scope: ConstraintScope::Node,
        }
    }
}

/// A declared index, replayed for completeness only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub label: String,
    pub properties: Vec<String>,
}

impl Index {
    pub fn new(label: impl Into<String>, properties: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            label: label.into(),
            properties: properties.into_iter().map(Into::into).collect(),
        }
    }
}
