//! Identity resolution: how each node is matched on replay.
//!
//! A node either has a natural key (derived from a unique or node-key
//! constraint it satisfies) or gets a synthetic key: a run-local counter
//! stored under the reserved property, matched through the reserved
//! temporary label. The counter is owned by one resolver instance per run;
//! concurrent runs never share it.

use hashbrown::HashMap;

use crate::model::{Constraint, ConstraintKind, ConstraintScope, GraphSnapshot, Node, NodeId, Value};

/// Temporary label added to synthetically keyed nodes, stripped by cleanup.
pub const RESERVED_LABEL: &str = "UNIQUE IMPORT LABEL";
/// Property holding the run-local synthetic counter, stripped by cleanup.
pub const RESERVED_PROPERTY: &str = "UNIQUE IMPORT ID";
/// Name of the synthetic uniqueness constraint, so it can be dropped by name.
pub const RESERVED_CONSTRAINT_NAME: &str = "UNIQUE_IMPORT_NAME";

/// Structural shape of an identity key: which label and which property keys
/// the replay predicate is built from. Two nodes with equal shapes can share
/// one batched statement template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyShape {
    pub label: String,
    /// Ordered key-property tuple (the constraint's declared order), or the
    /// reserved property for synthetic keys.
    pub properties: Vec<String>,
    pub synthetic: bool,
}

impl KeyShape {
    /// Field name a key property takes inside a batched row map.
    pub fn row_field(&self, i: usize) -> &str {
        if self.synthetic { "_id" } else { &self.properties[i] }
    }
}

/// One node's resolved replay predicate: shape plus this node's key values,
/// aligned index-for-index with `shape.properties`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedIdentity {
    pub shape: KeyShape,
    pub values: Vec<Value>,
}

/// Result of resolving a whole snapshot.
#[derive(Debug)]
pub struct Resolution {
    pub identities: HashMap<NodeId, ResolvedIdentity>,
    /// How many nodes fell back to a synthetic key.
    pub synthetic_count: u64,
}

impl Resolution {
    pub fn has_synthetic(&self) -> bool {
        self.synthetic_count > 0
    }
}

/// Derives the replay predicate for each node in a snapshot.
pub struct IdentityResolver {
    /// Identity candidates in selection order.
    candidates: Vec<Constraint>,
    next_synthetic: u64,
}

impl IdentityResolver {
    /// Build a resolver over the constraint catalogue.
    ///
    /// Candidates are unique/node-key node constraints, ranked once up
    /// front: node-key (compound) before unique, then lexically by label
    /// name, then by property-key tuple. The first candidate a node
    /// satisfies wins, so a node carrying constraints on two different
    /// labels uses exactly one label's predicate, never a blend.
    pub fn new(constraints: &[Constraint]) -> Self {
        let mut candidates: Vec<Constraint> = constraints
            .iter()
            .filter(|c| {
                c.scope == ConstraintScope::Node
                    && matches!(c.kind, ConstraintKind::Unique | ConstraintKind::NodeKey)
                    && !c.properties.is_empty()
            })
            .cloned()
            .collect();
        candidates.sort_by(|a, b| {
            kind_rank(a.kind)
                .cmp(&kind_rank(b.kind))
                .then_with(|| a.label.cmp(&b.label))
                .then_with(|| a.properties.cmp(&b.properties))
        });
        Self { candidates, next_synthetic: 0 }
    }

    /// Resolve one node, assigning the next synthetic id if no candidate
    /// qualifies. Call order defines synthetic numbering, so callers iterate
    /// nodes in discovery order.
    pub fn resolve(&mut self, node: &Node) -> ResolvedIdentity {
        for candidate in &self.candidates {
            if !node.has_label(&candidate.label) {
                continue;
            }
            let values: Option<Vec<Value>> = candidate
                .properties
                .iter()
                .map(|key| node.get(key).cloned())
                .collect();
            if let Some(values) = values {
                return ResolvedIdentity {
                    shape: KeyShape {
                        label: candidate.label.clone(),
                        properties: candidate.properties.clone(),
                        synthetic: false,
                    },
                    values,
                };
            }
        }

        let id = self.next_synthetic;
        self.next_synthetic += 1;
        ResolvedIdentity {
            shape: KeyShape {
                label: RESERVED_LABEL.to_string(),
                properties: vec![RESERVED_PROPERTY.to_string()],
                synthetic: true,
            },
            values: vec![Value::Int(id as i64)],
        }
    }

    pub fn synthetic_count(&self) -> u64 {
        self.next_synthetic
    }
}

fn kind_rank(kind: ConstraintKind) -> u8 {
    match kind {
        ConstraintKind::NodeKey => 0,
        ConstraintKind::Unique => 1,
        ConstraintKind::Exists => 2,
    }
}

/// Resolve every node of a snapshot in discovery order.
pub fn resolve_snapshot(snapshot: &GraphSnapshot) -> Resolution {
    let mut resolver = IdentityResolver::new(&snapshot.constraints);
    let mut identities = HashMap::with_capacity(snapshot.nodes.len());
    for node in &snapshot.nodes {
        identities.insert(node.id, resolver.resolve(node));
    }
    Resolution {
        identities,
        synthetic_count: resolver.synthetic_count(),
    }
}
