//! GraphSnapshot — one consistent, read-once capture of the source graph.

use serde::{Deserialize, Serialize};

use super::{Constraint, Index, Node, Relationship};

/// Everything the compiler consumes, captured once at run start and never
/// mutated. Nodes and relationships keep discovery order; that order is what
/// makes output byte-reproducible.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub relationships: Vec<Relationship>,
    pub constraints: Vec<Constraint>,
    pub indexes: Vec<Index>,
}

impl GraphSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.relationships.is_empty()
    }

    /// Total number of properties across nodes and relationships.
    pub fn property_count(&self) -> u64 {
        let n: usize = self.nodes.iter().map(|n| n.properties.len()).sum();
        let r: usize = self.relationships.iter().map(|r| r.properties.len()).sum();
        (n + r) as u64
    }
}
