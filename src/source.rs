//! # Snapshot Source Trait
//!
//! This is THE contract between the compiler and whatever holds the graph.
//! A source is read exactly once per run, under one consistent view, before
//! compilation starts; identity decisions stay valid for the whole run.
//!
//! `MemoryGraph` is the in-memory implementation used for embedding and
//! tests.

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::model::*;
use crate::Result;

/// The universal snapshot contract.
///
/// Implementations expose the four catalogues of one consistent read view.
/// The default `capture()` drains them in order into an owning
/// [`GraphSnapshot`]; sources backed by an external store override the
/// individual methods, not `capture`.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// All nodes, in discovery order.
    async fn nodes(&self) -> Result<Vec<Node>>;

    /// All relationships, in discovery order.
    async fn relationships(&self) -> Result<Vec<Relationship>>;

    /// The declared constraint catalogue.
    async fn constraints(&self) -> Result<Vec<Constraint>>;

    /// The declared index catalogue.
    async fn indexes(&self) -> Result<Vec<Index>>;

    /// Capture everything into one immutable snapshot.
    async fn capture(&self) -> Result<GraphSnapshot> {
        Ok(GraphSnapshot {
            nodes: self.nodes().await?,
            relationships: self.relationships().await?,
            constraints: self.constraints().await?,
            indexes: self.indexes().await?,
        })
    }
}

// ============================================================================
// In-memory source
// ============================================================================

#[derive(Debug, Default)]
struct MemoryGraphInner {
    nodes: Vec<Node>,
    relationships: Vec<Relationship>,
    constraints: Vec<Constraint>,
    indexes: Vec<Index>,
    next_node_id: u64,
    next_rel_id: u64,
}

/// In-memory property graph for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    inner: RwLock<MemoryGraphInner>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with the given labels and properties; returns its id.
    pub fn add_node(
        &self,
        labels: impl IntoIterator<Item = impl Into<String>>,
        properties: PropertyMap,
    ) -> NodeId {
        let mut inner = self.inner.write();
        let id = NodeId(inner.next_node_id);
        inner.next_node_id += 1;
        inner.nodes.push(Node {
            id,
            labels: labels.into_iter().map(Into::into).collect(),
            properties,
        });
        id
    }

    /// Add a directed relationship between two existing nodes.
    pub fn add_relationship(
        &self,
        src: NodeId,
        dst: NodeId,
        rel_type: impl Into<String>,
        properties: PropertyMap,
    ) -> RelId {
        let mut inner = self.inner.write();
        let id = RelId(inner.next_rel_id);
        inner.next_rel_id += 1;
        inner.relationships.push(Relationship {
            id,
            src,
            dst,
            rel_type: rel_type.into(),
            properties,
        });
        id
    }

    pub fn add_constraint(&self, constraint: Constraint) {
        self.inner.write().constraints.push(constraint);
    }

    pub fn add_index(&self, index: Index) {
        self.inner.write().indexes.push(index);
    }

    pub fn node_count(&self) -> usize {
        self.inner.read().nodes.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.inner.read().relationships.len()
    }
}

#[async_trait]
impl SnapshotSource for MemoryGraph {
    async fn nodes(&self) -> Result<Vec<Node>> {
        Ok(self.inner.read().nodes.clone())
    }

    async fn relationships(&self) -> Result<Vec<Relationship>> {
        Ok(self.inner.read().relationships.clone())
    }

    async fn constraints(&self) -> Result<Vec<Constraint>> {
        Ok(self.inner.read().constraints.clone())
    }

    async fn indexes(&self) -> Result<Vec<Index>> {
        Ok(self.inner.read().indexes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_capture_preserves_order() {
        let graph = MemoryGraph::new();
        let mut props = PropertyMap::new();
        props.insert("name".into(), Value::from("Ada"));
        let a = graph.add_node(["Person"], props);
        let b = graph.add_node(["Person"], PropertyMap::new());
        graph.add_relationship(a, b, "KNOWS", PropertyMap::new());

        let snapshot = graph.capture().await.unwrap();
        assert_eq!(snapshot.nodes.len(), 2);
        assert_eq!(snapshot.nodes[0].id, a);
        assert_eq!(snapshot.nodes[1].id, b);
        assert_eq!(snapshot.relationships.len(), 1);
        assert_eq!(snapshot.property_count(), 1);
    }
}
