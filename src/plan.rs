//! Shape grouping and batch planning.
//!
//! Nodes group by (exact ordered label set, identity-key shape);
//! relationships by (type, start key shape, end key shape). Groups and
//! their members keep insertion order, so the same snapshot always plans
//! the same batches.

use hashbrown::HashMap;

use crate::identity::{KeyShape, ResolvedIdentity};
use crate::model::{GraphSnapshot, NodeId};
use crate::{Error, Result};

/// Nodes sharing one statement template: same labels, same key shape.
#[derive(Debug)]
pub struct NodeGroup {
    pub labels: Vec<String>,
    pub key: KeyShape,
    /// Indexes into `snapshot.nodes`, discovery order.
    pub members: Vec<usize>,
}

/// Relationships sharing one statement template.
#[derive(Debug)]
pub struct RelGroup {
    pub rel_type: String,
    pub start: KeyShape,
    pub end: KeyShape,
    /// Indexes into `snapshot.relationships`, discovery order.
    pub members: Vec<usize>,
}

/// Every relationship endpoint must resolve against the exported node set
/// before any statement is produced; a dangling reference aborts the run.
pub fn validate_endpoints(
    snapshot: &GraphSnapshot,
    identities: &HashMap<NodeId, ResolvedIdentity>,
) -> Result<()> {
    for rel in &snapshot.relationships {
        for endpoint in [rel.src, rel.dst] {
            if !identities.contains_key(&endpoint) {
                return Err(Error::MissingEndpoint { rel: rel.id, node: endpoint });
            }
        }
    }
    Ok(())
}

/// Group nodes by structural shape, insertion-stable.
pub fn group_nodes(
    snapshot: &GraphSnapshot,
    identities: &HashMap<NodeId, ResolvedIdentity>,
) -> Vec<NodeGroup> {
    let mut groups: Vec<NodeGroup> = Vec::new();
    let mut index: HashMap<(Vec<String>, KeyShape), usize> = HashMap::new();

    for (i, node) in snapshot.nodes.iter().enumerate() {
        let ident = &identities[&node.id];
        let labels: Vec<String> = node.labels.iter().cloned().collect();
        let slot = *index
            .entry((labels.clone(), ident.shape.clone()))
            .or_insert_with(|| {
                groups.push(NodeGroup {
                    labels,
                    key: ident.shape.clone(),
                    members: Vec::new(),
                });
                groups.len() - 1
            });
        groups[slot].members.push(i);
    }
    groups
}

/// Group relationships by (type, endpoint key shapes), insertion-stable.
pub fn group_relationships(
    snapshot: &GraphSnapshot,
    identities: &HashMap<NodeId, ResolvedIdentity>,
) -> Vec<RelGroup> {
    let mut groups: Vec<RelGroup> = Vec::new();
    let mut index: HashMap<(String, KeyShape, KeyShape), usize> = HashMap::new();

    for (i, rel) in snapshot.relationships.iter().enumerate() {
        let start = identities[&rel.src].shape.clone();
        let end = identities[&rel.dst].shape.clone();
        let slot = *index
            .entry((rel.rel_type.clone(), start.clone(), end.clone()))
            .or_insert_with(|| {
                groups.push(RelGroup {
                    rel_type: rel.rel_type.clone(),
                    start,
                    end,
                    members: Vec::new(),
                });
                groups.len() - 1
            });
        groups[slot].members.push(i);
    }
    groups
}

/// Slice a group's members into row-limited batches.
pub fn batches(members: &[usize], rows: usize) -> impl Iterator<Item = &[usize]> {
    members.chunks(rows.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::resolve_snapshot;
    use crate::model::{Node, PropertyMap, Relationship, RelId, Value};

    fn snapshot_two_shapes() -> GraphSnapshot {
        let mut props = PropertyMap::new();
        props.insert("a".into(), Value::Int(1));
        GraphSnapshot {
            nodes: vec![
                Node::new(NodeId(0)).with_labels(["Person"]),
                Node::new(NodeId(1)).with_labels(["Project"]),
                Node::new(NodeId(2)).with_labels(["Person"]),
            ],
            relationships: vec![
                Relationship::new(RelId(0), NodeId(0), NodeId(1), "WORKS_FOR"),
                Relationship::new(RelId(1), NodeId(2), NodeId(1), "WORKS_FOR"),
            ],
            constraints: vec![],
            indexes: vec![],
        }
    }

    #[test]
    fn test_node_groups_keep_insertion_order() {
        let snapshot = snapshot_two_shapes();
        let resolution = resolve_snapshot(&snapshot);
        let groups = group_nodes(&snapshot, &resolution.identities);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].labels, vec!["Person".to_string()]);
        assert_eq!(groups[0].members, vec![0, 2]);
        assert_eq!(groups[1].labels, vec!["Project".to_string()]);
        assert_eq!(groups[1].members, vec![1]);
    }

    #[test]
    fn test_rel_groups_merge_same_shape() {
        let snapshot = snapshot_two_shapes();
        let resolution = resolve_snapshot(&snapshot);
        let groups = group_relationships(&snapshot, &resolution.identities);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].rel_type, "WORKS_FOR");
        assert_eq!(groups[0].members, vec![0, 1]);
    }

    #[test]
    fn test_key_shape_splits_label_group() {
        // Same label, but only one node satisfies the constraint, so the
        // other gets a synthetic key shape and its own group.
        let mut snapshot = snapshot_two_shapes();
        snapshot.constraints = vec![crate::model::Constraint::unique("Person", ["name"])];
        snapshot.nodes[0].properties.insert("name".into(), Value::from("a"));
        let resolution = resolve_snapshot(&snapshot);
        let groups = group_nodes(&snapshot, &resolution.identities);
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn test_dangling_endpoint_is_an_error() {
        let mut snapshot = snapshot_two_shapes();
        snapshot.relationships.push(Relationship::new(RelId(9), NodeId(0), NodeId(99), "KNOWS"));
        let resolution = resolve_snapshot(&snapshot);
        let err = validate_endpoints(&snapshot, &resolution.identities).unwrap_err();
        assert!(matches!(err, Error::MissingEndpoint { node: NodeId(99), .. }));
    }

    #[test]
    fn test_batches_respect_row_limit() {
        let members: Vec<usize> = (0..7).collect();
        let sizes: Vec<usize> = batches(&members, 3).map(|b| b.len()).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
    }
}
