//! Statement construction.
//!
//! Renders one entity (unbatched) or one row batch into statement text under
//! the chosen idempotency format. The builder knows nothing about dialect
//! tokens or transaction framing; the sequencer composes those around it.

use hashbrown::HashMap;

use crate::config::CypherFormat;
use crate::cypher::literal::{self, LiteralError};
use crate::identity::{
    KeyShape, ResolvedIdentity, RESERVED_CONSTRAINT_NAME, RESERVED_LABEL, RESERVED_PROPERTY,
};
use crate::model::{
    Constraint, ConstraintKind, ConstraintScope, GraphSnapshot, Index, Node, NodeId, Relationship,
};
use crate::plan::{NodeGroup, RelGroup};
use crate::{Error, Result};

/// One batched statement, split so the sequencer can inline the row list or
/// bind it through the dialect's parameter block.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchedStatement {
    /// `[{..}, {..}]` row list literal.
    pub rows: String,
    /// Statement body following `UNWIND … AS row`, without terminator.
    pub body: String,
}

/// Renders statements for one idempotency format.
#[derive(Debug, Clone, Copy)]
pub struct StatementBuilder {
    format: CypherFormat,
}

impl StatementBuilder {
    pub fn new(format: CypherFormat) -> Self {
        Self { format }
    }

    // ========================================================================
    // Schema statements
    // ========================================================================

    pub fn index_statement(index: &Index) -> String {
        format!(
            "CREATE INDEX FOR (node:{}) ON ({});",
            literal::quote_ident(&index.label),
            node_property_tuple(&index.properties),
        )
    }

    /// Uniqueness/node-key node constraints replay; existence and
    /// relationship-scoped constraints are catalogue input only.
    pub fn constraint_statement(constraint: &Constraint) -> Option<String> {
        if constraint.scope != ConstraintScope::Node {
            return None;
        }
        let requirement = match constraint.kind {
            ConstraintKind::Unique => "IS UNIQUE",
            ConstraintKind::NodeKey => "IS NODE KEY",
            ConstraintKind::Exists => return None,
        };
        Some(format!(
            "CREATE CONSTRAINT FOR (node:{}) REQUIRE ({}) {};",
            literal::quote_ident(&constraint.label),
            node_property_tuple(&constraint.properties),
            requirement,
        ))
    }

    pub fn synthetic_constraint_statement() -> String {
        format!(
            "CREATE CONSTRAINT {} FOR (node:{}) REQUIRE (node.{}) IS UNIQUE;",
            RESERVED_CONSTRAINT_NAME,
            literal::quote_ident(RESERVED_LABEL),
            literal::quote_ident(RESERVED_PROPERTY),
        )
    }

    pub fn drop_synthetic_constraint_statement() -> String {
        format!("DROP CONSTRAINT {RESERVED_CONSTRAINT_NAME};")
    }

    /// One cleanup slice: strip the reserved label and property from up to
    /// `limit` synthetically keyed nodes.
    pub fn cleanup_statement(limit: usize) -> String {
        let label = literal::quote_ident(RESERVED_LABEL);
        format!(
            "MATCH (n:{label}) WITH n LIMIT {limit} REMOVE n:{label} REMOVE n.{};",
            literal::quote_ident(RESERVED_PROPERTY),
        )
    }

    // ========================================================================
    // Unbatched statements (optimization mode `none`)
    // ========================================================================

    /// Render one node statement, or `None` when the format emits no node
    /// statements (`updateStructure` matches nodes only through relationship
    /// endpoints).
    pub fn node_statement(&self, node: &Node, ident: &ResolvedIdentity) -> Result<Option<String>> {
        match self.format {
            CypherFormat::Create => self.create_node_statement(node, ident).map(Some),
            CypherFormat::AddStructure => self.merge_node_statement(node, ident, true).map(Some),
            CypherFormat::UpdateAll => self.merge_node_statement(node, ident, false).map(Some),
            CypherFormat::UpdateStructure => Ok(None),
        }
    }

    fn create_node_statement(&self, node: &Node, ident: &ResolvedIdentity) -> Result<String> {
        let mut labels: Vec<&str> = node.labels.iter().map(String::as_str).collect();
        labels.sort_unstable();
        let mut label_list: Vec<String> =
            labels.iter().map(|l| literal::quote_ident(l)).collect();
        if ident.shape.synthetic {
            label_list.push(literal::quote_ident(RESERVED_LABEL));
        }

        let mut props = literal::property_pairs(&node.properties, &[])
            .map_err(|e| render_error(node_entity(node), e))?;
        if ident.shape.synthetic {
            let id = literal::value_literal(&ident.values[0])
                .map_err(|e| render_error(node_entity(node), e))?;
            let reserved = format!("{}:{}", literal::quote_ident(RESERVED_PROPERTY), id);
            if props.is_empty() {
                props = reserved;
            } else {
                props = format!("{props}, {reserved}");
            }
        }

        if props.is_empty() {
            Ok(format!("CREATE (:{});", label_list.join(":")))
        } else {
            Ok(format!("CREATE (:{} {{{}}});", label_list.join(":"), props))
        }
    }

    fn merge_node_statement(
        &self,
        node: &Node,
        ident: &ResolvedIdentity,
        on_create_only: bool,
    ) -> Result<String> {
        let entity = node_entity(node);
        let pattern = key_pattern(ident).map_err(|e| render_error(entity.clone(), e))?;
        let exclude = natural_key_exclusions(&ident.shape);
        let rest = literal::property_pairs(&node.properties, &exclude)
            .map_err(|e| render_error(entity, e))?;

        let mut stmt = format!("MERGE (n:{pattern})");
        if !rest.is_empty() {
            if on_create_only {
                stmt.push_str(" ON CREATE SET n += {");
            } else {
                stmt.push_str(" SET n += {");
            }
            stmt.push_str(&rest);
            stmt.push('}');
        }
        stmt.push_str(&set_labels_clause(&node.labels, &ident.shape));
        stmt.push(';');
        Ok(stmt)
    }

    /// Render one relationship statement. Every format emits these.
    pub fn relationship_statement(
        &self,
        rel: &Relationship,
        start: &ResolvedIdentity,
        end: &ResolvedIdentity,
    ) -> Result<String> {
        let entity = rel_entity(rel);
        let p1 = key_pattern(start).map_err(|e| render_error(entity.clone(), e))?;
        let p2 = key_pattern(end).map_err(|e| render_error(entity.clone(), e))?;
        let props = literal::property_pairs(&rel.properties, &[])
            .map_err(|e| render_error(entity, e))?;
        let rel_type = literal::quote_ident(&rel.rel_type);

        let action = match self.format {
            CypherFormat::Create | CypherFormat::AddStructure => {
                if props.is_empty() {
                    format!("CREATE (n1)-[r:{rel_type}]->(n2)")
                } else {
                    format!("CREATE (n1)-[r:{rel_type} {{{props}}}]->(n2)")
                }
            }
            CypherFormat::UpdateStructure | CypherFormat::UpdateAll => {
                if props.is_empty() {
                    format!("MERGE (n1)-[r:{rel_type}]->(n2)")
                } else {
                    format!("MERGE (n1)-[r:{rel_type}]->(n2) SET r += {{{props}}}")
                }
            }
        };
        Ok(format!("MATCH (n1:{p1}), (n2:{p2}) {action};"))
    }

    // ========================================================================
    // Batched statements (UNWIND row lists)
    // ========================================================================

    /// Render one node batch, or `None` for `updateStructure`.
    pub fn node_batch(
        &self,
        group: &NodeGroup,
        members: &[usize],
        snapshot: &GraphSnapshot,
        identities: &HashMap<NodeId, ResolvedIdentity>,
    ) -> Result<Option<BatchedStatement>> {
        let verb = match self.format {
            CypherFormat::Create => "CREATE",
            CypherFormat::AddStructure | CypherFormat::UpdateAll => "MERGE",
            CypherFormat::UpdateStructure => return Ok(None),
        };
        let set_props = match self.format {
            CypherFormat::AddStructure => " ON CREATE SET n += row.properties",
            _ => " SET n += row.properties",
        };

        let mut rows = Vec::with_capacity(members.len());
        for &i in members {
            let node = &snapshot.nodes[i];
            rows.push(node_row(node, &identities[&node.id])?);
        }

        let body = format!(
            "{verb} (n:{}){set_props}{}",
            key_pattern_row(&group.key, "row"),
            set_labels_clause(&group.labels, &group.key),
        );
        Ok(Some(BatchedStatement { rows: format!("[{}]", rows.join(", ")), body }))
    }

    /// Render one relationship batch.
    pub fn relationship_batch(
        &self,
        group: &RelGroup,
        members: &[usize],
        snapshot: &GraphSnapshot,
        identities: &HashMap<NodeId, ResolvedIdentity>,
    ) -> Result<BatchedStatement> {
        let verb = match self.format {
            CypherFormat::Create | CypherFormat::AddStructure => "CREATE",
            CypherFormat::UpdateStructure | CypherFormat::UpdateAll => "MERGE",
        };

        let mut rows = Vec::with_capacity(members.len());
        for &i in members {
            let rel = &snapshot.relationships[i];
            rows.push(rel_row(rel, &identities[&rel.src], &identities[&rel.dst])?);
        }

        let body = format!(
            "MATCH (start:{}) MATCH (end:{}) {verb} (start)-[r:{}]->(end) SET r += row.properties",
            key_pattern_row(&group.start, "row.start"),
            key_pattern_row(&group.end, "row.end"),
            literal::quote_ident(&group.rel_type),
        );
        Ok(BatchedStatement { rows: format!("[{}]", rows.join(", ")), body })
    }
}

// ============================================================================
// Shared rendering helpers
// ============================================================================

fn render_error(entity: String, e: LiteralError) -> Error {
    Error::Render { entity, message: e.to_string() }
}

fn node_entity(node: &Node) -> String {
    format!("node({})", node.id)
}

fn rel_entity(rel: &Relationship) -> String {
    format!("relationship({})", rel.id)
}

/// `node.p1, node.p2` tuple used by index/constraint statements.
fn node_property_tuple(properties: &[String]) -> String {
    let parts: Vec<String> = properties
        .iter()
        .map(|p| format!("node.{}", literal::quote_ident(p)))
        .collect();
    parts.join(", ")
}

/// `Label{key:value, …}` with literal key values, tuple order.
fn key_pattern(ident: &ResolvedIdentity) -> std::result::Result<String, LiteralError> {
    let mut pairs = Vec::with_capacity(ident.shape.properties.len());
    for (i, key) in ident.shape.properties.iter().enumerate() {
        pairs.push(format!(
            "{}:{}",
            literal::quote_ident(key),
            literal::value_literal(&ident.values[i])?,
        ));
    }
    Ok(format!("{}{{{}}}", literal::quote_ident(&ident.shape.label), pairs.join(", ")))
}

/// `Label{key: row.field, …}` with row-bound key values.
fn key_pattern_row(shape: &KeyShape, row_path: &str) -> String {
    let pairs: Vec<String> = shape
        .properties
        .iter()
        .enumerate()
        .map(|(i, key)| {
            format!(
                "{}: {row_path}.{}",
                literal::quote_ident(key),
                literal::quote_ident(shape.row_field(i)),
            )
        })
        .collect();
    format!("{}{{{}}}", literal::quote_ident(&shape.label), pairs.join(", "))
}

/// Key properties to keep out of the residual property map.
fn natural_key_exclusions(shape: &KeyShape) -> Vec<&str> {
    if shape.synthetic {
        Vec::new()
    } else {
        shape.properties.iter().map(String::as_str).collect()
    }
}

/// ` SET n:A:B` for the labels not already in the match pattern, ascending.
/// For synthetic keys every real label is extra; the reserved label itself
/// lives in the pattern.
fn set_labels_clause(labels: &[String], key: &KeyShape) -> String {
    let mut extras: Vec<&str> = labels
        .iter()
        .map(String::as_str)
        .filter(|l| key.synthetic || *l != key.label)
        .collect();
    if extras.is_empty() {
        return String::new();
    }
    extras.sort_unstable();
    let quoted: Vec<String> = extras.iter().map(|l| literal::quote_ident(l)).collect();
    format!(" SET n:{}", quoted.join(":"))
}

/// `{key fields, properties:{…}}` row for one node.
fn node_row(node: &Node, ident: &ResolvedIdentity) -> Result<String> {
    let entity = node_entity(node);
    let key = row_key_fields(ident).map_err(|e| render_error(entity.clone(), e))?;
    let props = literal::property_pairs(&node.properties, &natural_key_exclusions(&ident.shape))
        .map_err(|e| render_error(entity, e))?;
    Ok(format!("{{{key}, properties:{{{props}}}}}"))
}

/// `{start:{…}, end:{…}, properties:{…}}` row for one relationship.
fn rel_row(
    rel: &Relationship,
    start: &ResolvedIdentity,
    end: &ResolvedIdentity,
) -> Result<String> {
    let entity = rel_entity(rel);
    let start_fields = row_key_fields(start).map_err(|e| render_error(entity.clone(), e))?;
    let end_fields = row_key_fields(end).map_err(|e| render_error(entity.clone(), e))?;
    let props = literal::property_pairs(&rel.properties, &[])
        .map_err(|e| render_error(entity, e))?;
    Ok(format!("{{start:{{{start_fields}}}, end:{{{end_fields}}}, properties:{{{props}}}}}"))
}

/// `_id:0` or `name:"bar", surname:"x"` — the key fields of one row map.
fn row_key_fields(ident: &ResolvedIdentity) -> std::result::Result<String, LiteralError> {
    let mut pairs = Vec::with_capacity(ident.values.len());
    for (i, value) in ident.values.iter().enumerate() {
        pairs.push(format!(
            "{}:{}",
            literal::quote_ident(ident.shape.row_field(i)),
            literal::value_literal(value)?,
        ));
    }
    Ok(pairs.join(", "))
}
