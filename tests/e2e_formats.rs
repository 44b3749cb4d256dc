//! The four idempotency formats over one mixed snapshot, unbatched, in the
//! plain dialect so the statements themselves are the whole output.

use pretty_assertions::assert_eq;

use cypher_export_rs::{
    export_cypher, Constraint, CypherFormat, Dialect, ExportConfig, MemoryGraph, MemorySink,
    OptimizationMode, PropertyMap, Value,
};

fn props(pairs: &[(&str, Value)]) -> PropertyMap {
    pairs.iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect()
}

/// One natural-key node with an extra label, one synthetic-key node, one
/// relationship between them.
fn seed() -> MemoryGraph {
    let graph = MemoryGraph::new();
    graph.add_constraint(Constraint::unique("Person", ["name"]));
    let a = graph.add_node(
        ["Person", "Admin"],
        props(&[("name", Value::from("a")), ("level", Value::Int(9))]),
    );
    let b = graph.add_node(["Thing"], props(&[("x", Value::Int(1))]));
    graph.add_relationship(a, b, "REL", props(&[("w", Value::Int(2))]));
    graph
}

async fn script_for(format: CypherFormat) -> String {
    let config = ExportConfig {
        format,
        optimization: OptimizationMode::None,
        dialect: Dialect::Plain,
        ..ExportConfig::default()
    };
    let mut sink = MemorySink::new();
    export_cypher(&seed(), &config, &mut sink).await.unwrap();
    sink.script()
}

#[tokio::test]
async fn test_create_format() {
    assert_eq!(
        script_for(CypherFormat::Create).await,
        "\
CREATE CONSTRAINT FOR (node:Person) REQUIRE (node.name) IS UNIQUE;
CREATE CONSTRAINT UNIQUE_IMPORT_NAME FOR (node:`UNIQUE IMPORT LABEL`) REQUIRE (node.`UNIQUE IMPORT ID`) IS UNIQUE;
CREATE (:Admin:Person {level:9, name:\"a\"});
CREATE (:Thing:`UNIQUE IMPORT LABEL` {x:1, `UNIQUE IMPORT ID`:0});
MATCH (n1:Person{name:\"a\"}), (n2:`UNIQUE IMPORT LABEL`{`UNIQUE IMPORT ID`:0}) CREATE (n1)-[r:REL {w:2}]->(n2);
MATCH (n:`UNIQUE IMPORT LABEL`) WITH n LIMIT 20000 REMOVE n:`UNIQUE IMPORT LABEL` REMOVE n.`UNIQUE IMPORT ID`;
DROP CONSTRAINT UNIQUE_IMPORT_NAME;
"
    );
}

#[tokio::test]
async fn test_add_structure_format() {
    assert_eq!(
        script_for(CypherFormat::AddStructure).await,
        "\
CREATE CONSTRAINT FOR (node:Person) REQUIRE (node.name) IS UNIQUE;
CREATE CONSTRAINT UNIQUE_IMPORT_NAME FOR (node:`UNIQUE IMPORT LABEL`) REQUIRE (node.`UNIQUE IMPORT ID`) IS UNIQUE;
MERGE (n:Person{name:\"a\"}) ON CREATE SET n += {level:9} SET n:Admin;
MERGE (n:`UNIQUE IMPORT LABEL`{`UNIQUE IMPORT ID`:0}) ON CREATE SET n += {x:1} SET n:Thing;
MATCH (n1:Person{name:\"a\"}), (n2:`UNIQUE IMPORT LABEL`{`UNIQUE IMPORT ID`:0}) CREATE (n1)-[r:REL {w:2}]->(n2);
MATCH (n:`UNIQUE IMPORT LABEL`) WITH n LIMIT 20000 REMOVE n:`UNIQUE IMPORT LABEL` REMOVE n.`UNIQUE IMPORT ID`;
DROP CONSTRAINT UNIQUE_IMPORT_NAME;
"
    );
}

#[tokio::test]
async fn test_update_structure_format() {
    // Nodes are matched only: no standalone node statements at all.
    assert_eq!(
        script_for(CypherFormat::UpdateStructure).await,
        "\
CREATE CONSTRAINT FOR (node:Person) REQUIRE (node.name) IS UNIQUE;
CREATE CONSTRAINT UNIQUE_IMPORT_NAME FOR (node:`UNIQUE IMPORT LABEL`) REQUIRE (node.`UNIQUE IMPORT ID`) IS UNIQUE;
MATCH (n1:Person{name:\"a\"}), (n2:`UNIQUE IMPORT LABEL`{`UNIQUE IMPORT ID`:0}) MERGE (n1)-[r:REL]->(n2) SET r += {w:2};
MATCH (n:`UNIQUE IMPORT LABEL`) WITH n LIMIT 20000 REMOVE n:`UNIQUE IMPORT LABEL` REMOVE n.`UNIQUE IMPORT ID`;
DROP CONSTRAINT UNIQUE_IMPORT_NAME;
"
    );
}

#[tokio::test]
async fn test_update_all_format() {
    assert_eq!(
        script_for(CypherFormat::UpdateAll).await,
        "\
CREATE CONSTRAINT FOR (node:Person) REQUIRE (node.name) IS UNIQUE;
CREATE CONSTRAINT UNIQUE_IMPORT_NAME FOR (node:`UNIQUE IMPORT LABEL`) REQUIRE (node.`UNIQUE IMPORT ID`) IS UNIQUE;
MERGE (n:Person{name:\"a\"}) SET n += {level:9} SET n:Admin;
MERGE (n:`UNIQUE IMPORT LABEL`{`UNIQUE IMPORT ID`:0}) SET n += {x:1} SET n:Thing;
MATCH (n1:Person{name:\"a\"}), (n2:`UNIQUE IMPORT LABEL`{`UNIQUE IMPORT ID`:0}) MERGE (n1)-[r:REL]->(n2) SET r += {w:2};
MATCH (n:`UNIQUE IMPORT LABEL`) WITH n LIMIT 20000 REMOVE n:`UNIQUE IMPORT LABEL` REMOVE n.`UNIQUE IMPORT ID`;
DROP CONSTRAINT UNIQUE_IMPORT_NAME;
"
    );
}

/// Propertyless relationships drop the empty property braces.
#[tokio::test]
async fn test_propertyless_relationship_shapes() {
    let graph = MemoryGraph::new();
    let a = graph.add_node(["A"], PropertyMap::new());
    let b = graph.add_node(["B"], PropertyMap::new());
    graph.add_relationship(a, b, "KNOWS", PropertyMap::new());

    let config = ExportConfig {
        format: CypherFormat::Create,
        optimization: OptimizationMode::None,
        dialect: Dialect::Plain,
        ..ExportConfig::default()
    };
    let mut sink = MemorySink::new();
    export_cypher(&graph, &config, &mut sink).await.unwrap();
    assert!(sink.script().contains("CREATE (n1)-[r:KNOWS]->(n2);"));

    let config = ExportConfig { format: CypherFormat::UpdateAll, ..config };
    let mut sink = MemorySink::new();
    export_cypher(&graph, &config, &mut sink).await.unwrap();
    assert!(sink.script().contains("MERGE (n1)-[r:KNOWS]->(n2);"));
}
