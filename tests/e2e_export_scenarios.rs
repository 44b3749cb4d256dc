//! Golden-output scenarios: the full script for small snapshots, pinned
//! byte-for-byte. Synthetic-key and natural-key paths, phase ordering, and
//! cleanup behavior.

use pretty_assertions::assert_eq;

use cypher_export_rs::{
    export_cypher, Constraint, CypherFormat, Dialect, ExportConfig, MemoryGraph, MemorySink,
    OptimizationMode, Phase, PropertyMap, Value,
};

fn props(pairs: &[(&str, Value)]) -> PropertyMap {
    pairs.iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect()
}

fn unbatched_config() -> ExportConfig {
    ExportConfig {
        format: CypherFormat::UpdateAll,
        optimization: OptimizationMode::None,
        dialect: Dialect::CypherShell,
        ..ExportConfig::default()
    }
}

/// Two unconstrained nodes and one relationship: everything rides on
/// synthetic keys, and cleanup strips them again.
#[tokio::test]
async fn test_synthetic_key_roundtrip_script() {
    let graph = MemoryGraph::new();
    let person = graph.add_node(["Person"], props(&[("name", Value::from("MyName"))]));
    let project = graph.add_node(["Project"], props(&[("a", Value::Int(1))]));
    graph.add_relationship(person, project, "WORKS_FOR", props(&[("id", Value::Int(1))]));

    let mut sink = MemorySink::new();
    let report = export_cypher(&graph, &unbatched_config(), &mut sink).await.unwrap();

    assert_eq!(
        sink.script(),
        "\
:begin
CREATE CONSTRAINT UNIQUE_IMPORT_NAME FOR (node:`UNIQUE IMPORT LABEL`) REQUIRE (node.`UNIQUE IMPORT ID`) IS UNIQUE;
:commit
CALL db.awaitIndexes(300);
:begin
MERGE (n:`UNIQUE IMPORT LABEL`{`UNIQUE IMPORT ID`:0}) SET n += {name:\"MyName\"} SET n:Person;
MERGE (n:`UNIQUE IMPORT LABEL`{`UNIQUE IMPORT ID`:1}) SET n += {a:1} SET n:Project;
:commit
:begin
MATCH (n1:`UNIQUE IMPORT LABEL`{`UNIQUE IMPORT ID`:0}), (n2:`UNIQUE IMPORT LABEL`{`UNIQUE IMPORT ID`:1}) MERGE (n1)-[r:WORKS_FOR]->(n2) SET r += {id:1};
:commit
:begin
MATCH (n:`UNIQUE IMPORT LABEL`) WITH n LIMIT 20000 REMOVE n:`UNIQUE IMPORT LABEL` REMOVE n.`UNIQUE IMPORT ID`;
:commit
:begin
DROP CONSTRAINT UNIQUE_IMPORT_NAME;
:commit
"
    );

    assert_eq!(report.nodes, 2);
    assert_eq!(report.relationships, 1);
    assert_eq!(report.properties, 3);
    assert_eq!(report.batches, 3);
    assert_eq!(report.destination, "memory");
}

/// A node with a real uniqueness constraint exports on its natural key and
/// cleanup never touches it.
#[tokio::test]
async fn test_natural_key_script() {
    let graph = MemoryGraph::new();
    graph.add_constraint(Constraint::unique("Bar", ["name"]));
    graph.add_node(["Bar"], props(&[("name", Value::from("bar")), ("age", Value::Int(42))]));

    let mut sink = MemorySink::new();
    export_cypher(&graph, &unbatched_config(), &mut sink).await.unwrap();

    assert_eq!(
        sink.script(),
        "\
:begin
CREATE CONSTRAINT FOR (node:Bar) REQUIRE (node.name) IS UNIQUE;
:commit
CALL db.awaitIndexes(300);
:begin
MERGE (n:Bar{name:\"bar\"}) SET n += {age:42};
:commit
"
    );
    assert!(!sink.script().contains("UNIQUE IMPORT"));
}

/// Relationships only start once the full node batch sequence is committed.
#[tokio::test]
async fn test_phase_barrier_ordering() {
    let graph = MemoryGraph::new();
    let a = graph.add_node(["A"], PropertyMap::new());
    let b = graph.add_node(["B"], PropertyMap::new());
    graph.add_relationship(a, b, "REL", PropertyMap::new());

    let mut sink = MemorySink::new();
    export_cypher(&graph, &unbatched_config(), &mut sink).await.unwrap();

    let script = sink.script();
    let last_merge = script.rfind("MERGE (n:").unwrap();
    let first_match = script.find("MATCH (n1:").unwrap();
    assert!(last_merge < first_match, "nodes must be emitted before relationships");

    // Every phase that emitted anything is begin/commit symmetric.
    let begins = script.lines().filter(|l| *l == ":begin").count();
    let commits = script.lines().filter(|l| *l == ":commit").count();
    assert_eq!(begins, commits);
}

/// Indexes replay before constraints in the schema phase.
#[tokio::test]
async fn test_schema_phase_orders_indexes_first() {
    let graph = MemoryGraph::new();
    graph.add_index(cypher_export_rs::Index::new("Foo", ["name"]));
    graph.add_constraint(Constraint::node_key("Person", ["name", "surname"]));
    graph.add_node(
        ["Person"],
        props(&[("name", Value::from("a")), ("surname", Value::from("b"))]),
    );

    let mut sink = MemorySink::new();
    export_cypher(&graph, &unbatched_config(), &mut sink).await.unwrap();

    assert_eq!(
        sink.phase_script(Phase::Schema),
        "\
:begin
CREATE INDEX FOR (node:Foo) ON (node.name);
CREATE CONSTRAINT FOR (node:Person) REQUIRE (node.name, node.surname) IS NODE KEY;
:commit
CALL db.awaitIndexes(300);
"
    );
}

/// A node carrying single-property uniqueness constraints on two different
/// labels must build its endpoint predicate from exactly one label's keys.
#[tokio::test]
async fn test_two_label_identity_uses_one_predicate() {
    let graph = MemoryGraph::new();
    graph.add_constraint(Constraint::unique("Alpha", ["a"]));
    graph.add_constraint(Constraint::unique("Beta", ["b"]));
    let n = graph.add_node(
        ["Alpha", "Beta"],
        props(&[("a", Value::Int(1)), ("b", Value::Int(2))]),
    );
    let other = graph.add_node(["Plain"], PropertyMap::new());
    graph.add_relationship(n, other, "LINKS", PropertyMap::new());

    let mut sink = MemorySink::new();
    export_cypher(&graph, &unbatched_config(), &mut sink).await.unwrap();

    let rels = sink.phase_script(Phase::Relationships);
    assert!(rels.contains("MATCH (n1:Alpha{a:1}),"), "got: {rels}");
    assert!(!rels.contains("Beta"), "predicate must not blend labels: {rels}");
}

/// Cleanup slices repeat until the synthetic population is covered.
#[tokio::test]
async fn test_cleanup_slices_cover_synthetic_population() {
    let graph = MemoryGraph::new();
    for _ in 0..5 {
        graph.add_node(["Thing"], PropertyMap::new());
    }

    let config = ExportConfig { cleanup_batch_size: 2, ..unbatched_config() };
    let mut sink = MemorySink::new();
    export_cypher(&graph, &config, &mut sink).await.unwrap();

    let cleanup = sink.phase_script(Phase::Cleanup);
    let slices = cleanup.lines().filter(|l| l.starts_with("MATCH (n:")).count();
    assert_eq!(slices, 3, "5 synthetic nodes / slice size 2 = 3 slices");
    assert!(cleanup.contains("WITH n LIMIT 2 "));
    assert!(cleanup.ends_with("DROP CONSTRAINT UNIQUE_IMPORT_NAME;\n:commit\n"));
}
