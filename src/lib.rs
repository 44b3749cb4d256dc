//! # cypher-export-rs — Property Graph Snapshot → Cypher Script
//!
//! A deterministic compiler from one consistent property-graph snapshot to a
//! replayable Cypher statement stream: database migration, environment
//! cloning, and backup-to-script in one pass.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `SnapshotSource` is the contract between the compiler
//!    and whatever holds the graph; `ScriptSink` is the contract on the way
//!    out
//! 2. **Clean DTOs**: `Node`, `Relationship`, `Value` cross all boundaries
//! 3. **Orthogonal strategies**: idempotency format × batching mode × output
//!    dialect compose at the top — no per-combination branches
//! 4. **One run, one owner**: synthetic-id numbering and report counters
//!    live in a per-run sequencer, so concurrent exports never interfere
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cypher_export_rs::{export_cypher, ExportConfig, MemoryGraph, MemorySink, PropertyMap, Value};
//!
//! # async fn example() -> cypher_export_rs::Result<()> {
//! let graph = MemoryGraph::new();
//! let mut props = PropertyMap::new();
//! props.insert("name".into(), Value::from("Ada"));
//! graph.add_node(["Person"], props);
//!
//! let mut sink = MemorySink::new();
//! let report = export_cypher(&graph, &ExportConfig::default(), &mut sink).await?;
//! println!("{} nodes in {} batches", report.nodes, report.batches);
//! println!("{}", sink.script());
//! # Ok(())
//! # }
//! ```
//!
//! ## Output Phases
//!
//! | Phase | Content |
//! |-------|---------|
//! | schema | indexes, constraints, synthetic constraint, await directive |
//! | nodes | node batches, windowed into transactional units |
//! | relationships | relationship batches, after all nodes committed |
//! | cleanup | synthetic label/property removal, constraint drop |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod source;
pub mod config;
pub mod cypher;
pub mod identity;
pub mod plan;
pub mod statement;
pub mod sequencer;
pub mod report;
pub mod sink;

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Constraint, ConstraintKind, ConstraintScope, GraphSnapshot, Index, IsoDuration, Node, NodeId,
    PropertyMap, RelId, Relationship, Value,
};

// ============================================================================
// Re-exports: Configuration
// ============================================================================

pub use config::{CypherFormat, Destination, Dialect, ExportConfig, OptimizationMode};

// ============================================================================
// Re-exports: Sources, sinks, sequencing
// ============================================================================

pub use report::{BatchRecord, CancelFlag, ExportReport, JsonLinesListener, ProgressListener};
pub use sequencer::Phase;
pub use sink::{FileSink, MemorySink, ScriptSink};
pub use source::{MemoryGraph, SnapshotSource};

// ============================================================================
// Top-level Exporter handle
// ============================================================================

/// The primary entry point. An `Exporter` holds one validated configuration
/// and runs any number of independent exports with it.
pub struct Exporter {
    config: ExportConfig,
    listener: Option<Arc<dyn ProgressListener>>,
    cancel: Option<CancelFlag>,
}

impl Exporter {
    /// Validate the configuration and build an exporter. Configuration
    /// errors surface here, before any source is touched.
    pub fn new(config: ExportConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, listener: None, cancel: None })
    }

    /// Stream one record per flushed batch to `listener`.
    pub fn with_listener(mut self, listener: Arc<dyn ProgressListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Check `cancel` between batches; a raised flag aborts the run.
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Capture a snapshot from `source` and compile it into `sink`.
    pub async fn run<S>(&self, source: &S, sink: &mut dyn ScriptSink) -> Result<ExportReport>
    where
        S: SnapshotSource + ?Sized,
    {
        let start = Instant::now();
        let snapshot = source.capture().await?;
        self.compile(&snapshot, sink, start)
    }

    /// Compile an already-captured snapshot into `sink`.
    pub fn run_snapshot(
        &self,
        snapshot: &GraphSnapshot,
        sink: &mut dyn ScriptSink,
    ) -> Result<ExportReport> {
        self.compile(snapshot, sink, Instant::now())
    }

    fn compile(
        &self,
        snapshot: &GraphSnapshot,
        sink: &mut dyn ScriptSink,
        start: Instant,
    ) -> Result<ExportReport> {
        let mut sequencer = sequencer::PhaseSequencer::new(
            &self.config,
            self.listener.as_deref(),
            self.cancel.as_ref(),
        );
        let totals = sequencer.run(snapshot, sink)?;
        let destination = sink.finish()?;

        let report = ExportReport {
            nodes: snapshot.nodes.len() as u64,
            relationships: snapshot.relationships.len() as u64,
            properties: snapshot.property_count(),
            batches: totals.batches,
            duration_ms: start.elapsed().as_millis() as u64,
            format: self.config.format.as_str().to_string(),
            optimization: self.config.optimization.as_str().to_string(),
            dialect: self.config.dialect.as_str().to_string(),
            destination,
        };
        info!(
            nodes = report.nodes,
            relationships = report.relationships,
            batches = report.batches,
            duration_ms = report.duration_ms,
            destination = %report.destination,
            "export finished"
        );
        Ok(report)
    }
}

/// Export a snapshot of `source` as a Cypher script into `sink`.
///
/// Convenience wrapper over [`Exporter`] for runs that need no progress
/// streaming or cancellation.
pub async fn export_cypher<S>(
    source: &S,
    config: &ExportConfig,
    sink: &mut dyn ScriptSink,
) -> Result<ExportReport>
where
    S: SnapshotSource + ?Sized,
{
    Exporter::new(config.clone())?.run(source, sink).await
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("relationship({rel}) references node({node}) outside the exported node set")]
    MissingEndpoint { rel: RelId, node: NodeId },

    #[error("cannot render {entity}: {message}")]
    Render { entity: String, message: String },

    #[error("sink error: {0}")]
    Sink(String),

    #[error("export cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
