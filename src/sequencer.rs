//! Phase sequencing: schema → nodes → relationships → cleanup.
//!
//! A strict barrier — no phase emits before the previous phase's full batch
//! sequence is produced, even if empty. One sequencer instance owns one
//! run's synthetic-id numbering, batch numbering, and transactional
//! windowing; concurrent runs never share state.

use tracing::{debug, info};

use crate::config::{CypherFormat, ExportConfig, OptimizationMode};
use crate::cypher::DialectRenderer;
use crate::identity::{self, Resolution};
use crate::model::GraphSnapshot;
use crate::plan;
use crate::report::{BatchRecord, CancelFlag, ProgressListener};
use crate::sink::ScriptSink;
use crate::statement::{BatchedStatement, StatementBuilder};
use crate::{Error, Result};

/// Export phase, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Phase {
    Schema,
    Nodes,
    Relationships,
    Cleanup,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Schema, Phase::Nodes, Phase::Relationships, Phase::Cleanup];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Schema => "schema",
            Phase::Nodes => "nodes",
            Phase::Relationships => "relationships",
            Phase::Cleanup => "cleanup",
        }
    }
}

/// Counters the sequencer hands back to the caller.
#[derive(Debug, Default)]
pub(crate) struct RunTotals {
    pub batches: u64,
}

/// Outer transactional window: closes after `batch_size` entities and
/// reopens lazily on the next statement, so begin/commit pairs stay
/// symmetric even when a boundary lands mid-shape.
#[derive(Debug, Default)]
struct TxWindow {
    open: bool,
    entities: usize,
}

pub(crate) struct PhaseSequencer<'a> {
    config: &'a ExportConfig,
    dialect: DialectRenderer,
    builder: StatementBuilder,
    listener: Option<&'a dyn ProgressListener>,
    cancel: Option<&'a CancelFlag>,
    batches: u64,
}

impl<'a> PhaseSequencer<'a> {
    pub fn new(
        config: &'a ExportConfig,
        listener: Option<&'a dyn ProgressListener>,
        cancel: Option<&'a CancelFlag>,
    ) -> Self {
        Self {
            config,
            dialect: DialectRenderer::new(config.dialect),
            builder: StatementBuilder::new(config.format),
            listener,
            cancel,
            batches: 0,
        }
    }

    /// Compile one snapshot into the sink. Identity resolution and endpoint
    /// validation happen up front, before any statement is produced.
    pub fn run(&mut self, snapshot: &GraphSnapshot, sink: &mut dyn ScriptSink) -> Result<RunTotals> {
        let resolution = identity::resolve_snapshot(snapshot);
        plan::validate_endpoints(snapshot, &resolution.identities)?;

        self.schema_phase(snapshot, &resolution, sink)?;
        self.nodes_phase(snapshot, &resolution, sink)?;
        self.relationships_phase(snapshot, &resolution, sink)?;
        self.cleanup_phase(&resolution, sink)?;

        Ok(RunTotals { batches: self.batches })
    }

    // ========================================================================
    // Phases
    // ========================================================================

    fn schema_phase(
        &mut self,
        snapshot: &GraphSnapshot,
        resolution: &Resolution,
        sink: &mut dyn ScriptSink,
    ) -> Result<()> {
        let mut statements: Vec<String> = Vec::new();
        for index in &snapshot.indexes {
            statements.push(StatementBuilder::index_statement(index));
        }
        for constraint in &snapshot.constraints {
            if let Some(stmt) = StatementBuilder::constraint_statement(constraint) {
                statements.push(stmt);
            }
        }
        if resolution.has_synthetic() {
            statements.push(StatementBuilder::synthetic_constraint_statement());
        }
        if statements.is_empty() {
            return Ok(());
        }

        info!(statements = statements.len(), "schema phase");
        self.token(sink, Phase::Schema, self.dialect.begin())?;
        for stmt in &statements {
            sink.write_statement(Phase::Schema, stmt)?;
        }
        self.token(sink, Phase::Schema, self.dialect.commit())?;
        if let Some(await_directive) = self.dialect.schema_await(self.config.await_timeout_secs) {
            sink.write_statement(Phase::Schema, &await_directive)?;
        }
        Ok(())
    }

    fn nodes_phase(
        &mut self,
        snapshot: &GraphSnapshot,
        resolution: &Resolution,
        sink: &mut dyn ScriptSink,
    ) -> Result<()> {
        // Matched-only nodes are touched exclusively through relationship
        // endpoints; the phase stays empty but the barrier holds.
        if self.config.format == CypherFormat::UpdateStructure {
            return Ok(());
        }
        info!(nodes = snapshot.nodes.len(), "nodes phase");

        let mut window = TxWindow::default();
        if self.config.optimization.is_batched() {
            let groups = plan::group_nodes(snapshot, &resolution.identities);
            for group in &groups {
                for members in plan::batches(&group.members, self.config.unwind_batch_size) {
                    self.check_cancel()?;
                    let Some(batch) =
                        self.builder.node_batch(group, members, snapshot, &resolution.identities)?
                    else {
                        return self.close_window(&mut window, sink, Phase::Nodes);
                    };
                    self.open_window(&mut window, sink, Phase::Nodes)?;
                    self.write_batched(sink, Phase::Nodes, &batch)?;
                    self.flush_batch(&mut window, sink, Phase::Nodes, members.len())?;
                }
            }
        } else {
            for node in &snapshot.nodes {
                self.check_cancel()?;
                let ident = &resolution.identities[&node.id];
                let Some(stmt) = self.builder.node_statement(node, ident)? else { continue };
                self.open_window(&mut window, sink, Phase::Nodes)?;
                sink.write_statement(Phase::Nodes, &stmt)?;
                self.flush_batch(&mut window, sink, Phase::Nodes, 1)?;
            }
        }
        self.close_window(&mut window, sink, Phase::Nodes)
    }

    fn relationships_phase(
        &mut self,
        snapshot: &GraphSnapshot,
        resolution: &Resolution,
        sink: &mut dyn ScriptSink,
    ) -> Result<()> {
        info!(relationships = snapshot.relationships.len(), "relationships phase");

        let mut window = TxWindow::default();
        if self.config.optimization.is_batched() {
            let groups = plan::group_relationships(snapshot, &resolution.identities);
            for group in &groups {
                for members in plan::batches(&group.members, self.config.unwind_batch_size) {
                    self.check_cancel()?;
                    let batch = self.builder.relationship_batch(
                        group,
                        members,
                        snapshot,
                        &resolution.identities,
                    )?;
                    self.open_window(&mut window, sink, Phase::Relationships)?;
                    self.write_batched(sink, Phase::Relationships, &batch)?;
                    self.flush_batch(&mut window, sink, Phase::Relationships, members.len())?;
                }
            }
        } else {
            for rel in &snapshot.relationships {
                self.check_cancel()?;
                let stmt = self.builder.relationship_statement(
                    rel,
                    &resolution.identities[&rel.src],
                    &resolution.identities[&rel.dst],
                )?;
                self.open_window(&mut window, sink, Phase::Relationships)?;
                sink.write_statement(Phase::Relationships, &stmt)?;
                self.flush_batch(&mut window, sink, Phase::Relationships, 1)?;
            }
        }
        self.close_window(&mut window, sink, Phase::Relationships)
    }

    fn cleanup_phase(&mut self, resolution: &Resolution, sink: &mut dyn ScriptSink) -> Result<()> {
        if !resolution.has_synthetic() {
            return Ok(());
        }
        if !self.config.cleanup {
            // Disabled cleanup still emits one empty-but-symmetrical
            // transactional unit so downstream tooling sees the phase.
            self.token(sink, Phase::Cleanup, self.dialect.begin())?;
            self.token(sink, Phase::Cleanup, self.dialect.commit())?;
            return Ok(());
        }

        let slice = self.config.cleanup_batch_size;
        let slices = resolution.synthetic_count.div_ceil(slice as u64).max(1);
        info!(synthetic = resolution.synthetic_count, slices, "cleanup phase");
        for _ in 0..slices {
            self.check_cancel()?;
            self.token(sink, Phase::Cleanup, self.dialect.begin())?;
            sink.write_statement(Phase::Cleanup, &StatementBuilder::cleanup_statement(slice))?;
            self.token(sink, Phase::Cleanup, self.dialect.commit())?;
        }
        self.token(sink, Phase::Cleanup, self.dialect.begin())?;
        sink.write_statement(
            Phase::Cleanup,
            &StatementBuilder::drop_synthetic_constraint_statement(),
        )?;
        self.token(sink, Phase::Cleanup, self.dialect.commit())
    }

    // ========================================================================
    // Framing and progress
    // ========================================================================

    fn token(&self, sink: &mut dyn ScriptSink, phase: Phase, token: Option<&str>) -> Result<()> {
        if let Some(token) = token {
            sink.write_statement(phase, token)?;
        }
        Ok(())
    }

    fn open_window(
        &self,
        window: &mut TxWindow,
        sink: &mut dyn ScriptSink,
        phase: Phase,
    ) -> Result<()> {
        if !window.open {
            self.token(sink, phase, self.dialect.begin())?;
            window.open = true;
        }
        Ok(())
    }

    fn close_window(
        &self,
        window: &mut TxWindow,
        sink: &mut dyn ScriptSink,
        phase: Phase,
    ) -> Result<()> {
        if window.open {
            self.token(sink, phase, self.dialect.commit())?;
            window.open = false;
            window.entities = 0;
        }
        Ok(())
    }

    /// Account one flushed batch: progress record, and a commit boundary
    /// when the outer window budget is spent.
    fn flush_batch(
        &mut self,
        window: &mut TxWindow,
        sink: &mut dyn ScriptSink,
        phase: Phase,
        rows: usize,
    ) -> Result<()> {
        window.entities += rows;
        self.batches += 1;
        let record = BatchRecord {
            phase: phase.as_str().to_string(),
            batch: self.batches,
            rows: rows as u64,
        };
        debug!(phase = phase.as_str(), batch = record.batch, rows = record.rows, "batch flushed");
        if let Some(listener) = self.listener {
            listener.on_batch(&record);
        }
        if window.entities >= self.config.batch_size {
            self.close_window(window, sink, phase)?;
        }
        Ok(())
    }

    fn write_batched(
        &self,
        sink: &mut dyn ScriptSink,
        phase: Phase,
        batch: &BatchedStatement,
    ) -> Result<()> {
        match self.config.optimization {
            OptimizationMode::UnwindBatchParams => {
                let param = self.dialect.param_block(&batch.rows).ok_or_else(|| {
                    Error::Config(format!(
                        "dialect '{}' has no parameter block form",
                        self.dialect.dialect().as_str()
                    ))
                })?;
                sink.write_statement(phase, &param)?;
                sink.write_statement(phase, &format!("UNWIND $rows AS row {};", batch.body))
            }
            _ => sink.write_statement(
                phase,
                &format!("UNWIND {} AS row {};", batch.rows, batch.body),
            ),
        }
    }

    fn check_cancel(&self) -> Result<()> {
        if let Some(cancel) = self.cancel {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
        }
        Ok(())
    }
}
