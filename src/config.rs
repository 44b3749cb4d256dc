//! Export configuration: idempotency format, batching mode, output dialect,
//! batch sizes, cleanup and output flags.
//!
//! All validation happens up front, before the snapshot is captured.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Idempotency strategy for emitted statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CypherFormat {
    /// Unconditional `CREATE`. Assumes an empty destination; not retry-safe.
    Create,
    /// Nodes merge-with-create-only, relationships created. Additive.
    AddStructure,
    /// Nodes matched only, relationships merge-with-always-set.
    UpdateStructure,
    /// Full idempotent upsert; safe to replay indefinitely.
    UpdateAll,
}

impl CypherFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            CypherFormat::Create => "create",
            CypherFormat::AddStructure => "addStructure",
            CypherFormat::UpdateStructure => "updateStructure",
            CypherFormat::UpdateAll => "updateAll",
        }
    }
}

impl FromStr for CypherFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "create" => Ok(CypherFormat::Create),
            "addStructure" => Ok(CypherFormat::AddStructure),
            "updateStructure" => Ok(CypherFormat::UpdateStructure),
            "updateAll" => Ok(CypherFormat::UpdateAll),
            other => Err(Error::Config(format!(
                "unknown cypher format '{other}', expected one of: create, addStructure, updateStructure, updateAll"
            ))),
        }
    }
}

/// Batching strategy for node and relationship statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptimizationMode {
    /// One statement per entity, discovery order.
    None,
    /// Same-shape entities batched into `UNWIND [inline rows] AS row`.
    UnwindBatch,
    /// Same grouping, rows bound through the `rows` parameter for plan reuse.
    UnwindBatchParams,
}

impl OptimizationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizationMode::None => "none",
            OptimizationMode::UnwindBatch => "unwindBatch",
            OptimizationMode::UnwindBatchParams => "unwindBatchParams",
        }
    }

    pub fn is_batched(&self) -> bool {
        !matches!(self, OptimizationMode::None)
    }
}

impl FromStr for OptimizationMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(OptimizationMode::None),
            "unwindBatch" => Ok(OptimizationMode::UnwindBatch),
            "unwindBatchParams" => Ok(OptimizationMode::UnwindBatchParams),
            other => Err(Error::Config(format!(
                "unknown optimization mode '{other}', expected one of: none, unwindBatch, unwindBatchParams"
            ))),
        }
    }
}

/// Output dialect: which transactional/await tokens frame the statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    /// `begin` / `commit` / `schema await`.
    Neo4jShell,
    /// `:begin` / `:commit` / `CALL db.awaitIndexes(..)`; the only dialect
    /// with a `:param` block form.
    CypherShell,
    /// Bare statement stream, no transactional tokens at all.
    Plain,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Neo4jShell => "neo4j-shell",
            Dialect::CypherShell => "cypher-shell",
            Dialect::Plain => "plain",
        }
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "neo4j-shell" => Ok(Dialect::Neo4jShell),
            "cypher-shell" => Ok(Dialect::CypherShell),
            "plain" => Ok(Dialect::Plain),
            other => Err(Error::Config(format!(
                "unknown dialect '{other}', expected one of: neo4j-shell, cypher-shell, plain"
            ))),
        }
    }
}

/// Where the statement stream goes.
///
/// Remote URIs are recognized but refused here: transport belongs to an
/// external collaborator, not this compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Destination {
    /// Caller-supplied sink only; no file is produced.
    Stream,
    /// Local file, written via temp file and persisted on finish.
    File(PathBuf),
}

impl Destination {
    pub fn parse(s: &str) -> Result<Self> {
        if s == "-" || s.is_empty() {
            return Ok(Destination::Stream);
        }
        if s.contains("://") {
            return Err(Error::Config(format!(
                "remote destination '{s}' is not handled here; route it through an external transport"
            )));
        }
        Ok(Destination::File(PathBuf::from(s)))
    }
}

/// The full configuration surface of one export run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    pub format: CypherFormat,
    pub optimization: OptimizationMode,
    pub dialect: Dialect,
    /// Row limit per `UNWIND` list.
    pub unwind_batch_size: usize,
    /// Entities per outer transactional window.
    pub batch_size: usize,
    /// Slice size of each cleanup `MATCH .. LIMIT` statement.
    pub cleanup_batch_size: usize,
    /// Strip synthetic labels/properties after import.
    pub cleanup: bool,
    /// One output file per phase instead of a single script.
    pub separate_files: bool,
    /// Timeout handed to the schema-await directive, in seconds.
    pub await_timeout_secs: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: CypherFormat::UpdateAll,
            optimization: OptimizationMode::UnwindBatch,
            dialect: Dialect::CypherShell,
            unwind_batch_size: 20,
            batch_size: 20000,
            cleanup_batch_size: 20000,
            cleanup: true,
            separate_files: false,
            await_timeout_secs: 300,
        }
    }
}

impl ExportConfig {
    /// Fail-fast validation, run before anything touches the source.
    pub fn validate(&self) -> Result<()> {
        if self.unwind_batch_size == 0 {
            return Err(Error::Config("unwind_batch_size must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be at least 1".into()));
        }
        if self.cleanup_batch_size == 0 {
            return Err(Error::Config("cleanup_batch_size must be at least 1".into()));
        }
        if self.optimization == OptimizationMode::UnwindBatchParams
            && self.dialect != Dialect::CypherShell
        {
            return Err(Error::Config(format!(
                "optimization 'unwindBatchParams' requires dialect 'cypher-shell', got '{}'",
                self.dialect.as_str()
            )));
        }
        Ok(())
    }
}
