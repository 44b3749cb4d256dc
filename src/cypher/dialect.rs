//! Per-dialect transactional tokens.
//!
//! The three dialects differ only in begin/commit text, the schema-await
//! directive, and whether a bound-parameter block exists; `plain` omits the
//! tokens entirely. Closed enum dispatch — adding a dialect means adding a
//! variant and filling in four matches.

use crate::config::Dialect;

/// Supplies the non-statement tokens that frame the script.
#[derive(Debug, Clone, Copy)]
pub struct DialectRenderer {
    dialect: Dialect,
}

impl DialectRenderer {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Opening token of a transactional unit, if the dialect has one.
    pub fn begin(&self) -> Option<&'static str> {
        match self.dialect {
            Dialect::Neo4jShell => Some("begin"),
            Dialect::CypherShell => Some(":begin"),
            Dialect::Plain => None,
        }
    }

    /// Closing token of a transactional unit, if the dialect has one.
    pub fn commit(&self) -> Option<&'static str> {
        match self.dialect {
            Dialect::Neo4jShell => Some("commit"),
            Dialect::CypherShell => Some(":commit"),
            Dialect::Plain => None,
        }
    }

    /// Directive emitted after the schema phase so index population finishes
    /// before data statements run.
    pub fn schema_await(&self, timeout_secs: u64) -> Option<String> {
        match self.dialect {
            Dialect::Neo4jShell => Some("schema await".to_string()),
            Dialect::CypherShell => Some(format!("CALL db.awaitIndexes({timeout_secs});")),
            Dialect::Plain => None,
        }
    }

    /// Bind a row list to the `rows` parameter. Only `cypher-shell` has a
    /// parameter block form; config validation rejects the combination for
    /// the other dialects before a run starts.
    pub fn param_block(&self, rows_literal: &str) -> Option<String> {
        match self.dialect {
            Dialect::CypherShell => Some(format!(":param rows => {rows_literal}")),
            Dialect::Neo4jShell | Dialect::Plain => None,
        }
    }
}
