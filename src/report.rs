//! Run reporting: the cumulative result returned to the caller, per-batch
//! progress records, and the cancellation flag checked between batches.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Cumulative counters for one export run, finalized at run end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportReport {
    pub nodes: u64,
    pub relationships: u64,
    pub properties: u64,
    pub batches: u64,
    pub duration_ms: u64,
    pub format: String,
    pub optimization: String,
    pub dialect: String,
    /// Identifier returned by the sink on finalize (path, "memory", …).
    pub destination: String,
}

/// One record per flushed batch, streamed through a [`ProgressListener`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRecord {
    pub phase: String,
    /// 1-based batch number, global across phases.
    pub batch: u64,
    pub rows: u64,
}

/// Receives a record after every flushed batch. The default implementation
/// ignores them; implement to stream progress.
pub trait ProgressListener: Send + Sync {
    fn on_batch(&self, _record: &BatchRecord) {}
}

/// Streams each batch record as one JSON line. Write failures are dropped:
/// progress streaming is best-effort and must not abort an export.
pub struct JsonLinesListener<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonLinesListener<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write + Send> ProgressListener for JsonLinesListener<W> {
    fn on_batch(&self, record: &BatchRecord) {
        if let Ok(line) = serde_json::to_string(record) {
            let mut out = self.out.lock();
            let _ = writeln!(out, "{line}");
        }
    }
}

/// Cooperative cancellation, evaluated between batches — never
/// mid-statement, so an aborted run leaves no half-written transactional
/// unit in the sink.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_lines_listener() {
        let listener = JsonLinesListener::new(Vec::new());
        listener.on_batch(&BatchRecord { phase: "nodes".into(), batch: 1, rows: 20 });
        listener.on_batch(&BatchRecord { phase: "nodes".into(), batch: 2, rows: 3 });
        let out = String::from_utf8(listener.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let record: BatchRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(record.batch, 2);
        assert_eq!(record.rows, 3);
    }

    #[test]
    fn test_cancel_flag() {
        let flag = CancelFlag::new();
        assert!(!flag.is_cancelled());
        let shared = flag.clone();
        shared.cancel();
        assert!(flag.is_cancelled());
    }
}
