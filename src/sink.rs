//! Statement sinks: where the script stream goes.
//!
//! `MemorySink` collects statements for embedding and tests. `FileSink`
//! writes through a temp file and persists on finish, so a failed run never
//! leaves a partial file in place.

use std::fmt::Write as _;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::sequencer::Phase;
use crate::{Error, Result};

/// Destination for the statement stream. Statements arrive phase-tagged and
/// already terminated; the sink owns line separation and finalization.
pub trait ScriptSink: Send {
    fn write_statement(&mut self, phase: Phase, text: &str) -> Result<()>;

    /// Finalize and return a destination identifier for the report.
    fn finish(&mut self) -> Result<String>;
}

// ============================================================================
// In-memory sink
// ============================================================================

/// Collects the script in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Vec<(Phase, String)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The whole script as written, newline-terminated.
    pub fn script(&self) -> String {
        let mut out = String::new();
        for (_, line) in &self.lines {
            let _ = writeln!(out, "{line}");
        }
        out
    }

    /// Only the statements of one phase.
    pub fn phase_script(&self, phase: Phase) -> String {
        let mut out = String::new();
        for (p, line) in &self.lines {
            if *p == phase {
                let _ = writeln!(out, "{line}");
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl ScriptSink for MemorySink {
    fn write_statement(&mut self, phase: Phase, text: &str) -> Result<()> {
        self.lines.push((phase, text.to_string()));
        Ok(())
    }

    fn finish(&mut self) -> Result<String> {
        Ok("memory".to_string())
    }
}

// ============================================================================
// File sink (write-then-finalize)
// ============================================================================

enum FileSinkState {
    Single(NamedTempFile),
    PerPhase(Vec<(Phase, NamedTempFile)>),
}

/// Writes the script to a file, or one file per phase.
///
/// All output goes to temp files in the destination directory; `finish`
/// persists them atomically. Dropping the sink without finishing discards
/// everything.
pub struct FileSink {
    base: PathBuf,
    state: Option<FileSinkState>,
}

impl FileSink {
    /// Single-file sink at `path`.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let base = path.into();
        let tmp = temp_in_parent(&base)?;
        Ok(Self { base, state: Some(FileSinkState::Single(tmp)) })
    }

    /// One file per phase, named `<stem>.<phase>[.<ext>]`.
    pub fn create_per_phase(path: impl Into<PathBuf>) -> Result<Self> {
        let base = path.into();
        let mut files = Vec::with_capacity(Phase::ALL.len());
        for phase in Phase::ALL {
            files.push((phase, temp_in_parent(&base)?));
        }
        Ok(Self { base, state: Some(FileSinkState::PerPhase(files)) })
    }

    /// Sink honoring the `separate_files` flag.
    pub fn from_config(path: impl Into<PathBuf>, config: &crate::ExportConfig) -> Result<Self> {
        if config.separate_files {
            Self::create_per_phase(path)
        } else {
            Self::create(path)
        }
    }

    /// Path a phase's statements land at in per-phase mode.
    pub fn phase_path(base: &Path, phase: Phase) -> PathBuf {
        let stem = base
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = match base.extension() {
            Some(ext) => format!("{stem}.{}.{}", phase.as_str(), ext.to_string_lossy()),
            None => format!("{stem}.{}", phase.as_str()),
        };
        base.with_file_name(name)
    }
}

fn temp_in_parent(base: &Path) -> Result<NamedTempFile> {
    let dir = base.parent().filter(|p| !p.as_os_str().is_empty());
    let tmp = match dir {
        Some(dir) => NamedTempFile::new_in(dir)?,
        None => NamedTempFile::new_in(".")?,
    };
    Ok(tmp)
}

impl ScriptSink for FileSink {
    fn write_statement(&mut self, phase: Phase, text: &str) -> Result<()> {
        match self.state.as_mut() {
            Some(FileSinkState::Single(tmp)) => {
                writeln!(tmp, "{text}")?;
            }
            Some(FileSinkState::PerPhase(files)) => {
                let file = files
                    .iter_mut()
                    .find(|(p, _)| *p == phase)
                    .map(|(_, f)| f)
                    .ok_or_else(|| Error::Sink(format!("no output file for phase {phase:?}")))?;
                writeln!(file, "{text}")?;
            }
            None => return Err(Error::Sink("sink already finalized".into())),
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<String> {
        let state = self
            .state
            .take()
            .ok_or_else(|| Error::Sink("sink already finalized".into()))?;
        match state {
            FileSinkState::Single(mut tmp) => {
                tmp.flush()?;
                tmp.persist(&self.base)
                    .map_err(|e| Error::Sink(format!("persist {}: {}", self.base.display(), e.error)))?;
            }
            FileSinkState::PerPhase(files) => {
                for (phase, mut tmp) in files {
                    tmp.flush()?;
                    let path = Self::phase_path(&self.base, phase);
                    tmp.persist(&path)
                        .map_err(|e| Error::Sink(format!("persist {}: {}", path.display(), e.error)))?;
                }
            }
        }
        Ok(self.base.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_sections() {
        let mut sink = MemorySink::new();
        sink.write_statement(Phase::Schema, "schema stmt;").unwrap();
        sink.write_statement(Phase::Nodes, "node stmt;").unwrap();
        assert_eq!(sink.script(), "schema stmt;\nnode stmt;\n");
        assert_eq!(sink.phase_script(Phase::Nodes), "node stmt;\n");
        assert_eq!(sink.finish().unwrap(), "memory");
    }

    #[test]
    fn test_phase_path_naming() {
        let base = Path::new("out/all.cypher");
        assert_eq!(
            FileSink::phase_path(base, Phase::Nodes),
            Path::new("out/all.nodes.cypher")
        );
        assert_eq!(
            FileSink::phase_path(Path::new("dump"), Phase::Schema),
            Path::new("dump.schema")
        );
    }

    #[test]
    fn test_file_sink_persists_on_finish_only() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.cypher");

        let mut sink = FileSink::create(&target).unwrap();
        sink.write_statement(Phase::Nodes, "CREATE (:A);").unwrap();
        assert!(!target.exists());

        let destination = sink.finish().unwrap();
        assert_eq!(destination, target.display().to_string());
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "CREATE (:A);\n");

        assert!(sink.write_statement(Phase::Nodes, "x").is_err());
        assert!(sink.finish().is_err());
    }
}
