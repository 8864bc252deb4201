//! Destinations for rendered snapshots and the final diagram source.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Receives replay artifacts in order: snapshots by step, then the source.
pub trait ArtifactSink {
    fn emit_snapshot(&mut self, step: usize, bytes: &[u8]) -> io::Result<()>;
    fn emit_source(&mut self, source: &str) -> io::Result<()>;
}

/// File name of the snapshot for `step`.
pub fn snapshot_name(step: usize) -> String {
    format!("step{}.svg", step)
}

/// Writes `step{N}.svg` files into a directory, and the source to a
/// separate path.
pub struct DirectorySink {
    dir: PathBuf,
    source_path: PathBuf,
}

impl DirectorySink {
    /// Creates `dir` if it does not exist yet.
    pub fn new(dir: impl Into<PathBuf>, source_path: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            source_path: source_path.into(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }
}

impl ArtifactSink for DirectorySink {
    fn emit_snapshot(&mut self, step: usize, bytes: &[u8]) -> io::Result<()> {
        let path = self.dir.join(snapshot_name(step));
        fs::write(&path, bytes)?;
        debug!(path = %path.display(), bytes = bytes.len(), "wrote snapshot");
        Ok(())
    }

    fn emit_source(&mut self, source: &str) -> io::Result<()> {
        if let Some(parent) = self.source_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.source_path, source)?;
        debug!(path = %self.source_path.display(), "wrote diagram source");
        Ok(())
    }
}

/// Keeps artifacts in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub snapshots: Vec<(usize, Vec<u8>)>,
    pub source: Option<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> Vec<usize> {
        self.snapshots.iter().map(|(step, _)| *step).collect()
    }
}

impl ArtifactSink for MemorySink {
    fn emit_snapshot(&mut self, step: usize, bytes: &[u8]) -> io::Result<()> {
        self.snapshots.push((step, bytes.to_vec()));
        Ok(())
    }

    fn emit_source(&mut self, source: &str) -> io::Result<()> {
        self.source = Some(source.to_string());
        Ok(())
    }
}
