//! Last-known-good rate snapshot on disk.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use landed_common::RateQuote;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{FxError, FxResult};

/// Default snapshot location, relative to the working directory.
pub const DEFAULT_SNAPSHOT_PATH: &str = "data/rate_snapshot.json";

/// Persists the most recent live quote as pretty JSON.
///
/// Writes land in a temporary sibling file that is renamed over the target,
/// so concurrent readers see either the old or the new snapshot. Concurrent
/// writers race and the last rename wins.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted quote.
    ///
    /// `Ok(None)` when no snapshot has been written yet.
    pub fn load(&self) -> FxResult<Option<RateQuote>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No rate snapshot found");
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| FxError::PersistenceRead(format!("{}: {}", self.path.display(), e)))?;
        let quote = serde_json::from_str(&content)
            .map_err(|e| FxError::PersistenceRead(format!("{}: {}", self.path.display(), e)))?;

        debug!(path = %self.path.display(), "Loaded rate snapshot");
        Ok(Some(quote))
    }

    /// Atomically replace the persisted quote.
    pub fn save(&self, quote: &RateQuote) -> FxResult<()> {
        let write_err = |e: &dyn std::fmt::Display| {
            FxError::PersistenceWrite(format!("{}: {}", self.path.display(), e))
        };

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| write_err(&e))?;

        let content = serde_json::to_string_pretty(quote).map_err(|e| write_err(&e))?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| write_err(&e))?;
        tmp.write_all(content.as_bytes()).map_err(|e| write_err(&e))?;
        tmp.as_file().sync_all().map_err(|e| write_err(&e))?;
        tmp.persist(&self.path).map_err(|e| write_err(&e.error))?;

        debug!(path = %self.path.display(), "Saved rate snapshot");
        Ok(())
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(DEFAULT_SNAPSHOT_PATH)
    }
}
