use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::sheet::schema::Snapshot;

/// File-backed store for the last observed snapshot. The file is a single
/// pretty-printed JSON object mapping tariff name to its rate fields and is
/// fully overwritten on every save.
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

    /// A missing file is the first-run signal, not an error. A present but
    /// unreadable or malformed file is an error.
    pub fn load(&self) -> Result<Snapshot> {
        if !self.path.exists() {
            return Ok(Snapshot::default());
        }
        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("failed reading snapshot: {}", self.path.display()))?;
        let snapshot = serde_json::from_str(&data)
            .with_context(|| format!("failed parsing snapshot JSON: {}", self.path.display()))?;
        Ok(snapshot)
    }

    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed creating snapshot directory: {}", parent.display())
                })?;
            }
        }
        let data = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.path, data)
            .with_context(|| format!("failed writing snapshot: {}", self.path.display()))
    }
}
