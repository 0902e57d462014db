use crate::catalog::{compile_pattern, ActionCatalog, DEFAULT_VERSION_ID};
use crate::error::{CatalogError, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct State {
    files: BTreeMap<String, Vec<u8>>,
    changed: BTreeSet<String>,
    version: Option<String>,
}

/// In-memory catalog. Writes are uncommitted until [`commit`](Self::commit).
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    state: Mutex<State>,
}

impl MemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock cannot leave `State` half-updated.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Mark every pending write as committed under `version`.
    pub fn commit(&self, version: impl Into<String>) {
        let mut state = self.lock();
        state.changed.clear();
        state.version = Some(version.into());
    }

    pub fn remove(&self, path: &str) -> bool {
        let mut state = self.lock();
        let removed = state.files.remove(path).is_some();
        if removed {
            state.changed.insert(path.to_string());
        }
        removed
    }
}

impl ActionCatalog for MemoryCatalog {
    fn exists(&self, path: &str) -> bool {
        self.lock().files.contains_key(path)
    }

    fn read_bytes(&self, path: &str) -> Result<Vec<u8>> {
        self.lock()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(path.to_string()))
    }

    fn write_bytes(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let mut state = self.lock();
        state.files.insert(path.to_string(), bytes.to_vec());
        state.changed.insert(path.to_string());
        Ok(())
    }

    fn list_changed(&self, pattern: &str) -> Result<Vec<String>> {
        let matcher = compile_pattern(pattern)?;
        Ok(self
            .lock()
            .changed
            .iter()
            .filter(|path| matcher.is_match(path.as_str()))
            .cloned()
            .collect())
    }

    fn current_version_id(&self) -> Result<String> {
        Ok(self
            .lock()
            .version
            .clone()
            .unwrap_or_else(|| DEFAULT_VERSION_ID.to_string()))
    }

    fn has_uncommitted_changes(&self) -> Result<bool> {
        Ok(!self.lock().changed.is_empty())
    }
}
