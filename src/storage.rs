// SPDX-License-Identifier: GPL-3.0-only

//! Storage utilities for persisted records and captured stills
//!
//! The projection surface keeps its calibration in a single named
//! key-value entry. [`JsonFileStore`] backs that with one file per key in the
//! application data directory; [`MemoryStore`] is used by tests and by
//! kiosks that must not touch the disk.

use crate::errors::{AppError, AppResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Minimal named-entry store
pub trait KeyValueStore: Send {
    /// Read an entry, `Ok(None)` when it was never written
    fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Write an entry, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> AppResult<()>;
}

/// Default directory for persisted application data
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("facemask")
}

/// Default directory for saved captured stills
pub fn default_capture_dir() -> PathBuf {
    dirs::picture_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("facemask")
}

/// One JSON file per key inside a directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are fixed identifiers; anything path-like is flattened
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to read '{}': {}",
                path.display(),
                e
            ))),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> AppResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);

        // Write to a sibling file first so a crash never leaves half a record
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;

        debug!(path = %path.display(), "Persisted entry");
        Ok(())
    }
}

/// In-memory store; clones share the same entries
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail, for exercising best-effort persistence
    pub fn read_only() -> Self {
        Self {
            entries: Arc::default(),
            read_only: true,
        }
    }

    /// Seed an entry directly
    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> AppResult<()> {
        if self.read_only {
            return Err(AppError::Storage("store is read-only".to_string()));
        }
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("facemask-{}-{}", name, uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_file_store_missing_key() {
        let store = JsonFileStore::new(scratch_dir("missing"));
        assert_eq!(store.get("projSettings").unwrap(), None);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = scratch_dir("roundtrip");
        let mut store = JsonFileStore::new(&dir);
        store.set("projSettings", "{\"x\":1}").unwrap();

        let reopened = JsonFileStore::new(&dir);
        assert_eq!(
            reopened.get("projSettings").unwrap().as_deref(),
            Some("{\"x\":1}")
        );

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_file_store_flattens_key() {
        let store = JsonFileStore::new("/tmp/base");
        assert_eq!(
            store.path_for("../etc/passwd"),
            PathBuf::from("/tmp/base/___etc_passwd.json")
        );
    }

    #[test]
    fn test_memory_store_clones_share_entries() {
        let mut store = MemoryStore::new();
        let view = store.clone();
        store.set("k", "v").unwrap();
        assert_eq!(view.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_read_only_store_rejects_writes() {
        let mut store = MemoryStore::read_only();
        assert!(store.set("k", "v").is_err());
        assert_eq!(store.get("k").unwrap(), None);
    }
}
