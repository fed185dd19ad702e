//! Persistent key-value store
//!
//! Saved terminal sessions and saved search queries are kept as JSON text
//! under string keys. The file-backed store keeps every key in one JSON
//! object on disk and rewrites it atomically on each `set`.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ForgeError, Result};

/// Text key-value storage shared by the shell and its panels
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Option<String>;

    /// Write `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Handle to a store shared between owners
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Read and decode a JSON value; absent or malformed text yields `None`
pub fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring malformed stored value");
            None
        }
    }
}

/// Encode a value as JSON and write it under `key`
pub fn write_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

/// Store persisted to a single JSON file
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`
    ///
    /// A missing or unreadable file starts an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "store file is corrupt, starting empty");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read store file");
                BTreeMap::new()
            }
        };

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| ForgeError::Store("store lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());

        let json = serde_json::to_string_pretty(&*entries)?;
        atomic_write(&self.path, json.as_bytes())
    }
}

/// Write to a temp file in the same directory, then rename over `path`
fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(data)?;
    temp.flush()?;
    temp.persist(path)
        .map_err(|e| ForgeError::Store(format!("{}: {}", path.display(), e.error)))?;
    Ok(())
}

/// Process-local store, used for one-shot CLI runs and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap in a shared handle
    pub fn shared() -> SharedStore {
        Arc::new(Self::new())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| ForgeError::Store("store lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = FileStore::open(&path);
        store.set("greeting", "hello").unwrap();

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get("greeting").as_deref(), Some("hello"));
        assert_eq!(reopened.get("missing"), None);
    }

    #[test]
    fn test_corrupt_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{ not json").unwrap();

        let store = FileStore::open(&path);
        assert_eq!(store.get("anything"), None);
    }

    #[test]
    fn test_read_json_treats_garbage_as_absent() {
        let store = MemoryStore::new();
        store.set("list", "[1, 2").unwrap();
        assert_eq!(read_json::<Vec<u32>>(&store, "list"), None);

        write_json(&store, "list", &vec![1u32, 2]).unwrap();
        assert_eq!(read_json::<Vec<u32>>(&store, "list"), Some(vec![1, 2]));
    }

    #[test]
    fn test_shared_handles_see_writes() {
        let store = MemoryStore::shared();
        let other = Arc::clone(&store);
        store.set("k", "v").unwrap();
        assert_eq!(other.get("k").as_deref(), Some("v"));
    }
}
