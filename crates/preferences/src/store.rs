//! The key-value boundary and its two implementations

use crate::error::{PreferenceError, PreferenceResult};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// Device-local string storage
pub trait KeyValueStore: Send + Sync {
    /// Returns the raw value stored under `key`
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> PreferenceResult<()>;
}

/// Ephemeral store, for tests and for sessions that must not touch disk
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `entries`; they do not count as writes
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of successful `set` calls
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> PreferenceResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| PreferenceError::LockPoisoned)?;
        entries.insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Store backed by one JSON object file, rewritten atomically on every change
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileKeyValueStore {
    /// Opens the store at `path`. A missing file is an empty store; so is an
    /// unreadable or corrupt one, which is logged and replaced on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::read_entries(&path);
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(path: &Path) -> BTreeMap<String, String> {
        if !path.exists() {
            log::debug!("No preferences at {}, starting empty", path.display());
            return BTreeMap::new();
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                log::warn!(
                    "Failed to read preferences at {}: {}, starting empty",
                    path.display(),
                    e
                );
                return BTreeMap::new();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!(
                    "Preferences at {} are corrupt: {}, starting empty",
                    path.display(),
                    e
                );
                BTreeMap::new()
            }
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> PreferenceResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| PreferenceError::DirectoryCreationError {
                path: dir.clone(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(entries)?;
        let mut temp_file = NamedTempFile::new_in(&dir)?;
        temp_file.write_all(json.as_bytes())?;
        temp_file.flush()?;
        temp_file
            .persist(&self.path)
            .map_err(|e| PreferenceError::WriteError {
                path: self.path.clone(),
                source: e.error,
            })?;

        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> PreferenceResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| PreferenceError::LockPoisoned)?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_counts_writes() {
        let store = MemoryKeyValueStore::with_entries([("a", "1")]);
        assert_eq!(store.get("a"), Some("1".to_string()));
        assert_eq!(store.write_count(), 0);

        store.set("a", "2").unwrap();
        store.set("a", "2").unwrap();
        assert_eq!(store.get("a"), Some("2".to_string()));
        assert_eq!(store.write_count(), 2);
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("prefs").join("preferences.json");

        let store = FileKeyValueStore::open(&path);
        assert_eq!(store.get("oct_reserved"), None);
        store.set("oct_reserved", "[\"1\"]").unwrap();
        assert!(path.exists());

        let reopened = FileKeyValueStore::open(&path);
        assert_eq!(reopened.get("oct_reserved"), Some("[\"1\"]".to_string()));
    }

    #[test]
    fn test_file_store_corrupt_file_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("preferences.json");
        fs::write(&path, "{not json").unwrap();

        let store = FileKeyValueStore::open(&path);
        assert_eq!(store.get("anything"), None);

        store.set("k", "v").unwrap();
        let reopened = FileKeyValueStore::open(&path);
        assert_eq!(reopened.get("k"), Some("v".to_string()));
    }
}
