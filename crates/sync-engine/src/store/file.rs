// crates/sync-engine/src/store/file.rs
//! Document store persisted as a single JSON file

use crate::error::{SyncError, SyncResult};
use crate::store::{
    DocumentListener, DocumentPath, DocumentStore, MemoryStore, Query, SnapshotListener,
    StoredDocument, Subscription,
};
use octlib_core::{Collection, Fields};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::SystemTime;
use tempfile::NamedTempFile;

/// Current store file format version
pub const STORE_FILE_VERSION: u32 = 1;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    #[serde(default)]
    collections: BTreeMap<Collection, Vec<StoredDocument>>,
}

/// What we last saw on disk, used to detect writes by other processes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    modified: SystemTime,
    len: u64,
}

/// A [`MemoryStore`] whose contents are written to disk after every
/// successful write and can be reloaded when another process changes them.
///
/// Several processes may share one file; each sees the others' writes on
/// [`FileStore::reload_if_changed`]. Concurrent writers are last-writer-wins
/// at file granularity.
pub struct FileStore {
    path: PathBuf,
    memory: MemoryStore,
    seen: Mutex<Option<Fingerprint>>,
}

impl FileStore {
    /// Opens the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> SyncResult<Self> {
        let path = path.into();
        let memory = MemoryStore::new();
        let store = Self {
            path,
            memory,
            seen: Mutex::new(None),
        };

        if store.path.exists() {
            let collections = store.read()?;
            let count: usize = collections.values().map(Vec::len).sum();
            store.memory.replace_all(collections)?;
            log::info!(
                "Opened store {} with {} documents",
                store.path.display(),
                count
            );
        } else {
            log::info!("Store {} does not exist yet, starting empty", store.path.display());
        }
        store.remember_fingerprint()?;

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The in-memory view, for inspection
    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    /// Reloads the file if it changed since this store last read or wrote it,
    /// delivering fresh snapshots to every subscription. Returns whether a
    /// reload happened.
    pub fn reload_if_changed(&self) -> SyncResult<bool> {
        let current = self.fingerprint()?;
        {
            let seen = self
                .seen
                .lock()
                .map_err(|_| SyncError::LockPoisoned("file store fingerprint"))?;
            if current.is_none() || current == *seen {
                return Ok(false);
            }
        }

        let collections = self.read()?;
        self.remember_fingerprint()?;
        log::info!("Store {} changed on disk, reloading", self.path.display());
        self.memory.replace_all(collections)?;
        Ok(true)
    }

    fn read(&self) -> SyncResult<BTreeMap<Collection, Vec<StoredDocument>>> {
        let contents = fs::read_to_string(&self.path)?;
        let file: StoreFile = serde_json::from_str(&contents)?;
        if file.version > STORE_FILE_VERSION {
            log::warn!(
                "Store {} has version {}, newer than supported {}",
                self.path.display(),
                file.version,
                STORE_FILE_VERSION
            );
        }
        Ok(file.collections)
    }

    fn fingerprint(&self) -> SyncResult<Option<Fingerprint>> {
        match fs::metadata(&self.path) {
            Ok(metadata) => Ok(Some(Fingerprint {
                modified: metadata.modified()?,
                len: metadata.len(),
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remember_fingerprint(&self) -> SyncResult<()> {
        let current = self.fingerprint()?;
        *self
            .seen
            .lock()
            .map_err(|_| SyncError::LockPoisoned("file store fingerprint"))? = current;
        Ok(())
    }

    fn persist(&self) -> SyncResult<()> {
        let file = StoreFile {
            version: STORE_FILE_VERSION,
            collections: self.memory.export()?,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let json = serde_json::to_string_pretty(&file)?;
        let mut temp_file = NamedTempFile::new_in(&dir)?;
        temp_file.write_all(json.as_bytes())?;
        temp_file.flush()?;
        temp_file.persist(&self.path).map_err(|e| e.error)?;

        self.remember_fingerprint()
    }

    fn persisted<R>(&self, result: SyncResult<R>) -> SyncResult<R> {
        let value = result?;
        if let Err(e) = self.persist() {
            log::error!("Failed to persist store {}: {}", self.path.display(), e);
            return Err(e);
        }
        Ok(value)
    }
}

impl DocumentStore for FileStore {
    fn subscribe(&self, query: Query, listener: SnapshotListener) -> Subscription {
        self.memory.subscribe(query, listener)
    }

    fn subscribe_document(&self, path: DocumentPath, listener: DocumentListener) -> Subscription {
        self.memory.subscribe_document(path, listener)
    }

    fn add(&self, collection: Collection, fields: Fields) -> SyncResult<String> {
        self.persisted(self.memory.add(collection, fields))
    }

    fn update(&self, collection: Collection, id: &str, fields: Fields) -> SyncResult<()> {
        self.persisted(self.memory.update(collection, id, fields))
    }

    fn delete(&self, collection: Collection, id: &str) -> SyncResult<()> {
        self.persisted(self.memory.delete(collection, id))
    }

    fn set(&self, path: &DocumentPath, fields: Fields) -> SyncResult<()> {
        self.persisted(self.memory.set(path, fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Snapshot;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path().join("store.json")).unwrap();
        assert!(store.memory().export().unwrap().is_empty());
        assert!(!store.reload_if_changed().unwrap());
    }

    #[test]
    fn test_writes_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data").join("store.json");

        let store = FileStore::open(&path).unwrap();
        let id = store
            .add(Collection::Books, fields(json!({"title": "静寂の森"})))
            .unwrap();
        store
            .set(&DocumentPath::feature(), fields(json!({"title": "珈琲と本"})))
            .unwrap();
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        let books = reopened.memory().documents(Collection::Books).unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].id, id);
        assert!(reopened
            .memory()
            .document(&DocumentPath::feature())
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_own_writes_do_not_trigger_reload() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path().join("store.json")).unwrap();
        store.add(Collection::News, fields(json!({}))).unwrap();
        assert!(!store.reload_if_changed().unwrap());
    }

    #[test]
    fn test_reload_delivers_other_process_writes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.json");
        let reader = FileStore::open(&path).unwrap();
        let writer = FileStore::open(&path).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _subscription = reader.subscribe(
            Query::collection(Collection::Notices),
            Arc::new(move |snapshot: &Snapshot| sink.lock().unwrap().push(snapshot.len())),
        );

        writer
            .add(Collection::Notices, fields(json!({"title": "休館"})))
            .unwrap();

        assert!(reader.reload_if_changed().unwrap());
        assert!(!reader.reload_if_changed().unwrap());
        assert_eq!(*seen.lock().unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            FileStore::open(&path),
            Err(SyncError::Serialization(_))
        ));
    }
}
