//! A single persisted value

use crate::store::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// A value mirrored to a key of a [`KeyValueStore`].
///
/// Loading never fails: an absent or unparseable stored value is replaced
/// by the initial value. The current value is written back on construction
/// and after every change. Write failures are logged, and the in-memory
/// value stays authoritative for the session.
pub struct PersistentCell<T> {
    store: Arc<dyn KeyValueStore>,
    key: String,
    value: T,
}

impl<T> PersistentCell<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>, initial: T) -> Self {
        let key = key.into();
        let value = match store.get(&key) {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    log::debug!("Ignoring malformed value under '{}': {}", key, e);
                    initial
                }
            },
            None => initial,
        };

        let cell = Self { store, key, value };
        cell.persist();
        cell
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn set(&mut self, value: T) {
        self.value = value;
        self.persist();
    }

    /// Mutates the value in place, then persists it
    pub fn update<F>(&mut self, f: F)
    where
        F: FnOnce(&mut T),
    {
        f(&mut self.value);
        self.persist();
    }

    fn persist(&self) {
        let raw = match serde_json::to_string(&self.value) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Failed to serialize '{}': {}", self.key, e);
                return;
            }
        };

        if let Err(e) = self.store.set(&self.key, &raw) {
            log::warn!("Failed to persist '{}': {}", self.key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryKeyValueStore;

    #[test]
    fn test_absent_key_uses_initial_and_persists_it() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let cell = PersistentCell::new(store.clone(), "count", 3u32);

        assert_eq!(*cell.get(), 3);
        assert_eq!(store.get("count"), Some("3".to_string()));
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_stored_value_wins_over_initial() {
        let store = Arc::new(MemoryKeyValueStore::with_entries([("count", "7")]));
        let cell = PersistentCell::new(store, "count", 3u32);
        assert_eq!(*cell.get(), 7);
    }

    #[test]
    fn test_malformed_value_falls_back_silently() {
        let store = Arc::new(MemoryKeyValueStore::with_entries([("count", "seven")]));
        let cell = PersistentCell::new(store.clone(), "count", 3u32);

        assert_eq!(*cell.get(), 3);
        assert_eq!(store.get("count"), Some("3".to_string()));
    }

    #[test]
    fn test_set_and_update_persist() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let mut cell = PersistentCell::new(store.clone(), "names", Vec::<String>::new());

        cell.set(vec!["a".to_string()]);
        assert_eq!(store.get("names"), Some("[\"a\"]".to_string()));

        cell.update(|names| names.push("b".to_string()));
        assert_eq!(store.get("names"), Some("[\"a\",\"b\"]".to_string()));
        assert_eq!(store.write_count(), 3);
    }
}
