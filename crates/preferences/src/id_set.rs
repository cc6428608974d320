//! Sets of book ids kept per device

use crate::cell::PersistentCell;
use crate::store::KeyValueStore;
use std::sync::Arc;

/// Key holding the ids of books the visitor has reserved
pub const RESERVED_KEY: &str = "oct_reserved";

/// Key holding the ids of books on the visitor's wish list
pub const WANT_TO_READ_KEY: &str = "oct_bookmark";

/// An ordered set of ids persisted as a JSON array
pub struct IdSet {
    cell: PersistentCell<Vec<String>>,
}

impl IdSet {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            cell: PersistentCell::new(store, key, Vec::new()),
        }
    }

    /// The reservation set
    pub fn reserved(store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(store, RESERVED_KEY)
    }

    /// The wish-list set
    pub fn want_to_read(store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(store, WANT_TO_READ_KEY)
    }

    /// Removes `id` if present, appends it otherwise.
    /// Returns whether the id is in the set afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        let mut added = false;
        self.cell.update(|ids| {
            if let Some(pos) = ids.iter().position(|existing| existing == id) {
                ids.remove(pos);
            } else {
                ids.push(id.to_string());
                added = true;
            }
        });
        log::debug!(
            "{} '{}' in {}",
            if added { "Added" } else { "Removed" },
            id,
            self.cell.key()
        );
        added
    }

    pub fn contains(&self, id: &str) -> bool {
        self.cell.get().iter().any(|existing| existing == id)
    }

    pub fn ids(&self) -> &[String] {
        self.cell.get()
    }

    pub fn len(&self) -> usize {
        self.cell.get().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cell.get().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryKeyValueStore;

    #[test]
    fn test_toggle_adds_then_removes() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let mut set = IdSet::reserved(store.clone());

        assert!(set.toggle("1"));
        assert!(set.contains("1"));
        assert!(!set.toggle("1"));
        assert!(!set.contains("1"));
        assert!(set.is_empty());
        assert_eq!(store.get(RESERVED_KEY), Some("[]".to_string()));
    }

    #[test]
    fn test_toggle_keeps_insertion_order() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let mut set = IdSet::want_to_read(store.clone());

        set.toggle("3");
        set.toggle("1");
        set.toggle("2");
        set.toggle("1");

        assert_eq!(set.ids(), ["3".to_string(), "2".to_string()]);
        assert_eq!(store.get(WANT_TO_READ_KEY), Some("[\"3\",\"2\"]".to_string()));
    }

    #[test]
    fn test_sets_are_independent() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());
        let mut reserved = IdSet::reserved(store.clone());
        let want = IdSet::want_to_read(store);

        reserved.toggle("1");
        assert!(reserved.contains("1"));
        assert!(!want.contains("1"));
    }
}
