//! Preference persistence across sessions

use octlib_preferences::{
    FileKeyValueStore, IdSet, KeyValueStore, MemoryKeyValueStore, PersistentCell, RESERVED_KEY,
    WANT_TO_READ_KEY,
};
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn test_toggle_twice_restores_membership_but_writes_each_time() {
    let store = Arc::new(MemoryKeyValueStore::new());
    let mut reserved = IdSet::reserved(store.clone());
    let writes_after_load = store.write_count();

    reserved.toggle("2");
    reserved.toggle("2");

    assert!(!reserved.contains("2"));
    assert_eq!(store.write_count(), writes_after_load + 2);
}

#[test]
fn test_sets_survive_restart() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("preferences.json");

    {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::open(&path));
        let mut reserved = IdSet::reserved(store.clone());
        let mut want = IdSet::want_to_read(store);
        reserved.toggle("1");
        want.toggle("3");
        want.toggle("2");
    }

    let store: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::open(&path));
    let reserved = IdSet::reserved(store.clone());
    let want = IdSet::want_to_read(store);
    assert_eq!(reserved.ids(), ["1".to_string()]);
    assert_eq!(want.ids(), ["3".to_string(), "2".to_string()]);

    Ok(())
}

#[test]
fn test_malformed_set_is_reset_to_empty() {
    let store = Arc::new(MemoryKeyValueStore::with_entries([
        (RESERVED_KEY, "{\"not\": \"a list\"}"),
        (WANT_TO_READ_KEY, "[\"1\"]"),
    ]));

    let reserved = IdSet::reserved(store.clone());
    let want = IdSet::want_to_read(store.clone());

    assert!(reserved.is_empty());
    assert_eq!(store.get(RESERVED_KEY), Some("[]".to_string()));
    assert_eq!(want.len(), 1);
}

#[test]
fn test_cell_of_string() {
    let store = Arc::new(MemoryKeyValueStore::new());
    let mut cell = PersistentCell::new(store.clone(), "seeded_books", String::new());
    cell.set("true".to_string());
    assert_eq!(store.get("seeded_books"), Some("\"true\"".to_string()));
}
