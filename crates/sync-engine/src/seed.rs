// crates/sync-engine/src/seed.rs
//! Seed markers: which collections this device has already populated

use octlib_preferences::KeyValueStore;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Value stored under a marker key once seeding has been issued
pub const SEEDED_VALUE: &str = "true";

/// Records that a collection's default content has been written.
///
/// The check and the write are separate steps, so two devices starting at
/// the same time may both seed the same collection. Duplicates are accepted.
pub trait SeedMarker: Send + Sync {
    fn is_seeded(&self, key: &str) -> bool;

    /// Never fails; a marker that cannot be recorded only means the
    /// collection may be seeded again later.
    fn mark_seeded(&self, key: &str);
}

/// Marker kept in the device key-value store
pub struct LocalSeedMarker {
    store: Arc<dyn KeyValueStore>,
}

impl LocalSeedMarker {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

impl SeedMarker for LocalSeedMarker {
    fn is_seeded(&self, key: &str) -> bool {
        self.store.get(key).as_deref() == Some(SEEDED_VALUE)
    }

    fn mark_seeded(&self, key: &str) {
        if let Err(e) = self.store.set(key, SEEDED_VALUE) {
            log::warn!("Failed to record seed marker {}: {}", key, e);
        }
    }
}

/// In-process marker, forgotten on exit
#[derive(Debug, Default)]
pub struct MemorySeedMarker {
    keys: Mutex<HashSet<String>>,
}

impl MemorySeedMarker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SeedMarker for MemorySeedMarker {
    fn is_seeded(&self, key: &str) -> bool {
        self.keys
            .lock()
            .map(|keys| keys.contains(key))
            .unwrap_or(false)
    }

    fn mark_seeded(&self, key: &str) {
        match self.keys.lock() {
            Ok(mut keys) => {
                keys.insert(key.to_string());
            }
            Err(_) => log::warn!("Seed marker lock poisoned, {} not recorded", key),
        }
    }
}
