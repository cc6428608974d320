// crates/sync-engine/src/lib.rs
//! Realtime synchronization between the shared document store and the site
//!
//! This crate provides:
//! - The `DocumentStore` boundary with in-memory and file-backed stores
//! - One `CollectionSynchronizer` per collection, fully replacing local
//!   state on every snapshot and seeding empty collections once
//! - `FeatureSynchronizer` for the monthly feature singleton
//! - `MutationGateway`, the only path for admin writes
//! - `LibrarySite`, which owns all of the above plus device preferences
//!
//! # Example
//!
//! ```rust
//! use octlib_preferences::MemoryKeyValueStore;
//! use octlib_sync_engine::{Connection, LibrarySite, MemoryStore, SiteOptions};
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::new());
//! let mut site = LibrarySite::start(
//!     Connection::Connected(store),
//!     Arc::new(MemoryKeyValueStore::new()),
//!     SiteOptions::default(),
//! );
//!
//! // An empty store is seeded with the default catalog
//! assert_eq!(site.view().books.len(), 3);
//!
//! let id = site.view().books[0].id.clone();
//! assert!(site.toggle_reserve(&id));
//! assert!(site.view().is_reserved(&id));
//! ```

mod error;
mod feature;
mod gateway;
mod seed;
mod site;
mod store;
mod synchronizer;

pub use error::{SyncError, SyncResult, DISCONNECTED_MESSAGE};
pub use feature::{FeatureOutcome, FeatureSynchronizer};
pub use gateway::{Confirm, DeleteOutcome, MutationGateway, DELETE_PROMPT};
pub use seed::{LocalSeedMarker, MemorySeedMarker, SeedMarker, SEEDED_VALUE};
pub use site::{Connection, LibrarySite, SiteOptions, SiteView};
pub use store::{
    Delivery, Direction, DocumentListener, DocumentPath, DocumentStore, FileStore, MemoryStore,
    OrderBy, Query, Snapshot, SnapshotListener, StoredDocument, Subscription,
};
pub use synchronizer::{CollectionSynchronizer, SnapshotOutcome};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_exports_accessible() {
        let _: MemoryStore = MemoryStore::new();
        let _: MutationGateway = MutationGateway::disconnected();
        let _: SiteOptions = SiteOptions::default();
        let _: Query = Query::collection(octlib_core::Collection::Books);
    }
}
