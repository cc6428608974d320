// crates/sync-engine/src/synchronizer.rs
//! Keeps one in-memory collection mirrored from the store

use crate::seed::SeedMarker;
use crate::store::{Direction, DocumentStore, OrderBy, Query, Snapshot, Subscription};
use octlib_core::{Collection, Document};
use std::sync::{Arc, RwLock, Weak};

/// What a snapshot did to the synchronizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// State replaced by this many entities
    Replaced(usize),
    /// Snapshot was empty and this many default items were written;
    /// state left as it was
    Seeded(usize),
    /// Snapshot was empty and state is now empty
    Cleared,
}

/// Default content written the first time a collection is seen empty
struct SeedPlan<T> {
    items: Vec<T>,
    marker: Arc<dyn SeedMarker>,
}

impl<T: Document> SeedPlan<T> {
    fn key(&self) -> &'static str {
        T::COLLECTION.seed_marker_key()
    }

    /// Issues one add per item, then records the marker whatever the
    /// individual results. Returns how many adds succeeded.
    fn run(&self, store: &dyn DocumentStore) -> usize {
        log::info!(
            "Collection {} is empty, seeding {} default items",
            T::COLLECTION,
            self.items.len()
        );

        let mut written = 0;
        for item in &self.items {
            let fields = match item.to_fields() {
                Ok(fields) => fields,
                Err(e) => {
                    log::warn!("Seed item for {} not serializable: {}", T::COLLECTION, e);
                    continue;
                }
            };
            match store.add(T::COLLECTION, fields) {
                Ok(id) => {
                    log::debug!("Seeded {}/{}", T::COLLECTION, id);
                    written += 1;
                }
                Err(e) => log::warn!("Seed write to {} failed: {}", T::COLLECTION, e),
            }
        }

        self.marker.mark_seeded(self.key());
        written
    }
}

/// Applies one snapshot. The only place a collection's state is written
/// while subscribed.
fn apply<T: Document>(
    state: &RwLock<Vec<T>>,
    seed: Option<&SeedPlan<T>>,
    store: Option<&dyn DocumentStore>,
    snapshot: &Snapshot,
) -> SnapshotOutcome {
    if !snapshot.is_empty() {
        let items: Vec<T> = snapshot
            .documents
            .iter()
            .filter_map(|doc| match T::from_fields(&doc.id, &doc.fields) {
                Ok(item) => Some(item),
                Err(e) => {
                    log::warn!("Skipping unreadable document {}/{}: {}", T::COLLECTION, doc.id, e);
                    None
                }
            })
            .collect();

        let count = items.len();
        *state.write().unwrap_or_else(|e| e.into_inner()) = items;
        log::debug!("Applied snapshot of {} with {} items", T::COLLECTION, count);
        return SnapshotOutcome::Replaced(count);
    }

    match (seed, store) {
        (Some(plan), Some(store)) if !plan.marker.is_seeded(plan.key()) => {
            SnapshotOutcome::Seeded(plan.run(store))
        }
        _ => {
            state.write().unwrap_or_else(|e| e.into_inner()).clear();
            log::debug!("Collection {} is empty", T::COLLECTION);
            SnapshotOutcome::Cleared
        }
    }
}

/// Mirrors one store collection into memory.
///
/// Every snapshot fully replaces the in-memory list; nothing is merged.
/// An empty snapshot either triggers a one-time seed (when a seed plan is
/// configured and its marker is unset) or empties the list.
pub struct CollectionSynchronizer<T: Document> {
    store: Option<Arc<dyn DocumentStore>>,
    order_by: Option<OrderBy>,
    seed: Option<Arc<SeedPlan<T>>>,
    state: Arc<RwLock<Vec<T>>>,
    subscription: Option<Subscription>,
}

impl<T: Document> CollectionSynchronizer<T> {
    /// Creates a synchronizer for `T::COLLECTION` on `store`
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store: Some(store),
            order_by: None,
            seed: None,
            state: Arc::new(RwLock::new(Vec::new())),
            subscription: None,
        }
    }

    /// Creates a synchronizer with no store; it can only hold fallback data
    pub fn offline() -> Self {
        Self {
            store: None,
            order_by: None,
            seed: None,
            state: Arc::new(RwLock::new(Vec::new())),
            subscription: None,
        }
    }

    /// Requests snapshots sorted by `field`
    pub fn ordered_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy::new(field, direction));
        self
    }

    /// Writes `items` the first time the collection is seen empty
    pub fn with_seed(mut self, items: Vec<T>, marker: Arc<dyn SeedMarker>) -> Self {
        self.seed = Some(Arc::new(SeedPlan { items, marker }));
        self
    }

    pub fn collection(&self) -> Collection {
        T::COLLECTION
    }

    /// Starts listening. Does nothing if already subscribed or offline.
    pub fn subscribe(&mut self) {
        if self.subscription.is_some() {
            log::debug!("Already subscribed to {}", T::COLLECTION);
            return;
        }
        let Some(store) = self.store.clone() else {
            log::warn!("No store, {} will not be subscribed", T::COLLECTION);
            return;
        };

        let mut query = Query::collection(T::COLLECTION);
        query.order_by = self.order_by.clone();

        let state: Weak<RwLock<Vec<T>>> = Arc::downgrade(&self.state);
        let weak_store: Weak<dyn DocumentStore> = Arc::downgrade(&store);
        let seed = self.seed.clone();

        log::info!("Subscribing to {}", T::COLLECTION);
        let subscription = store.subscribe(
            query,
            Arc::new(move |snapshot: &Snapshot| {
                let Some(state) = state.upgrade() else {
                    return;
                };
                let store = weak_store.upgrade();
                apply(&state, seed.as_deref(), store.as_deref(), snapshot);
            }),
        );
        self.subscription = Some(subscription);
    }

    /// Stops listening; state keeps its last value
    pub fn unsubscribe(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.unsubscribe();
            log::info!("Unsubscribed from {}", T::COLLECTION);
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Applies a snapshot exactly as the live listener would
    pub fn apply_snapshot(&self, snapshot: &Snapshot) -> SnapshotOutcome {
        apply(
            &self.state,
            self.seed.as_deref(),
            self.store.as_deref(),
            snapshot,
        )
    }

    /// Replaces state directly, for use while the store is unavailable
    pub fn load_fallback(&self, items: Vec<T>) {
        log::info!(
            "Showing {} built-in items for {}",
            items.len(),
            T::COLLECTION
        );
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = items;
    }

    /// Copy of the current state
    pub fn items(&self) -> Vec<T> {
        self.state.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.state.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Document> Drop for CollectionSynchronizer<T> {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::MemorySeedMarker;
    use crate::store::{MemoryStore, StoredDocument};
    use octlib_core::{Book, Notice};
    use serde_json::json;

    fn book_doc(id: &str, title: &str) -> StoredDocument {
        StoredDocument {
            id: id.to_string(),
            fields: json!({"title": title, "author": "a"})
                .as_object()
                .cloned()
                .unwrap_or_default(),
        }
    }

    #[test]
    fn test_non_empty_snapshot_replaces_state() {
        let sync = CollectionSynchronizer::<Book>::offline();
        sync.load_fallback(vec![Book::new("old", "x")]);

        let snapshot = Snapshot::new(
            Collection::Books,
            vec![book_doc("b1", "one"), book_doc("b2", "two")],
        );
        assert_eq!(sync.apply_snapshot(&snapshot), SnapshotOutcome::Replaced(2));

        let items = sync.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "b1");
        assert!(items.iter().all(|b| b.title != "old"));
    }

    #[test]
    fn test_unreadable_documents_are_skipped() {
        let sync = CollectionSynchronizer::<Book>::offline();
        let bad = StoredDocument {
            id: "bad".to_string(),
            fields: json!({"title": 42}).as_object().cloned().unwrap_or_default(),
        };
        let snapshot = Snapshot::new(Collection::Books, vec![bad, book_doc("ok", "fine")]);

        assert_eq!(sync.apply_snapshot(&snapshot), SnapshotOutcome::Replaced(1));
        assert_eq!(sync.items()[0].id, "ok");
    }

    #[test]
    fn test_empty_without_seed_clears() {
        let sync = CollectionSynchronizer::<Book>::offline();
        sync.load_fallback(vec![Book::new("t", "a")]);
        assert_eq!(
            sync.apply_snapshot(&Snapshot::empty(Collection::Books)),
            SnapshotOutcome::Cleared
        );
        assert!(sync.is_empty());
    }

    #[test]
    fn test_empty_with_unset_marker_seeds_without_touching_state() {
        let store = MemoryStore::with_delivery(crate::store::Delivery::Deferred);
        let marker = Arc::new(MemorySeedMarker::new());
        let sync = CollectionSynchronizer::<Notice>::new(Arc::new(store.clone()))
            .with_seed(octlib_core::defaults::initial_notices(), marker.clone());

        let outcome = sync.apply_snapshot(&Snapshot::empty(Collection::Notices));
        assert_eq!(outcome, SnapshotOutcome::Seeded(2));
        assert!(sync.is_empty());
        assert!(marker.is_seeded("seeded_notices"));
        assert_eq!(store.write_count(), 2);

        // stored ids are the store's, not the defaults'
        let stored = store.documents(Collection::Notices).unwrap();
        assert!(stored.iter().all(|d| d.id != "nt1" && d.id != "nt2"));
        assert!(stored.iter().all(|d| !d.fields.contains_key("id")));

        assert_eq!(
            sync.apply_snapshot(&Snapshot::empty(Collection::Notices)),
            SnapshotOutcome::Cleared
        );
        assert_eq!(store.write_count(), 2);
    }

    #[test]
    fn test_subscribe_twice_is_noop() {
        let store = MemoryStore::new();
        let mut sync = CollectionSynchronizer::<Book>::new(Arc::new(store.clone()));
        sync.subscribe();
        sync.subscribe();
        assert!(sync.is_subscribed());
        assert_eq!(store.subscription_count(), 1);

        sync.unsubscribe();
        assert!(!sync.is_subscribed());
        assert_eq!(store.subscription_count(), 0);
    }

    #[test]
    fn test_offline_subscribe_does_nothing() {
        let mut sync = CollectionSynchronizer::<Book>::offline();
        sync.subscribe();
        assert!(!sync.is_subscribed());
    }

    #[test]
    fn test_drop_revokes_subscription() {
        let store = MemoryStore::new();
        {
            let mut sync = CollectionSynchronizer::<Book>::new(Arc::new(store.clone()));
            sync.subscribe();
            assert_eq!(store.subscription_count(), 1);
        }
        assert_eq!(store.subscription_count(), 0);
    }
}
