// crates/sync-engine/src/store/memory.rs
//! In-process document store

use crate::error::{SyncError, SyncResult};
use crate::store::{
    DocumentListener, DocumentPath, DocumentStore, Query, Snapshot, SnapshotListener,
    StoredDocument, Subscription,
};
use octlib_core::{Collection, Fields};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// Length of store-assigned document ids
pub const ID_LENGTH: usize = 20;

/// When listeners see the effect of a write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delivery {
    /// Before the write returns. A write made by a listener is queued
    /// behind the snapshots already waiting and delivered by the outermost call.
    #[default]
    Immediate,
    /// Only when [`MemoryStore::deliver_pending`] is called
    Deferred,
}

enum Watch {
    Collection {
        query: Query,
        listener: SnapshotListener,
    },
    Document {
        path: DocumentPath,
        listener: DocumentListener,
    },
}

enum Payload {
    Collection(SnapshotListener, Snapshot),
    Document(DocumentListener, Option<Fields>),
}

struct Notification {
    watch_id: u64,
    payload: Payload,
}

#[derive(Default)]
struct State {
    collections: HashMap<Collection, Vec<StoredDocument>>,
    watches: BTreeMap<u64, Watch>,
    next_watch_id: u64,
    pending: VecDeque<Notification>,
    /// Set while a call is draining `pending` in immediate mode
    delivering: bool,
    writes: usize,
    unavailable: bool,
}

impl State {
    fn documents(&self, collection: Collection) -> &[StoredDocument] {
        self.collections
            .get(&collection)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn find(&self, path: &DocumentPath) -> Option<&StoredDocument> {
        self.documents(path.collection)
            .iter()
            .find(|doc| doc.id == path.id)
    }

    fn snapshot(&self, query: &Query) -> Snapshot {
        let mut documents = self.documents(query.collection).to_vec();
        if let Some(order_by) = &query.order_by {
            order_by.sort(&mut documents);
        }
        Snapshot::new(query.collection, documents)
    }

    fn notification(&self, watch_id: u64, watch: &Watch) -> Notification {
        let payload = match watch {
            Watch::Collection { query, listener } => {
                Payload::Collection(listener.clone(), self.snapshot(query))
            }
            Watch::Document { path, listener } => {
                Payload::Document(listener.clone(), self.find(path).map(|d| d.fields.clone()))
            }
        };
        Notification { watch_id, payload }
    }

    /// Notifications for every watch on `collection`, or on everything when `None`
    fn notifications_for(&self, collection: Option<Collection>) -> Vec<Notification> {
        self.watches
            .iter()
            .filter(|(_, watch)| {
                let watched = match watch {
                    Watch::Collection { query, .. } => query.collection,
                    Watch::Document { path, .. } => path.collection,
                };
                collection.map_or(true, |c| c == watched)
            })
            .map(|(id, watch)| self.notification(*id, watch))
            .collect()
    }

    fn register(&mut self, watch: Watch) -> (u64, Notification) {
        let id = self.next_watch_id;
        self.next_watch_id += 1;
        let initial = self.notification(id, &watch);
        self.watches.insert(id, watch);
        (id, initial)
    }
}

struct Inner {
    state: Mutex<State>,
    delivery: Delivery,
}

impl Inner {
    fn lock(&self) -> SyncResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| SyncError::LockPoisoned("memory store"))
    }
}

/// A document store held in memory.
///
/// Listeners are always invoked with no store lock held, so a listener may
/// write back into the store. Snapshots go through one FIFO queue, so every
/// listener sees them in write order and the last one it sees is current.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store with immediate delivery
    pub fn new() -> Self {
        Self::with_delivery(Delivery::Immediate)
    }

    pub fn with_delivery(delivery: Delivery) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::default()),
                delivery,
            }),
        }
    }

    pub fn delivery(&self) -> Delivery {
        self.inner.delivery
    }

    /// While set, every write fails with [`SyncError::WriteRejected`]
    pub fn set_unavailable(&self, unavailable: bool) -> SyncResult<()> {
        self.inner.lock()?.unavailable = unavailable;
        Ok(())
    }

    /// Number of successful writes since creation
    pub fn write_count(&self) -> usize {
        self.inner.lock().map(|state| state.writes).unwrap_or(0)
    }

    /// Number of live subscriptions
    pub fn subscription_count(&self) -> usize {
        self.inner.lock().map(|state| state.watches.len()).unwrap_or(0)
    }

    /// Current documents of a collection, in store order
    pub fn documents(&self, collection: Collection) -> SyncResult<Vec<StoredDocument>> {
        Ok(self.inner.lock()?.documents(collection).to_vec())
    }

    /// Current body of one document
    pub fn document(&self, path: &DocumentPath) -> SyncResult<Option<Fields>> {
        Ok(self.inner.lock()?.find(path).map(|doc| doc.fields.clone()))
    }

    /// Every non-empty collection
    pub fn export(&self) -> SyncResult<BTreeMap<Collection, Vec<StoredDocument>>> {
        let state = self.inner.lock()?;
        Ok(state
            .collections
            .iter()
            .filter(|(_, docs)| !docs.is_empty())
            .map(|(collection, docs)| (*collection, docs.clone()))
            .collect())
    }

    /// Replaces all content at once and notifies every subscription.
    /// Not counted as a write; used when another process changed the data.
    pub fn replace_all(
        &self,
        collections: BTreeMap<Collection, Vec<StoredDocument>>,
    ) -> SyncResult<()> {
        let notifications = {
            let mut state = self.inner.lock()?;
            state.collections = collections.into_iter().collect();
            state.notifications_for(None)
        };
        self.dispatch(notifications)
    }

    /// Delivers queued snapshots in write order, including any queued by
    /// listeners while delivering. Returns how many were delivered.
    pub fn deliver_pending(&self) -> SyncResult<usize> {
        self.drain()
    }

    fn drain(&self) -> SyncResult<usize> {
        let mut delivered = 0;
        loop {
            let next = self.inner.lock()?.pending.pop_front();
            match next {
                Some(notification) => {
                    if self.deliver(notification)? {
                        delivered += 1;
                    }
                }
                None => return Ok(delivered),
            }
        }
    }

    /// Number of snapshots waiting for [`MemoryStore::deliver_pending`]
    pub fn pending_count(&self) -> usize {
        self.inner.lock().map(|state| state.pending.len()).unwrap_or(0)
    }

    fn deliver(&self, notification: Notification) -> SyncResult<bool> {
        if !self.inner.lock()?.watches.contains_key(&notification.watch_id) {
            return Ok(false);
        }

        match notification.payload {
            Payload::Collection(listener, snapshot) => listener(&snapshot),
            Payload::Document(listener, fields) => listener(fields.as_ref()),
        }
        Ok(true)
    }

    fn dispatch(&self, notifications: Vec<Notification>) -> SyncResult<()> {
        match self.inner.delivery {
            Delivery::Immediate => {
                {
                    let mut state = self.inner.lock()?;
                    state.pending.extend(notifications);
                    if state.delivering {
                        return Ok(());
                    }
                    state.delivering = true;
                }
                let drained = self.drain();
                if let Ok(mut state) = self.inner.lock() {
                    state.delivering = false;
                }
                drained?;
            }
            Delivery::Deferred => {
                self.inner.lock()?.pending.extend(notifications);
            }
        }
        Ok(())
    }

    fn watch(&self, watch: Watch) -> Subscription {
        let registered = self.inner.lock().map(|mut state| state.register(watch));
        let (watch_id, initial) = match registered {
            Ok(registered) => registered,
            Err(e) => {
                log::error!("Subscription not registered: {}", e);
                return Subscription::new(|| {});
            }
        };

        if let Err(e) = self.dispatch(vec![initial]) {
            log::error!("Initial snapshot not delivered: {}", e);
        }

        let weak = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                if let Ok(mut state) = inner.state.lock() {
                    state.watches.remove(&watch_id);
                }
            }
        })
    }

    /// Applies one write and notifies watchers of `collection`
    fn write<R>(
        &self,
        operation: &'static str,
        collection: Collection,
        apply: impl FnOnce(&mut State) -> SyncResult<R>,
    ) -> SyncResult<R> {
        let (result, notifications) = {
            let mut state = self.inner.lock()?;
            if state.unavailable {
                return Err(SyncError::WriteRejected {
                    operation,
                    collection,
                    reason: "store is unavailable".to_string(),
                });
            }
            let result = apply(&mut state)?;
            state.writes += 1;
            (result, state.notifications_for(Some(collection)))
        };

        log::debug!("{} on {} applied", operation, collection);
        self.dispatch(notifications)?;
        Ok(result)
    }
}

fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()[..ID_LENGTH].to_string()
}

impl DocumentStore for MemoryStore {
    fn subscribe(&self, query: Query, listener: SnapshotListener) -> Subscription {
        log::debug!("Subscribing to {}", query.collection);
        self.watch(Watch::Collection { query, listener })
    }

    fn subscribe_document(&self, path: DocumentPath, listener: DocumentListener) -> Subscription {
        log::debug!("Subscribing to {}", path);
        self.watch(Watch::Document { path, listener })
    }

    fn add(&self, collection: Collection, fields: Fields) -> SyncResult<String> {
        self.write("add", collection, |state| {
            let id = generate_id();
            state
                .collections
                .entry(collection)
                .or_default()
                .push(StoredDocument {
                    id: id.clone(),
                    fields,
                });
            Ok(id)
        })
    }

    fn update(&self, collection: Collection, id: &str, fields: Fields) -> SyncResult<()> {
        self.write("update", collection, |state| {
            let doc = state
                .collections
                .get_mut(&collection)
                .and_then(|docs| docs.iter_mut().find(|doc| doc.id == id))
                .ok_or_else(|| SyncError::NotFound {
                    collection,
                    id: id.to_string(),
                })?;
            doc.fields.extend(fields);
            Ok(())
        })
    }

    fn delete(&self, collection: Collection, id: &str) -> SyncResult<()> {
        self.write("delete", collection, |state| {
            let docs = state.collections.entry(collection).or_default();
            let pos = docs
                .iter()
                .position(|doc| doc.id == id)
                .ok_or_else(|| SyncError::NotFound {
                    collection,
                    id: id.to_string(),
                })?;
            docs.remove(pos);
            Ok(())
        })
    }

    fn set(&self, path: &DocumentPath, fields: Fields) -> SyncResult<()> {
        self.write("set", path.collection, |state| {
            let docs = state.collections.entry(path.collection).or_default();
            match docs.iter_mut().find(|doc| doc.id == path.id) {
                Some(doc) => doc.fields = fields,
                None => docs.push(StoredDocument {
                    id: path.id.clone(),
                    fields,
                }),
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Direction;
    use serde_json::json;
    use std::sync::Mutex as StdMutex;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap_or_default()
    }

    fn recorder() -> (Arc<StdMutex<Vec<Snapshot>>>, SnapshotListener) {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let sink = seen.clone();
        let listener: SnapshotListener = Arc::new(move |snapshot: &Snapshot| {
            sink.lock().unwrap().push(snapshot.clone());
        });
        (seen, listener)
    }

    #[test]
    fn test_ids_are_twenty_alphanumeric_chars() {
        let store = MemoryStore::new();
        let id = store.add(Collection::Books, fields(json!({}))).unwrap();
        assert_eq!(id.len(), ID_LENGTH);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_subscribe_delivers_current_snapshot() {
        let store = MemoryStore::new();
        store.add(Collection::News, fields(json!({"title": "a"}))).unwrap();

        let (seen, listener) = recorder();
        let _subscription = store.subscribe(Query::collection(Collection::News), listener);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].len(), 1);
    }

    #[test]
    fn test_writes_notify_only_matching_collection() {
        let store = MemoryStore::new();
        let (seen, listener) = recorder();
        let _subscription = store.subscribe(Query::collection(Collection::Books), listener);

        store.add(Collection::News, fields(json!({}))).unwrap();
        store.add(Collection::Books, fields(json!({}))).unwrap();

        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_ordered_snapshot() {
        let store = MemoryStore::new();
        store.add(Collection::Notices, fields(json!({"date": "2024-05-18"}))).unwrap();
        store.add(Collection::Notices, fields(json!({"date": "2024-05-20"}))).unwrap();

        let (seen, listener) = recorder();
        let _subscription = store.subscribe(
            Query::collection(Collection::Notices).order_by("date", Direction::Descending),
            listener,
        );

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].documents[0].fields["date"], json!("2024-05-20"));
    }

    #[test]
    fn test_update_merges_and_missing_is_not_found() {
        let store = MemoryStore::new();
        let id = store
            .add(Collection::Books, fields(json!({"title": "t", "isNew": true})))
            .unwrap();

        store
            .update(Collection::Books, &id, fields(json!({"isNew": false})))
            .unwrap();
        let body = store
            .document(&DocumentPath::new(Collection::Books, id))
            .unwrap()
            .unwrap();
        assert_eq!(body["title"], json!("t"));
        assert_eq!(body["isNew"], json!(false));

        let missing = store.update(Collection::Books, "nope", fields(json!({})));
        assert!(matches!(missing, Err(SyncError::NotFound { .. })));
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let store = MemoryStore::new();
        let id = store.add(Collection::Notices, fields(json!({}))).unwrap();
        store.delete(Collection::Notices, &id).unwrap();
        assert!(matches!(
            store.delete(Collection::Notices, &id),
            Err(SyncError::NotFound { .. })
        ));
    }

    #[test]
    fn test_set_creates_then_overwrites() {
        let store = MemoryStore::new();
        let path = DocumentPath::feature();
        store.set(&path, fields(json!({"title": "a", "subtitle": "b"}))).unwrap();
        store.set(&path, fields(json!({"title": "c"}))).unwrap();

        let body = store.document(&path).unwrap().unwrap();
        assert_eq!(body, fields(json!({"title": "c"})));
    }

    #[test]
    fn test_document_subscription() {
        let store = MemoryStore::new();
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let sink = seen.clone();
        let _subscription = store.subscribe_document(
            DocumentPath::feature(),
            Arc::new(move |body: Option<&Fields>| {
                sink.lock().unwrap().push(body.cloned());
            }),
        );

        store
            .set(&DocumentPath::feature(), fields(json!({"title": "x"})))
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].is_none());
        assert_eq!(seen[1], Some(fields(json!({"title": "x"}))));
    }

    #[test]
    fn test_unavailable_rejects_writes() {
        let store = MemoryStore::new();
        store.set_unavailable(true).unwrap();
        let result = store.add(Collection::Books, fields(json!({})));
        assert!(matches!(result, Err(SyncError::WriteRejected { .. })));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_deferred_delivery_waits() {
        let store = MemoryStore::with_delivery(Delivery::Deferred);
        let (seen, listener) = recorder();
        let _subscription = store.subscribe(Query::collection(Collection::Books), listener);
        store.add(Collection::Books, fields(json!({}))).unwrap();

        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(store.pending_count(), 2);
        assert_eq!(store.deliver_pending().unwrap(), 2);
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_unsubscribed_listener_gets_nothing() {
        let store = MemoryStore::with_delivery(Delivery::Deferred);
        let (seen, listener) = recorder();
        let mut subscription = store.subscribe(Query::collection(Collection::Books), listener);
        subscription.unsubscribe();

        store.add(Collection::Books, fields(json!({}))).unwrap();
        assert_eq!(store.deliver_pending().unwrap(), 0);
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(store.subscription_count(), 0);
    }

    #[test]
    fn test_listener_may_write_back() {
        let store = MemoryStore::new();
        let writer = store.clone();
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let sink = seen.clone();
        let _subscription = store.subscribe(
            Query::collection(Collection::Survey),
            Arc::new(move |snapshot: &Snapshot| {
                sink.lock().unwrap().push(snapshot.len());
                if snapshot.is_empty() {
                    writer
                        .add(Collection::Survey, fields(json!({"text": "q"})))
                        .unwrap();
                }
            }),
        );

        assert_eq!(*seen.lock().unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_nested_write_is_delivered_in_order() {
        let store = MemoryStore::new();
        let writer = store.clone();
        let _seeding = store.subscribe(
            Query::collection(Collection::Survey),
            Arc::new(move |snapshot: &Snapshot| {
                if snapshot.is_empty() {
                    writer
                        .add(Collection::Survey, fields(json!({"text": "q"})))
                        .unwrap();
                }
            }),
        );
        let (seen, listener) = recorder();
        let _watching = store.subscribe(Query::collection(Collection::Survey), listener);

        let id = store.documents(Collection::Survey).unwrap()[0].id.clone();
        store.delete(Collection::Survey, &id).unwrap();

        let sizes: Vec<_> = seen.lock().unwrap().iter().map(Snapshot::len).collect();
        assert_eq!(sizes, vec![1, 0, 1]);
        assert_eq!(store.pending_count(), 0);
    }
}
