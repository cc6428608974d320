// crates/sync-engine/src/store/mod.rs
//! The document store boundary
//!
//! A store holds named collections of JSON documents. Readers never poll:
//! they subscribe and receive a full snapshot whenever something they watch
//! changes. Writers address single documents and get no data back beyond a
//! new id; the effect of a write is only observed through the next snapshot.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::{Delivery, MemoryStore};

use crate::error::SyncResult;
use octlib_core::{Collection, Fields, FEATURE_DOC_ID};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// One document as delivered in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub fields: Fields,
}

/// Full contents of a subscribed collection at one point in time
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub collection: Collection,
    pub documents: Vec<StoredDocument>,
}

impl Snapshot {
    pub fn new(collection: Collection, documents: Vec<StoredDocument>) -> Self {
        Self {
            collection,
            documents,
        }
    }

    pub fn empty(collection: Collection) -> Self {
        Self::new(collection, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Sort key of a collection query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

impl OrderBy {
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Sorts documents by the field's JSON value. Strings compare
    /// lexicographically, numbers numerically, and a missing field sorts
    /// first when ascending. Ties keep their store order.
    pub fn sort(&self, documents: &mut [StoredDocument]) {
        documents.sort_by(|a, b| {
            let ordering = compare_values(a.fields.get(&self.field), b.fields.get(&self.field));
            match self.direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            }
        });
    }
}

fn type_rank(value: &serde_json::Value) -> u8 {
    match value {
        serde_json::Value::Null => 0,
        serde_json::Value::Bool(_) => 1,
        serde_json::Value::Number(_) => 2,
        serde_json::Value::String(_) => 3,
        serde_json::Value::Array(_) => 4,
        serde_json::Value::Object(_) => 5,
    }
}

fn compare_values(a: Option<&serde_json::Value>, b: Option<&serde_json::Value>) -> Ordering {
    use serde_json::Value;

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => type_rank(x).cmp(&type_rank(y)),
    }
}

/// A collection subscription request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub collection: Collection,
    pub order_by: Option<OrderBy>,
}

impl Query {
    pub fn collection(collection: Collection) -> Self {
        Self {
            collection,
            order_by: None,
        }
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy::new(field, direction));
        self
    }
}

/// Address of a single document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    pub collection: Collection,
    pub id: String,
}

impl DocumentPath {
    pub fn new(collection: Collection, id: impl Into<String>) -> Self {
        Self {
            collection,
            id: id.into(),
        }
    }

    /// `features/current_feature`
    pub fn feature() -> Self {
        Self::new(Collection::Features, FEATURE_DOC_ID)
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// Receives collection snapshots
pub type SnapshotListener = Arc<dyn Fn(&Snapshot) + Send + Sync>;

/// Receives the body of a single document, or `None` when it does not exist
pub type DocumentListener = Arc<dyn Fn(Option<&Fields>) + Send + Sync>;

/// Revocable handle on a live subscription.
///
/// Dropping the handle revokes the subscription.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Stops delivery. Calling it again does nothing.
    pub fn unsubscribe(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// A realtime document database
pub trait DocumentStore: Send + Sync {
    /// Watches a collection. The current snapshot is delivered right away,
    /// then again after every write to the collection.
    fn subscribe(&self, query: Query, listener: SnapshotListener) -> Subscription;

    /// Watches a single document, with the same delivery rules
    fn subscribe_document(&self, path: DocumentPath, listener: DocumentListener) -> Subscription;

    /// Creates a document with a store-assigned id and returns the id
    fn add(&self, collection: Collection, fields: Fields) -> SyncResult<String>;

    /// Merges `fields` into an existing document
    fn update(&self, collection: Collection, id: &str, fields: Fields) -> SyncResult<()>;

    /// Removes an existing document
    fn delete(&self, collection: Collection, id: &str) -> SyncResult<()>;

    /// Overwrites a document, creating it if absent
    fn set(&self, path: &DocumentPath, fields: Fields) -> SyncResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    fn doc(id: &str, body: serde_json::Value) -> StoredDocument {
        StoredDocument {
            id: id.to_string(),
            fields: body.as_object().cloned().unwrap_or_default(),
        }
    }

    fn ids(documents: &[StoredDocument]) -> Vec<&str> {
        documents.iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn test_sort_descending_dates() {
        let mut documents = vec![
            doc("a", json!({"date": "2024-05-13"})),
            doc("b", json!({"date": "2024-05-27"})),
            doc("c", json!({"date": "2024-05-20"})),
        ];
        OrderBy::new("date", Direction::Descending).sort(&mut documents);
        assert_eq!(ids(&documents), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_sort_missing_first_and_stable_ties() {
        let mut documents = vec![
            doc("a", json!({"n": 2})),
            doc("b", json!({})),
            doc("c", json!({"n": 1})),
            doc("d", json!({"n": 2})),
        ];
        OrderBy::new("n", Direction::Ascending).sort(&mut documents);
        assert_eq!(ids(&documents), vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn test_numbers_compare_numerically() {
        let mut documents = vec![doc("a", json!({"n": 10})), doc("b", json!({"n": 9}))];
        OrderBy::new("n", Direction::Ascending).sort(&mut documents);
        assert_eq!(ids(&documents), vec!["b", "a"]);
    }

    #[test]
    fn test_feature_path() {
        assert_eq!(DocumentPath::feature().to_string(), "features/current_feature");
    }

    #[test]
    fn test_subscription_cancels_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut subscription = Subscription::new(move || {
            counter.fetch_add(1, AtomicOrdering::SeqCst);
        });

        assert!(subscription.is_active());
        subscription.unsubscribe();
        subscription.unsubscribe();
        drop(subscription);
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn test_subscription_cancels_on_drop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        drop(Subscription::new(move || {
            counter.fetch_add(1, AtomicOrdering::SeqCst);
        }));
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 1);
    }
}
