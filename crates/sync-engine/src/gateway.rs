// crates/sync-engine/src/gateway.rs
//! The single path by which admin edits reach the store

use crate::error::{SyncError, SyncResult};
use crate::store::{DocumentPath, DocumentStore};
use octlib_core::{Collection, Document, Fields, MonthlyFeature, Patch, Validator};
use std::sync::Arc;

/// Question asked before every delete
pub const DELETE_PROMPT: &str = "本当に削除しますか？";

/// Asks the user to confirm a destructive action
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Result of a confirmed or declined delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The document was already gone; nothing to do
    AlreadyDeleted,
    /// The user declined; nothing was sent
    Cancelled,
}

/// Translates admin edits into store writes.
///
/// Writes are fire-and-forget from the caller's point of view: the edited
/// data shows up through the synchronizers' next snapshot, never through
/// a return value. A failed write is reported once and never retried.
#[derive(Clone)]
pub struct MutationGateway {
    store: Option<Arc<dyn DocumentStore>>,
}

impl MutationGateway {
    pub fn new(store: Option<Arc<dyn DocumentStore>>) -> Self {
        Self { store }
    }

    pub fn connected(store: Arc<dyn DocumentStore>) -> Self {
        Self::new(Some(store))
    }

    /// A gateway whose every operation fails with [`SyncError::StoreUnavailable`]
    pub fn disconnected() -> Self {
        Self::new(None)
    }

    pub fn is_connected(&self) -> bool {
        self.store.is_some()
    }

    fn store(&self, operation: &str) -> SyncResult<&dyn DocumentStore> {
        match self.store.as_deref() {
            Some(store) => Ok(store),
            None => {
                log::warn!("Cannot {} without a store connection", operation);
                Err(SyncError::disconnected())
            }
        }
    }

    /// Creates a document from a raw body; the body is not checked
    pub fn add_fields(&self, collection: Collection, fields: Fields) -> SyncResult<String> {
        let store = self.store("add")?;
        let id = store
            .add(collection, fields)
            .map_err(|e| rejected("add", collection, e))?;
        log::info!("Added {}/{}", collection, id);
        Ok(id)
    }

    /// Creates a document from an entity. The entity's id is ignored.
    pub fn add_entity<T: Document>(&self, entity: &T) -> SyncResult<String> {
        self.store("add")?;
        let fields = entity.to_fields()?;
        self.add_fields(T::COLLECTION, fields)
    }

    /// Merges a raw partial body into an existing document
    pub fn update_fields(&self, collection: Collection, id: &str, fields: Fields) -> SyncResult<()> {
        let store = self.store("update")?;
        store
            .update(collection, id, fields)
            .map_err(|e| rejected("update", collection, e))?;
        log::info!("Updated {}/{}", collection, id);
        Ok(())
    }

    /// Validates a typed partial update, then merges it
    pub fn update<P: Patch>(&self, id: &str, patch: &P) -> SyncResult<()> {
        self.store("update")?;
        patch.validate().map_err(SyncError::InvalidPatch)?;
        let fields = patch.to_fields()?;
        self.update_fields(<P::Target as Document>::COLLECTION, id, fields)
    }

    /// Deletes a document once the user confirms.
    ///
    /// Deleting a document that no longer exists is not an error.
    pub fn delete(
        &self,
        collection: Collection,
        id: &str,
        confirm: &dyn Confirm,
    ) -> SyncResult<DeleteOutcome> {
        let store = self.store("delete")?;

        if !confirm.confirm(DELETE_PROMPT) {
            log::debug!("Delete of {}/{} declined", collection, id);
            return Ok(DeleteOutcome::Cancelled);
        }

        match store.delete(collection, id) {
            Ok(()) => {
                log::info!("Deleted {}/{}", collection, id);
                Ok(DeleteOutcome::Deleted)
            }
            Err(SyncError::NotFound { .. }) => {
                log::info!("{}/{} was already deleted", collection, id);
                Ok(DeleteOutcome::AlreadyDeleted)
            }
            Err(e) => Err(rejected("delete", collection, e)),
        }
    }

    /// Overwrites the monthly feature document. A feature without a title
    /// is refused before anything is written.
    pub fn replace_feature(&self, feature: &MonthlyFeature) -> SyncResult<()> {
        let store = self.store("replace")?;
        feature.validate().map_err(SyncError::InvalidPatch)?;
        let fields = feature.to_fields()?;
        store
            .set(&DocumentPath::feature(), fields)
            .map_err(|e| rejected("replace", MonthlyFeature::COLLECTION, e))?;
        log::info!("Replaced {}", DocumentPath::feature());
        Ok(())
    }
}

fn rejected(operation: &'static str, collection: Collection, err: SyncError) -> SyncError {
    let err = match err {
        SyncError::WriteRejected { .. } | SyncError::StoreUnavailable(_) => err,
        other => SyncError::WriteRejected {
            operation,
            collection,
            reason: other.to_string(),
        },
    };
    log::warn!("{}", err);
    err
}
