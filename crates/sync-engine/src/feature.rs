// crates/sync-engine/src/feature.rs
//! Keeps the monthly feature singleton mirrored from the store

use crate::error::SyncError;
use crate::store::{DocumentPath, DocumentStore, Subscription};
use octlib_core::{Fields, MonthlyFeature};
use std::sync::{Arc, RwLock, Weak};

/// What a feature document update did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureOutcome {
    /// State replaced with the stored feature
    Replaced,
    /// Document was missing and the default was written
    Created,
    /// State kept as it was
    Kept,
}

fn apply(
    state: &RwLock<MonthlyFeature>,
    default: &MonthlyFeature,
    store: Option<&dyn DocumentStore>,
    body: Option<&Fields>,
) -> FeatureOutcome {
    let path = DocumentPath::feature();

    match body {
        Some(fields) => match MonthlyFeature::from_fields(fields) {
            Ok(feature) => {
                *state.write().unwrap_or_else(|e| e.into_inner()) = feature;
                log::debug!("Applied {}", path);
                FeatureOutcome::Replaced
            }
            Err(e) => {
                log::warn!("Ignoring unreadable {}: {}", path, e);
                FeatureOutcome::Kept
            }
        },
        None => {
            let Some(store) = store else {
                return FeatureOutcome::Kept;
            };
            log::info!("{} is missing, writing the default feature", path);
            let written = default
                .to_fields()
                .map_err(SyncError::from)
                .and_then(|fields| store.set(&path, fields));
            match written {
                Ok(()) => FeatureOutcome::Created,
                Err(e) => {
                    log::warn!("Failed to create {}: {}", path, e);
                    FeatureOutcome::Kept
                }
            }
        }
    }
}

/// Mirrors `features/current_feature`.
///
/// Starts out holding the default feature. When the store reports the
/// document missing, the default is written back; state only changes
/// when that write comes back as a snapshot.
pub struct FeatureSynchronizer {
    store: Option<Arc<dyn DocumentStore>>,
    default: Arc<MonthlyFeature>,
    state: Arc<RwLock<MonthlyFeature>>,
    subscription: Option<Subscription>,
}

impl FeatureSynchronizer {
    pub fn new(store: Arc<dyn DocumentStore>, default: MonthlyFeature) -> Self {
        Self {
            store: Some(store),
            state: Arc::new(RwLock::new(default.clone())),
            default: Arc::new(default),
            subscription: None,
        }
    }

    pub fn offline(default: MonthlyFeature) -> Self {
        Self {
            store: None,
            state: Arc::new(RwLock::new(default.clone())),
            default: Arc::new(default),
            subscription: None,
        }
    }

    /// Starts listening. Does nothing if already subscribed or offline.
    pub fn subscribe(&mut self) {
        if self.subscription.is_some() {
            log::debug!("Already subscribed to {}", DocumentPath::feature());
            return;
        }
        let Some(store) = self.store.clone() else {
            log::warn!("No store, {} will not be subscribed", DocumentPath::feature());
            return;
        };

        let state: Weak<RwLock<MonthlyFeature>> = Arc::downgrade(&self.state);
        let weak_store: Weak<dyn DocumentStore> = Arc::downgrade(&store);
        let default = self.default.clone();

        log::info!("Subscribing to {}", DocumentPath::feature());
        let subscription = store.subscribe_document(
            DocumentPath::feature(),
            Arc::new(move |body: Option<&Fields>| {
                let Some(state) = state.upgrade() else {
                    return;
                };
                let store = weak_store.upgrade();
                apply(&state, &default, store.as_deref(), body);
            }),
        );
        self.subscription = Some(subscription);
    }

    pub fn unsubscribe(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.unsubscribe();
            log::info!("Unsubscribed from {}", DocumentPath::feature());
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Applies a document body exactly as the live listener would
    pub fn apply_document(&self, body: Option<&Fields>) -> FeatureOutcome {
        apply(&self.state, &self.default, self.store.as_deref(), body)
    }

    pub fn load_fallback(&self, feature: MonthlyFeature) {
        log::info!("Showing the built-in feature");
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = feature;
    }

    /// Copy of the current feature
    pub fn current(&self) -> MonthlyFeature {
        self.state.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Drop for FeatureSynchronizer {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
