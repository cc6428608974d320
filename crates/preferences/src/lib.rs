//! Device-local preferences for OctLib
//!
//! State that belongs to one visitor's device and is never sent to the
//! shared store: the reserved-book set, the wish list, and the markers
//! recording which collections this device has already seeded.
//!
//! # Example
//!
//! ```rust
//! use octlib_preferences::{IdSet, MemoryKeyValueStore};
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryKeyValueStore::new());
//! let mut reserved = IdSet::reserved(store);
//! reserved.toggle("1");
//! assert!(reserved.contains("1"));
//! ```

mod cell;
mod error;
mod id_set;
mod store;

pub use cell::PersistentCell;
pub use error::{PreferenceError, PreferenceResult};
pub use id_set::{IdSet, RESERVED_KEY, WANT_TO_READ_KEY};
pub use store::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
