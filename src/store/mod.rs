//! Store - normalized records keyed by type, then id.
//!
//! [`Store`] is a plain value the host owns and passes by reference; merge,
//! insert and delete are the only mutations. [`SharedStore`] wraps one in
//! `Arc<RwLock<..>>` for the async client and for hosts that share it.
//!
//! ## Example
//!
//! ```ignore
//! use jsonapi_store::{normalize_document, Config, Store};
//!
//! let normalized = normalize_document(&body, &Config::default())?;
//! let mut store = Store::new();
//! store.merge(normalized.records());
//! let widget = store.get("widget", "1");
//! ```

#[cfg(feature = "emitter")]
mod emitter;
mod shared;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::record::Record;
use crate::resource::ResourceIdentifier;

#[cfg(feature = "emitter")]
pub use emitter::{StoreEmitter, DELETED, MERGED};
pub use shared::SharedStore;

/// Freshly normalized records, keyed by type then id.
pub type RecordMap = BTreeMap<String, BTreeMap<String, Record>>;

/// The records of one type.
pub type Collection = BTreeMap<String, Arc<Record>>;

/// Error type for store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A lock guarding shared store state was poisoned.
    LockPoisoned(&'static str),
    /// Records are keyed by id; this one has none.
    MissingId { resource_type: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::LockPoisoned(operation) => {
                write!(f, "store lock poisoned during {}", operation)
            }
            StoreError::MissingId { resource_type } => {
                write!(f, "cannot store a {} record without an id", resource_type)
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Owned map of `type -> id -> record`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Store {
    records: BTreeMap<String, Collection>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, resource_type: &str, id: &str) -> Option<&Arc<Record>> {
        self.records.get(resource_type)?.get(id)
    }

    pub fn collection(&self, resource_type: &str) -> Option<&Collection> {
        self.records.get(resource_type)
    }

    pub fn contains(&self, identifier: &ResourceIdentifier) -> bool {
        identifier
            .id
            .as_deref()
            .is_some_and(|id| self.get(&identifier.resource_type, id).is_some())
    }

    /// Apply freshly normalized records, replacing each `(type, id)` wholesale.
    ///
    /// Records not named in `incoming` are left alone. Returns the merged
    /// identifiers.
    pub fn merge(&mut self, incoming: &RecordMap) -> Vec<ResourceIdentifier> {
        let mut merged = Vec::new();
        for (resource_type, records) in incoming {
            let collection = self.records.entry(resource_type.clone()).or_default();
            for (id, record) in records {
                collection.insert(id.clone(), Arc::new(record.unresolved()));
                merged.push(ResourceIdentifier::new(resource_type.clone(), id.clone()));
            }
        }
        debug!(count = merged.len(), "merged records");
        merged
    }

    /// Insert or replace a single record. Returns the record it replaced.
    pub fn insert(&mut self, record: Record) -> Result<Option<Arc<Record>>, StoreError> {
        let id = record
            .jv
            .id
            .clone()
            .ok_or_else(|| StoreError::MissingId {
                resource_type: record.jv.resource_type.clone(),
            })?;
        let collection = self.records.entry(record.jv.resource_type.clone()).or_default();
        Ok(collection.insert(id, Arc::new(record.unresolved())))
    }

    /// Remove a record. Returns it if it existed.
    pub fn delete(&mut self, resource_type: &str, id: &str) -> Option<Arc<Record>> {
        let collection = self.records.get_mut(resource_type)?;
        let removed = collection.remove(id);
        if collection.is_empty() {
            self.records.remove(resource_type);
        }
        removed
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Total number of records across all types.
    pub fn len(&self) -> usize {
        self.records.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
