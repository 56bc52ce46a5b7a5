//! SharedStore - clone-friendly handle to one process-wide store.

use std::sync::{Arc, RwLock};

#[cfg(feature = "emitter")]
use std::sync::Mutex;

use super::{Collection, RecordMap, Store, StoreError};
use crate::record::Record;
use crate::resource::ResourceIdentifier;

#[cfg(feature = "emitter")]
use super::StoreEmitter;
#[cfg(feature = "emitter")]
use tracing::warn;

/// A [`Store`] behind `Arc<RwLock<..>>`. Clones share the same records.
///
/// Readers get `Arc<Record>` handles or a cheap [`Store`] snapshot; writes go
/// through [`merge`](Self::merge), [`insert`](Self::insert) and
/// [`delete`](Self::delete) and notify the attached [`StoreEmitter`], if any.
#[derive(Clone, Default)]
pub struct SharedStore {
    storage: Arc<RwLock<Store>>,
    #[cfg(feature = "emitter")]
    emitter: Option<Arc<Mutex<StoreEmitter>>>,
}

impl SharedStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Share an existing store.
    pub fn from_store(store: Store) -> Self {
        Self {
            storage: Arc::new(RwLock::new(store)),
            #[cfg(feature = "emitter")]
            emitter: None,
        }
    }

    /// Notify `emitter` after every mutation.
    #[cfg(feature = "emitter")]
    pub fn with_emitter(mut self, emitter: StoreEmitter) -> Self {
        self.emitter = Some(Arc::new(Mutex::new(emitter)));
        self
    }

    /// Run `f` against the current store under the read lock.
    pub fn read<T>(&self, f: impl FnOnce(&Store) -> T) -> Result<T, StoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        Ok(f(&storage))
    }

    pub fn get(&self, resource_type: &str, id: &str) -> Result<Option<Arc<Record>>, StoreError> {
        self.read(|store| store.get(resource_type, id).cloned())
    }

    /// All records of one type; empty if none are stored.
    pub fn collection(&self, resource_type: &str) -> Result<Collection, StoreError> {
        self.read(|store| store.collection(resource_type).cloned().unwrap_or_default())
    }

    /// Point-in-time copy. Records are shared, not duplicated.
    pub fn snapshot(&self) -> Result<Store, StoreError> {
        self.read(Store::clone)
    }

    pub fn merge(&self, incoming: &RecordMap) -> Result<Vec<ResourceIdentifier>, StoreError> {
        let merged = {
            let mut storage = self
                .storage
                .write()
                .map_err(|_| StoreError::LockPoisoned("merge"))?;
            storage.merge(incoming)
        };
        self.notify_merged(&merged)?;
        Ok(merged)
    }

    pub fn insert(&self, record: Record) -> Result<Option<Arc<Record>>, StoreError> {
        let identifier = record.identifier();
        let replaced = {
            let mut storage = self
                .storage
                .write()
                .map_err(|_| StoreError::LockPoisoned("insert"))?;
            storage.insert(record)?
        };
        self.notify_merged(&[identifier])?;
        Ok(replaced)
    }

    pub fn delete(&self, resource_type: &str, id: &str) -> Result<Option<Arc<Record>>, StoreError> {
        let removed = {
            let mut storage = self
                .storage
                .write()
                .map_err(|_| StoreError::LockPoisoned("delete"))?;
            storage.delete(resource_type, id)
        };
        if removed.is_some() {
            self.notify_deleted(&[ResourceIdentifier::new(resource_type, id)])?;
        }
        Ok(removed)
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        self.read(Store::len)
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        self.read(Store::is_empty)
    }

    #[cfg(feature = "emitter")]
    fn notify_merged(&self, identifiers: &[ResourceIdentifier]) -> Result<(), StoreError> {
        self.notify(super::MERGED, identifiers)
    }

    #[cfg(feature = "emitter")]
    fn notify_deleted(&self, identifiers: &[ResourceIdentifier]) -> Result<(), StoreError> {
        self.notify(super::DELETED, identifiers)
    }

    #[cfg(feature = "emitter")]
    fn notify(&self, event: &str, identifiers: &[ResourceIdentifier]) -> Result<(), StoreError> {
        let Some(emitter) = &self.emitter else {
            return Ok(());
        };
        // The guard is dropped before joining: a listener that writes to
        // this store needs the emitter again.
        let handles = emitter
            .lock()
            .map_err(|_| StoreError::LockPoisoned("emit"))?
            .emit(event, identifiers);
        for handle in handles {
            if handle.join().is_err() {
                warn!(event, "store listener panicked");
            }
        }
        Ok(())
    }

    #[cfg(not(feature = "emitter"))]
    fn notify_merged(&self, _identifiers: &[ResourceIdentifier]) -> Result<(), StoreError> {
        Ok(())
    }

    #[cfg(not(feature = "emitter"))]
    fn notify_deleted(&self, _identifiers: &[ResourceIdentifier]) -> Result<(), StoreError> {
        Ok(())
    }
}
