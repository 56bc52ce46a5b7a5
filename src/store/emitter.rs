use std::thread::JoinHandle;

use event_emitter_rs::EventEmitter;

use crate::resource::ResourceIdentifier;

/// Emitted after records were merged or inserted.
pub const MERGED: &str = "records.merged";
/// Emitted after a record was deleted.
pub const DELETED: &str = "records.deleted";

/// Store change notifications for a host state container.
///
/// Attach to a [`SharedStore`](super::SharedStore) with `with_emitter`; every
/// merge and delete then calls the registered listeners with the affected
/// identifiers. Listeners run on their own threads and are joined before the
/// store operation returns.
///
/// Listeners may write to the store they observe (through a clone of the
/// `SharedStore`). Such writes notify again, so a listener must not react to
/// the records it writes itself.
///
/// # Example
///
/// ```ignore
/// use jsonapi_store::{SharedStore, StoreEmitter};
///
/// let mut emitter = StoreEmitter::new();
/// emitter.on_merged(|identifiers| {
///     tracing::info!(count = identifiers.len(), "records added");
/// });
///
/// let store = SharedStore::new().with_emitter(emitter);
/// ```
pub struct StoreEmitter {
    event_emitter: EventEmitter,
}

impl Default for StoreEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreEmitter {
    pub fn new() -> Self {
        Self {
            event_emitter: EventEmitter::new(),
        }
    }

    /// Register a listener for merged (added or replaced) records.
    pub fn on_merged<F>(&mut self, listener: F)
    where
        F: Fn(Vec<ResourceIdentifier>) + Send + Sync + 'static,
    {
        self.on(MERGED, listener);
    }

    /// Register a listener for deleted records.
    pub fn on_deleted<F>(&mut self, listener: F)
    where
        F: Fn(Vec<ResourceIdentifier>) + Send + Sync + 'static,
    {
        self.on(DELETED, listener);
    }

    fn on<F>(&mut self, event: &str, listener: F)
    where
        F: Fn(Vec<ResourceIdentifier>) + Send + Sync + 'static,
    {
        // Payloads travel as (type, id) pairs; merged and deleted records always have ids.
        self.event_emitter.on(event, move |keys: Vec<(String, String)>| {
            listener(
                keys.into_iter()
                    .map(|(resource_type, id)| ResourceIdentifier::new(resource_type, id))
                    .collect(),
            )
        });
    }

    /// Start every listener for `event`. The caller joins the handles, after
    /// releasing whatever lock guards this emitter.
    pub(crate) fn emit(&mut self, event: &str, identifiers: &[ResourceIdentifier]) -> Vec<JoinHandle<()>> {
        let keys: Vec<(String, String)> = identifiers
            .iter()
            .filter_map(|identifier| {
                let id = identifier.id.clone()?;
                Some((identifier.resource_type.clone(), id))
            })
            .collect();
        self.event_emitter.emit(event, keys)
    }
}
