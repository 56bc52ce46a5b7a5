//! client - fetch and write JSON:API resources through an injected transport.
//!
//! [`JsonApi`] owns a [`Transport`], a [`SharedStore`] and a [`Config`]. A
//! fetch parses its target into an identifier, requests `/type` or
//! `/type/id`, normalizes the response, merges it into the store and then
//! resolves relationships against the updated store. Writes denormalize the
//! caller's record into a `{ "data": ... }` body.
//!
//! ## Example
//!
//! ```ignore
//! use jsonapi_store::{client::JsonApi, Config};
//!
//! let api = JsonApi::new(transport, Config::default().follow_relationships_data(true));
//!
//! let widget = api.get("widget/1").await?;
//! let widgets = api.get_with("widget", options).await?;
//! let saved = api.patch(&edited_widget).await?;
//! ```

mod error;
#[cfg(feature = "http")]
pub mod http;

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::document::{normalize_document, Fetched, Normalized, Primary, RecordSet};
use crate::error::DocumentError;
use crate::record::{request_body, Record};
use crate::resolve::resolve;
use crate::resource::{Document, ResourceIdentifier};
use crate::store::SharedStore;
use crate::target::Target;

pub use error::ClientError;

/// The request client the engine talks through.
///
/// Implementations send the request to `path` (always `/type` or
/// `/type/id`) and return the decoded response body, or `None` for a
/// bodiless response. Non-success responses are errors. `Options` is passed
/// through untouched (query parameters, headers, ...).
pub trait Transport: Send + Sync {
    type Options: Default + Send;
    type Error: std::error::Error + Send + Sync + 'static;

    fn get(
        &self,
        path: &str,
        options: Self::Options,
    ) -> impl Future<Output = Result<Option<Value>, Self::Error>> + Send;

    fn post(
        &self,
        path: &str,
        body: &Document,
        options: Self::Options,
    ) -> impl Future<Output = Result<Option<Value>, Self::Error>> + Send;

    fn patch(
        &self,
        path: &str,
        body: &Document,
        options: Self::Options,
    ) -> impl Future<Output = Result<Option<Value>, Self::Error>> + Send;

    fn delete(
        &self,
        path: &str,
        options: Self::Options,
    ) -> impl Future<Output = Result<Option<Value>, Self::Error>> + Send;
}

type ClientResult<T, E> = Result<T, ClientError<E>>;

/// JSON:API client bound to one store.
pub struct JsonApi<T> {
    transport: T,
    store: SharedStore,
    config: Config,
}

impl<T: Transport> JsonApi<T> {
    /// Create a client with a fresh, empty store.
    pub fn new(transport: T, config: Config) -> Self {
        Self::with_store(transport, SharedStore::new(), config)
    }

    /// Create a client over a store the host already holds.
    pub fn with_store(transport: T, store: SharedStore, config: Config) -> Self {
        Self {
            transport,
            store,
            config,
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch a resource or collection and merge it into the store.
    pub async fn get<'a>(&self, target: impl Into<Target<'a>>) -> ClientResult<Fetched, T::Error> {
        self.get_with(target, T::Options::default()).await
    }

    /// [`get`](Self::get) with transport options.
    #[instrument(skip_all)]
    pub async fn get_with<'a>(
        &self,
        target: impl Into<Target<'a>>,
        options: T::Options,
    ) -> ClientResult<Fetched, T::Error> {
        let identifier = target.into().identifier()?;
        let normalized = self.fetch(&identifier, options).await?;

        self.store.merge(normalized.records())?;
        let snapshot = self.store.snapshot()?;
        Ok(normalized.into_fetched(&snapshot, &self.config))
    }

    /// Fetch without touching the store.
    ///
    /// Relationships still resolve against the store plus the response's
    /// own records.
    pub async fn search<'a>(&self, target: impl Into<Target<'a>>) -> ClientResult<Fetched, T::Error> {
        self.search_with(target, T::Options::default()).await
    }

    #[instrument(skip_all)]
    pub async fn search_with<'a>(
        &self,
        target: impl Into<Target<'a>>,
        options: T::Options,
    ) -> ClientResult<Fetched, T::Error> {
        let identifier = target.into().identifier()?;
        let normalized = self.fetch(&identifier, options).await?;

        let mut view = self.store.snapshot()?;
        view.merge(normalized.records());
        Ok(normalized.into_fetched(&view, &self.config))
    }

    /// Create a resource: `POST /type` with the record as `data`.
    pub async fn post(&self, record: &Record) -> ClientResult<Record, T::Error> {
        self.post_with(record, T::Options::default()).await
    }

    #[instrument(skip_all)]
    pub async fn post_with(&self, record: &Record, options: T::Options) -> ClientResult<Record, T::Error> {
        let path = ResourceIdentifier::collection(record.resource_type()).path();
        debug!(%path, "POST");

        let body = request_body(record);
        let response = self
            .transport
            .post(&path, &body, options)
            .await
            .map_err(|e| failed(&path, e))?;
        self.write_back(response, record)
    }

    /// Update a resource: `PATCH /type/id` with the record as `data`.
    pub async fn patch(&self, record: &Record) -> ClientResult<Record, T::Error> {
        self.patch_with(record, T::Options::default()).await
    }

    #[instrument(skip_all)]
    pub async fn patch_with(&self, record: &Record, options: T::Options) -> ClientResult<Record, T::Error> {
        let identifier = persisted(record.identifier())?;
        let path = identifier.path();
        debug!(%path, "PATCH");

        let body = request_body(record);
        let response = self
            .transport
            .patch(&path, &body, options)
            .await
            .map_err(|e| failed(&path, e))?;
        self.write_back(response, record)
    }

    /// Delete a resource: `DELETE /type/id`, then drop it from the store.
    ///
    /// Returns the record the store held, if any.
    pub async fn delete<'a>(
        &self,
        target: impl Into<Target<'a>>,
    ) -> ClientResult<Option<Arc<Record>>, T::Error> {
        self.delete_with(target, T::Options::default()).await
    }

    #[instrument(skip_all)]
    pub async fn delete_with<'a>(
        &self,
        target: impl Into<Target<'a>>,
        options: T::Options,
    ) -> ClientResult<Option<Arc<Record>>, T::Error> {
        let identifier = persisted(target.into().identifier()?)?;
        let path = identifier.path();
        debug!(%path, "DELETE");

        self.transport
            .delete(&path, options)
            .await
            .map_err(|e| failed(&path, e))?;

        let id = identifier.id.as_deref().unwrap_or_default();
        Ok(self.store.delete(&identifier.resource_type, id)?)
    }

    /// Read a record (or a whole type) back from the store, resolved per
    /// configuration. No request is made.
    pub fn stored<'a>(&self, target: impl Into<Target<'a>>) -> ClientResult<Option<Fetched>, T::Error> {
        let identifier = target.into().identifier()?;
        let snapshot = self.store.snapshot()?;

        let fetched = match &identifier.id {
            Some(id) => snapshot
                .get(&identifier.resource_type, id)
                .map(|record| Fetched::Record {
                    record: resolve(record, &snapshot, &self.config),
                    json: None,
                }),
            None => snapshot.collection(&identifier.resource_type).map(|records| {
                Fetched::Collection(RecordSet {
                    records: records
                        .iter()
                        .map(|(id, record)| (id.clone(), resolve(record, &snapshot, &self.config)))
                        .collect(),
                    json: None,
                })
            }),
        };
        Ok(fetched)
    }

    async fn fetch(
        &self,
        identifier: &ResourceIdentifier,
        options: T::Options,
    ) -> ClientResult<Normalized, T::Error> {
        let path = identifier.path();
        debug!(%path, "GET");

        let body = self
            .transport
            .get(&path, options)
            .await
            .map_err(|e| failed(&path, e))?
            .ok_or_else(|| DocumentError::Malformed("empty response body".into()))?;
        Ok(normalize_document(&body, &self.config)?)
    }

    // Merge what the server sent back; fall back to the caller's record when
    // the response carries no primary data (e.g. 204 No Content). The shape
    // is checked before anything reaches the store.
    fn write_back(&self, response: Option<Value>, local: &Record) -> ClientResult<Record, T::Error> {
        if let Some(body) = response {
            let normalized = normalize_document(&body, &self.config)?;
            match normalized.primary() {
                Primary::Many(_) => return Err(ClientError::UnexpectedCollection),
                Primary::None => {}
                Primary::One(_) => {
                    self.store.merge(normalized.records())?;
                    let snapshot = self.store.snapshot()?;
                    return single(normalized.into_fetched(&snapshot, &self.config));
                }
            }
        }

        persisted(local.identifier())?;
        let record = local.unresolved();
        self.store.insert(record.clone())?;
        let snapshot = self.store.snapshot()?;
        Ok(resolve(&record, &snapshot, &self.config))
    }
}

fn persisted<E>(identifier: ResourceIdentifier) -> ClientResult<ResourceIdentifier, E> {
    if identifier.id.is_none() {
        return Err(ClientError::MissingId {
            resource_type: identifier.resource_type,
        });
    }
    Ok(identifier)
}

fn single<E>(fetched: Fetched) -> ClientResult<Record, E> {
    match fetched {
        Fetched::Record { record, .. } => Ok(record),
        Fetched::Collection(_) => Err(ClientError::UnexpectedCollection),
    }
}

fn failed<E: std::fmt::Display>(path: &str, error: E) -> ClientError<E> {
    warn!(%path, %error, "request failed");
    ClientError::Transport(error)
}
