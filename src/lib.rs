//! JSON:API normalization for client-side state.
//!
//! Documents come in through [`normalize_document`], land in a [`Store`]
//! keyed by type and id, optionally get their relationships [`resolve`]d
//! against that store, and go back out through [`denormalize`] /
//! [`request_body`]. The [`client`] module wires those steps around an
//! injected [`Transport`](client::Transport).

pub mod client;
mod config;
mod document;
mod error;
mod record;
mod resolve;
mod resource;
mod store;
mod target;

pub use config::{Config, ConfigError};
pub use document::{normalize_document, Fetched, Normalized, Primary, RecordSet};
pub use error::{DocumentError, TargetError};
pub use record::{
    denormalize, denormalize_many, normalize_resource, request_body, request_body_many, Diagnostic,
    Normalization, Record, RecordMeta, JV_TAG,
};
pub use resolve::{resolve, Related, Resolved};
pub use resource::{Document, Linkage, PrimaryData, RawRelationship, RawResource, ResourceIdentifier};
pub use store::{Collection, RecordMap, SharedStore, Store, StoreError};
#[cfg(feature = "emitter")]
pub use store::{StoreEmitter, DELETED, MERGED};
pub use target::{parse_path, Target};

pub use client::{ClientError, JsonApi, Transport};
