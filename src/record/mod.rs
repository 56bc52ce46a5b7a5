//! Normalized records - the store's flattened representation of a resource.
//!
//! A record keeps every attribute at the top level and tucks everything
//! else (type, id, relationships, links, meta, resolved relationships and
//! optionally the raw resource) under the reserved `_jv` key:
//!
//! ```ignore
//! {
//!     "name": "sprocket",
//!     "_jv": {
//!         "type": "widget",
//!         "id": "1",
//!         "relationships": { "widgets": { "data": [{ "type": "widget", "id": "2" }] } }
//!     }
//! }
//! ```

mod normalize;
mod outbound;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::resolve::Resolved;
use crate::resource::{RawRelationship, ResourceIdentifier};

pub use normalize::{normalize_resource, Normalization};
pub use outbound::{denormalize, denormalize_many, request_body, request_body_many};

pub(crate) use normalize::normalize_value;

/// Reserved top-level key holding record metadata.
pub const JV_TAG: &str = "_jv";

/// Metadata stored under [`JV_TAG`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMeta {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<String, RawRelationship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    /// Relationships resolved against the store. Never persisted.
    #[serde(default, skip_deserializing, skip_serializing_if = "BTreeMap::is_empty")]
    pub rels: BTreeMap<String, Resolved>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<Value>,
}

/// A normalized record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "_jv")]
    pub jv: RecordMeta,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Record {
    /// An empty record of the given type, not yet persisted.
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            jv: RecordMeta {
                resource_type: resource_type.into(),
                id: None,
                relationships: BTreeMap::new(),
                links: None,
                meta: None,
                rels: BTreeMap::new(),
                json: None,
            },
            attributes: Map::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.jv.id = Some(id.into());
        self
    }

    /// Builder-style attribute setter. The reserved key is ignored.
    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.set(key, value);
        self
    }

    pub fn with_relationship(mut self, name: impl Into<String>, relationship: RawRelationship) -> Self {
        self.jv.relationships.insert(name.into(), relationship);
        self
    }

    pub fn resource_type(&self) -> &str {
        &self.jv.resource_type
    }

    pub fn id(&self) -> Option<&str> {
        self.jv.id.as_deref()
    }

    pub fn identifier(&self) -> ResourceIdentifier {
        ResourceIdentifier {
            resource_type: self.jv.resource_type.clone(),
            id: self.jv.id.clone(),
            meta: None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Set an attribute. Returns `false` (and stores nothing) for the reserved key.
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> bool {
        let key = key.into();
        if key == JV_TAG {
            return false;
        }
        self.attributes.insert(key, value);
        true
    }

    pub fn relationship(&self, name: &str) -> Option<&RawRelationship> {
        self.jv.relationships.get(name)
    }

    /// Resolved relationship, present only after resolution.
    pub fn rel(&self, name: &str) -> Option<&Resolved> {
        self.jv.rels.get(name)
    }

    /// Copy of this record as the store keeps it: no resolved relationships.
    pub fn unresolved(&self) -> Record {
        let mut record = self.clone();
        record.jv.rels.clear();
        record
    }
}

/// A non-fatal condition found while normalizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// An attribute named like the reserved metadata key; the attribute was dropped.
    ReservedKeyCollision {
        resource_type: String,
        id: Option<String>,
        key: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ReservedKeyCollision {
                resource_type,
                id,
                key,
            } => write!(
                f,
                "attribute {} of {}/{} collides with the reserved metadata key and was dropped",
                key,
                resource_type,
                id.as_deref().unwrap_or("-")
            ),
        }
    }
}
