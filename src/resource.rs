//! Wire-format types for JSON:API documents.
//!
//! These mirror the shapes that travel over the transport: resource
//! identifiers, resource objects, relationship objects and the top-level
//! document envelope used for request bodies.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::de::Deserializer;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A `(type, id)` pair identifying one resource.
///
/// `id` is absent for resources that have not been persisted yet. `meta` is
/// the identifier object's own meta member; it travels with the identifier
/// but is not part of its identity, so equality, ordering and hashing only
/// look at `(type, id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl PartialEq for ResourceIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.resource_type == other.resource_type && self.id == other.id
    }
}

impl Eq for ResourceIdentifier {}

impl Hash for ResourceIdentifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.resource_type.hash(state);
        self.id.hash(state);
    }
}

impl PartialOrd for ResourceIdentifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ResourceIdentifier {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.resource_type, &self.id).cmp(&(&other.resource_type, &other.id))
    }
}

impl ResourceIdentifier {
    /// Identifier for a persisted resource.
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: Some(id.into()),
            meta: None,
        }
    }

    /// Identifier for a whole collection (or a resource without an id yet).
    pub fn collection(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: None,
            meta: None,
        }
    }

    /// Request path for this identifier: `/type` or `/type/id`.
    pub fn path(&self) -> String {
        match &self.id {
            Some(id) => format!("/{}/{}", self.resource_type, id),
            None => format!("/{}", self.resource_type),
        }
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{}/{}", self.resource_type, id),
            None => write!(f, "{}", self.resource_type),
        }
    }
}

/// The `data` member of a relationship object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Linkage {
    /// `null`: an empty to-one relationship.
    Null,
    /// `{}`: the relationship exists but carries no related resource.
    Empty,
    /// A single resource identifier.
    One(ResourceIdentifier),
    /// An ordered sequence of resource identifiers.
    Many(Vec<ResourceIdentifier>),
}

impl Linkage {
    /// Identifiers referenced by this linkage, in order.
    pub fn identifiers(&self) -> Vec<&ResourceIdentifier> {
        match self {
            Linkage::Null | Linkage::Empty => Vec::new(),
            Linkage::One(identifier) => vec![identifier],
            Linkage::Many(identifiers) => identifiers.iter().collect(),
        }
    }
}

impl Serialize for Linkage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Linkage::Null => serializer.serialize_none(),
            Linkage::Empty => serializer.serialize_map(Some(0))?.end(),
            Linkage::One(identifier) => identifier.serialize(serializer),
            Linkage::Many(identifiers) => {
                let mut seq = serializer.serialize_seq(Some(identifiers.len()))?;
                for identifier in identifiers {
                    seq.serialize_element(identifier)?;
                }
                seq.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Linkage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        match Value::deserialize(deserializer)? {
            Value::Null => Ok(Linkage::Null),
            Value::Object(map) if map.is_empty() => Ok(Linkage::Empty),
            value @ Value::Object(_) => serde_json::from_value(value)
                .map(Linkage::One)
                .map_err(D::Error::custom),
            value @ Value::Array(_) => serde_json::from_value(value)
                .map(Linkage::Many)
                .map_err(D::Error::custom),
            other => Err(D::Error::custom(format!(
                "relationship data must be null, an object or an array, got {}",
                other
            ))),
        }
    }
}

/// A relationship object: `{ data?, links?, meta? }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRelationship {
    /// `None` when the member is missing; `Some(Linkage::Null)` for `null`.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub data: Option<Linkage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl RawRelationship {
    pub fn with_data(data: Linkage) -> Self {
        Self {
            data: Some(data),
            links: None,
            meta: None,
        }
    }
}

// A present member (even `null`) becomes `Some`; a missing one falls back to
// the field default.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// A resource object as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<String, RawRelationship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl RawResource {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: None,
            attributes: Map::new(),
            relationships: BTreeMap::new(),
            links: None,
            meta: None,
        }
    }

    pub fn identifier(&self) -> ResourceIdentifier {
        ResourceIdentifier {
            resource_type: self.resource_type.clone(),
            id: self.id.clone(),
            meta: None,
        }
    }
}

/// Primary data of a document: one resource or a sequence of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryData {
    Many(Vec<RawResource>),
    One(Box<RawResource>),
}

/// The top-level JSON:API document.
///
/// Used to build outbound request bodies; inbound bodies are normalized
/// straight from their JSON value so the raw payload can be preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PrimaryData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<RawResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
    /// The server's `jsonapi` object (version, ext, profile).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonapi: Option<Value>,
}

impl Document {
    /// `{ "data": resource }`
    pub fn single(resource: RawResource) -> Self {
        Self {
            data: Some(PrimaryData::One(Box::new(resource))),
            ..Self::default()
        }
    }

    /// `{ "data": [resources...] }`
    pub fn many(resources: Vec<RawResource>) -> Self {
        Self {
            data: Some(PrimaryData::Many(resources)),
            ..Self::default()
        }
    }
}
