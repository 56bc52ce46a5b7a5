//! Relationship resolution against the store.
//!
//! Resolution is a read-only projection: the store is never touched, and a
//! resolved relationship points at the store's own `Arc<Record>` rather than
//! a copy of it.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::Serialize;

use crate::config::Config;
use crate::record::Record;
use crate::resource::{Linkage, ResourceIdentifier};
use crate::store::Store;

/// One related resource after resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Related {
    /// The store's record for the identifier.
    Record(Arc<Record>),
    /// Not in the store; left as its identifier.
    Unresolved(ResourceIdentifier),
}

impl Related {
    pub fn identifier(&self) -> ResourceIdentifier {
        match self {
            Related::Record(record) => record.identifier(),
            Related::Unresolved(identifier) => identifier.clone(),
        }
    }

    pub fn record(&self) -> Option<&Arc<Record>> {
        match self {
            Related::Record(record) => Some(record),
            Related::Unresolved(_) => None,
        }
    }
}

impl Serialize for Related {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Related::Record(record) => record.as_ref().serialize(serializer),
            Related::Unresolved(identifier) => identifier.serialize(serializer),
        }
    }
}

/// A relationship after resolution, mirroring the shape of its linkage.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Null,
    Empty,
    One(Related),
    Many(Vec<Related>),
}

impl Resolved {
    /// Reduce back to bare identifiers.
    pub fn to_linkage(&self) -> Linkage {
        match self {
            Resolved::Null => Linkage::Null,
            Resolved::Empty => Linkage::Empty,
            Resolved::One(related) => Linkage::One(related.identifier()),
            Resolved::Many(related) => Linkage::Many(related.iter().map(Related::identifier).collect()),
        }
    }

    /// Resolved records, skipping identifiers that were not found.
    pub fn records(&self) -> Vec<&Arc<Record>> {
        match self {
            Resolved::Null | Resolved::Empty => Vec::new(),
            Resolved::One(related) => related.record().into_iter().collect(),
            Resolved::Many(related) => related.iter().filter_map(Related::record).collect(),
        }
    }
}

impl Serialize for Resolved {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Resolved::Null => serializer.serialize_none(),
            Resolved::Empty => serializer.serialize_map(Some(0))?.end(),
            Resolved::One(related) => related.serialize(serializer),
            Resolved::Many(related) => {
                let mut seq = serializer.serialize_seq(Some(related.len()))?;
                for item in related {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

/// Resolve a record's relationships against `store`.
///
/// Returns the record unchanged unless `follow_relationships_data` is set.
/// Otherwise `_jv.rels` gets one entry per relationship that carries `data`;
/// the descriptors under `_jv.relationships` are left as they are.
pub fn resolve(record: &Record, store: &Store, config: &Config) -> Record {
    let mut resolved = record.clone();
    if config.follow_relationships_data {
        resolved.jv.rels = resolve_relationships(record, store);
    }
    resolved
}

fn resolve_relationships(record: &Record, store: &Store) -> BTreeMap<String, Resolved> {
    record
        .jv
        .relationships
        .iter()
        .filter_map(|(name, relationship)| {
            let data = relationship.data.as_ref()?;
            Some((name.clone(), resolve_linkage(data, store)))
        })
        .collect()
}

fn resolve_linkage(linkage: &Linkage, store: &Store) -> Resolved {
    match linkage {
        Linkage::Null => Resolved::Null,
        Linkage::Empty => Resolved::Empty,
        Linkage::One(identifier) => Resolved::One(lookup(identifier, store)),
        Linkage::Many(identifiers) => {
            Resolved::Many(identifiers.iter().map(|identifier| lookup(identifier, store)).collect())
        }
    }
}

fn lookup(identifier: &ResourceIdentifier, store: &Store) -> Related {
    identifier
        .id
        .as_deref()
        .and_then(|id| store.get(&identifier.resource_type, id))
        .map(|record| Related::Record(Arc::clone(record)))
        .unwrap_or_else(|| Related::Unresolved(identifier.clone()))
}
