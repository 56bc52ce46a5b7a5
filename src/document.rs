//! Document normalization: a whole JSON:API response body into records.

use std::collections::BTreeMap;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::Config;
use crate::error::DocumentError;
use crate::record::{normalize_value, Diagnostic, Record, JV_TAG};
use crate::resolve::resolve;
use crate::resource::ResourceIdentifier;
use crate::store::{RecordMap, Store};

/// Primary data of a normalized document.
#[derive(Debug, Clone, PartialEq)]
pub enum Primary {
    /// No `data` (a meta-only document, or `data: null`).
    None,
    One(Record),
    Many(Vec<Record>),
}

/// A normalized document: every resource keyed by type and id, plus what
/// the caller asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    records: RecordMap,
    primary: Primary,
    diagnostics: Vec<Diagnostic>,
    json: Option<Value>,
}

impl Normalized {
    /// Primary and included records, keyed by type then id.
    pub fn records(&self) -> &RecordMap {
        &self.records
    }

    pub fn primary(&self) -> &Primary {
        &self.primary
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The whole response body, kept when `preserve_json` is set.
    pub fn json(&self) -> Option<&Value> {
        self.json.as_ref()
    }

    pub fn len(&self) -> usize {
        self.records.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build the caller-facing result, resolving relationships against
    /// `store` when `follow_relationships_data` is set.
    ///
    /// `store` should already contain this document's records so that
    /// side-loaded resources resolve.
    pub fn into_fetched(self, store: &Store, config: &Config) -> Fetched {
        match self.primary {
            Primary::One(record) => Fetched::Record {
                record: resolve(&record, store, config),
                json: self.json,
            },
            Primary::Many(records) => Fetched::Collection(RecordSet {
                records: records
                    .iter()
                    .filter_map(|record| {
                        let id = record.id()?.to_string();
                        Some((id, resolve(record, store, config)))
                    })
                    .collect(),
                json: self.json,
            }),
            Primary::None => Fetched::Collection(RecordSet {
                records: BTreeMap::new(),
                json: self.json,
            }),
        }
    }
}

/// Normalize a JSON:API response body.
///
/// The body must be an object with `data` and/or `meta`. Primary data may be
/// a single resource or an array; `included` resources of any type land in
/// the same mapping. Every inbound resource must have an `id`. When a
/// resource appears both as primary data and in `included`, the primary copy
/// is kept.
pub fn normalize_document(body: &Value, config: &Config) -> Result<Normalized, DocumentError> {
    let document = body
        .as_object()
        .ok_or_else(|| DocumentError::Malformed(format!("expected an object, got {}", kind(body))))?;

    if !document.contains_key("data") && !document.contains_key("meta") {
        return Err(DocumentError::Malformed(
            "document has neither data nor meta".into(),
        ));
    }

    let mut records = RecordMap::new();
    let mut diagnostics = Vec::new();

    let primary = match document.get("data") {
        None | Some(Value::Null) => Primary::None,
        Some(Value::Array(resources)) => {
            let mut primary = Vec::with_capacity(resources.len());
            for resource in resources {
                let record = normalize_inbound(resource, config, &mut diagnostics)?;
                insert(&mut records, record.clone(), true);
                primary.push(record);
            }
            Primary::Many(primary)
        }
        Some(resource @ Value::Object(_)) => {
            let record = normalize_inbound(resource, config, &mut diagnostics)?;
            insert(&mut records, record.clone(), true);
            Primary::One(record)
        }
        Some(other) => {
            return Err(DocumentError::Malformed(format!(
                "data must be an object, an array or null, got {}",
                kind(other)
            )))
        }
    };

    match document.get("included") {
        None | Some(Value::Null) => {}
        Some(Value::Array(resources)) => {
            for resource in resources {
                let record = normalize_inbound(resource, config, &mut diagnostics)?;
                insert(&mut records, record, false);
            }
        }
        Some(other) => {
            return Err(DocumentError::Malformed(format!(
                "included must be an array, got {}",
                kind(other)
            )))
        }
    }

    let normalized = Normalized {
        records,
        primary,
        diagnostics,
        json: config.preserve_json.then(|| body.clone()),
    };
    debug!(
        records = normalized.len(),
        diagnostics = normalized.diagnostics.len(),
        "normalized document"
    );
    Ok(normalized)
}

fn normalize_inbound(
    resource: &Value,
    config: &Config,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Record, DocumentError> {
    let normalization = normalize_value(resource, config)?;
    if normalization.record.id().is_none() {
        return Err(DocumentError::MissingId {
            resource_type: normalization.record.jv.resource_type,
        });
    }
    diagnostics.extend(normalization.diagnostics);
    Ok(normalization.record)
}

fn insert(records: &mut RecordMap, record: Record, overwrite: bool) {
    let Some(id) = record.id().map(str::to_string) else {
        return;
    };
    let collection = records.entry(record.jv.resource_type.clone()).or_default();
    if overwrite || !collection.contains_key(&id) {
        collection.insert(id, record);
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// What a fetch hands back to the caller: the normalized subset of the
/// request, never the full store.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    /// A single resource. `json` is the whole response document when
    /// `preserve_json` is set; it is not part of the serialized record.
    Record { record: Record, json: Option<Value> },
    Collection(RecordSet),
}

impl Fetched {
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Fetched::Record { record, .. } => Some(record),
            Fetched::Collection(_) => None,
        }
    }

    pub fn into_record(self) -> Option<Record> {
        match self {
            Fetched::Record { record, .. } => Some(record),
            Fetched::Collection(_) => None,
        }
    }

    pub fn as_collection(&self) -> Option<&RecordSet> {
        match self {
            Fetched::Record { .. } => None,
            Fetched::Collection(collection) => Some(collection),
        }
    }

    /// The raw response document (top-level `meta`, `links`, `included`...),
    /// kept when `preserve_json` is set.
    pub fn json(&self) -> Option<&Value> {
        match self {
            Fetched::Record { json, .. } => json.as_ref(),
            Fetched::Collection(collection) => collection.json.as_ref(),
        }
    }

    /// Identifiers of the returned records.
    pub fn identifiers(&self) -> Vec<ResourceIdentifier> {
        match self {
            Fetched::Record { record, .. } => vec![record.identifier()],
            Fetched::Collection(collection) => {
                collection.records.values().map(Record::identifier).collect()
            }
        }
    }
}

impl Serialize for Fetched {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Fetched::Record { record, .. } => record.serialize(serializer),
            Fetched::Collection(collection) => collection.serialize(serializer),
        }
    }
}

/// A collection result keyed by id.
///
/// Serializes as `{ "<id>": record, ... }`, plus `"_jv": { "json": <body> }`
/// when the raw document was preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    pub records: BTreeMap<String, Record>,
    pub json: Option<Value>,
}

impl RecordSet {
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Serialize for RecordSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self.records.len() + usize::from(self.json.is_some());
        let mut map = serializer.serialize_map(Some(entries))?;
        for (id, record) in &self.records {
            map.serialize_entry(id, record)?;
        }
        if let Some(json) = &self.json {
            map.serialize_entry(JV_TAG, &json!({ "json": json }))?;
        }
        map.end()
    }
}
