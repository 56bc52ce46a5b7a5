use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::warn;

use super::{Diagnostic, Record, RecordMeta, JV_TAG};
use crate::config::Config;
use crate::error::DocumentError;
use crate::resource::RawResource;

/// Output of normalizing one resource.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalization {
    pub record: Record,
    pub diagnostics: Vec<Diagnostic>,
}

/// Normalize one resource object into a record.
///
/// Attributes are copied to the top level, relationships are kept as
/// descriptors, and the resource itself is embedded under `_jv.json` when
/// `preserve_json` is set. An attribute named like the reserved key is
/// dropped and reported as a [`Diagnostic`].
pub fn normalize_resource(raw: &RawResource, config: &Config) -> Result<Normalization, DocumentError> {
    let json = if config.preserve_json {
        Some(serde_json::to_value(raw)?)
    } else {
        None
    };
    Ok(assemble(raw, json))
}

/// Normalize a resource straight from its wire value, so `_jv.json` holds
/// exactly what was received.
pub(crate) fn normalize_value(value: &Value, config: &Config) -> Result<Normalization, DocumentError> {
    if !value.get("type").is_some_and(Value::is_string) {
        return Err(DocumentError::MissingType);
    }
    let raw: RawResource = serde_json::from_value(value.clone())?;
    let json = config.preserve_json.then(|| value.clone());
    Ok(assemble(&raw, json))
}

fn assemble(raw: &RawResource, json: Option<Value>) -> Normalization {
    let mut diagnostics = Vec::new();
    let mut attributes = Map::new();

    for (key, value) in &raw.attributes {
        if key == JV_TAG {
            let diagnostic = Diagnostic::ReservedKeyCollision {
                resource_type: raw.resource_type.clone(),
                id: raw.id.clone(),
                key: key.clone(),
            };
            warn!(%diagnostic, "dropping attribute");
            diagnostics.push(diagnostic);
            continue;
        }
        attributes.insert(key.clone(), value.clone());
    }

    let record = Record {
        jv: RecordMeta {
            resource_type: raw.resource_type.clone(),
            id: raw.id.clone(),
            relationships: raw.relationships.clone(),
            links: raw.links.clone(),
            meta: raw.meta.clone(),
            rels: BTreeMap::new(),
            json,
        },
        attributes,
    };

    Normalization {
        record,
        diagnostics,
    }
}
