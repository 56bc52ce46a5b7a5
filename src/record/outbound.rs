use super::Record;
use crate::resource::{Document, RawRelationship, RawResource};

/// Turn a record back into a resource object for a write request.
///
/// Store-only metadata (`json`, resolved `rels`) never goes out. A
/// relationship known only in resolved form is reduced to identifiers.
pub fn denormalize(record: &Record) -> RawResource {
    let mut relationships = record.jv.relationships.clone();
    for (name, resolved) in &record.jv.rels {
        relationships
            .entry(name.clone())
            .or_insert_with(|| RawRelationship::with_data(resolved.to_linkage()));
    }

    RawResource {
        resource_type: record.jv.resource_type.clone(),
        id: record.jv.id.clone(),
        attributes: record.attributes.clone(),
        relationships,
        links: record.jv.links.clone(),
        meta: record.jv.meta.clone(),
    }
}

pub fn denormalize_many<'a, I>(records: I) -> Vec<RawResource>
where
    I: IntoIterator<Item = &'a Record>,
{
    records.into_iter().map(denormalize).collect()
}

/// `{ "data": resource }` for a single record.
pub fn request_body(record: &Record) -> Document {
    Document::single(denormalize(record))
}

/// `{ "data": [resources...] }` for a batch of records.
pub fn request_body_many<'a, I>(records: I) -> Document
where
    I: IntoIterator<Item = &'a Record>,
{
    Document::many(denormalize_many(records))
}
