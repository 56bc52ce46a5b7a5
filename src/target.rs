use std::borrow::Cow;

use crate::error::TargetError;
use crate::record::Record;
use crate::resource::ResourceIdentifier;

/// Anything a fetch-style operation accepts as "what to request".
///
/// Every form is parsed into a [`ResourceIdentifier`] before the transport
/// is called, so `"widget/1"`, `("widget", "1")` and a widget record with id
/// `1` all produce the same request.
#[derive(Debug, Clone)]
pub enum Target<'a> {
    Record(&'a Record),
    Identifier(ResourceIdentifier),
    /// `type` or `type/id`; leading and trailing slashes are tolerated.
    Path(Cow<'a, str>),
}

impl Target<'_> {
    pub fn identifier(&self) -> Result<ResourceIdentifier, TargetError> {
        let identifier = match self {
            Target::Record(record) => record.identifier(),
            Target::Identifier(identifier) => identifier.clone(),
            Target::Path(path) => return parse_path(path),
        };
        if identifier.resource_type.is_empty() {
            return Err(TargetError::MissingType);
        }
        Ok(identifier)
    }
}

/// Parse a `type[/id]` request path.
pub fn parse_path(path: &str) -> Result<ResourceIdentifier, TargetError> {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Err(TargetError::Empty);
    }

    let segments: Vec<&str> = trimmed.split('/').collect();
    match segments.as_slice() {
        [resource_type] => Ok(ResourceIdentifier::collection(*resource_type)),
        [resource_type, id] if !resource_type.is_empty() && !id.is_empty() => {
            Ok(ResourceIdentifier::new(*resource_type, *id))
        }
        _ => Err(TargetError::TooManySegments(path.to_string())),
    }
}

impl<'a> From<&'a Record> for Target<'a> {
    fn from(record: &'a Record) -> Self {
        Target::Record(record)
    }
}

impl From<ResourceIdentifier> for Target<'_> {
    fn from(identifier: ResourceIdentifier) -> Self {
        Target::Identifier(identifier)
    }
}

impl From<&ResourceIdentifier> for Target<'_> {
    fn from(identifier: &ResourceIdentifier) -> Self {
        Target::Identifier(identifier.clone())
    }
}

impl From<(&str, &str)> for Target<'_> {
    fn from((resource_type, id): (&str, &str)) -> Self {
        Target::Identifier(ResourceIdentifier::new(resource_type, id))
    }
}

impl<'a> From<&'a str> for Target<'a> {
    fn from(path: &'a str) -> Self {
        Target::Path(Cow::Borrowed(path))
    }
}

impl<'a> From<&'a String> for Target<'a> {
    fn from(path: &'a String) -> Self {
        Target::Path(Cow::Borrowed(path.as_str()))
    }
}

impl From<String> for Target<'_> {
    fn from(path: String) -> Self {
        Target::Path(Cow::Owned(path))
    }
}
