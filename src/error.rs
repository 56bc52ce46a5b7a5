use std::fmt;

/// Failure to turn a response body into normalized records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The body is not a JSON:API document (not an object, or neither
    /// `data` nor `meta` present).
    Malformed(String),
    /// A resource object without a string `type`.
    MissingType,
    /// An inbound resource without an `id`; it cannot be keyed in the store.
    MissingId { resource_type: String },
    /// The resource object did not decode into the wire types.
    Decode(String),
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::Malformed(reason) => write!(f, "malformed document: {}", reason),
            DocumentError::MissingType => write!(f, "resource object is missing its type"),
            DocumentError::MissingId { resource_type } => {
                write!(f, "resource of type {} is missing its id", resource_type)
            }
            DocumentError::Decode(message) => write!(f, "resource decode failed: {}", message),
        }
    }
}

impl std::error::Error for DocumentError {}

impl From<serde_json::Error> for DocumentError {
    fn from(err: serde_json::Error) -> Self {
        DocumentError::Decode(err.to_string())
    }
}

/// Failure to turn a request target into a resource identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetError {
    Empty,
    MissingType,
    TooManySegments(String),
}

impl fmt::Display for TargetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetError::Empty => write!(f, "request target is empty"),
            TargetError::MissingType => write!(f, "request target has no resource type"),
            TargetError::TooManySegments(path) => {
                write!(f, "request path {} is not of the form type[/id]", path)
            }
        }
    }
}

impl std::error::Error for TargetError {}
