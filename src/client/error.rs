//! Error types for client operations.

use std::error::Error;
use std::fmt;

use crate::error::{DocumentError, TargetError};
use crate::store::StoreError;

/// Error type for fetch and write operations.
///
/// `E` is the transport's own error; it is handed back untouched so the
/// caller can inspect status codes and payloads.
#[derive(Debug)]
pub enum ClientError<E> {
    /// The transport call failed.
    Transport(E),
    /// The response body could not be normalized.
    Document(DocumentError),
    /// The request target could not be parsed.
    Target(TargetError),
    /// The store could not be read or updated.
    Store(StoreError),
    /// The operation needs a persisted resource.
    MissingId { resource_type: String },
    /// The response held a collection where a single resource was expected.
    UnexpectedCollection,
}

impl<E: fmt::Display> fmt::Display for ClientError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Transport(e) => write!(f, "transport error: {}", e),
            ClientError::Document(e) => write!(f, "document error: {}", e),
            ClientError::Target(e) => write!(f, "invalid target: {}", e),
            ClientError::Store(e) => write!(f, "store error: {}", e),
            ClientError::MissingId { resource_type } => {
                write!(f, "operation requires an id for {}", resource_type)
            }
            ClientError::UnexpectedCollection => {
                write!(f, "expected a single resource, got a collection")
            }
        }
    }
}

impl<E: Error + 'static> Error for ClientError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ClientError::Transport(e) => Some(e),
            ClientError::Document(e) => Some(e),
            ClientError::Target(e) => Some(e),
            ClientError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl<E> From<DocumentError> for ClientError<E> {
    fn from(err: DocumentError) -> Self {
        ClientError::Document(err)
    }
}

impl<E> From<TargetError> for ClientError<E> {
    fn from(err: TargetError) -> Self {
        ClientError::Target(err)
    }
}

impl<E> From<StoreError> for ClientError<E> {
    fn from(err: StoreError) -> Self {
        ClientError::Store(err)
    }
}

impl<E> ClientError<E> {
    /// The transport error, if that is what failed.
    pub fn transport(&self) -> Option<&E> {
        match self {
            ClientError::Transport(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }
}
