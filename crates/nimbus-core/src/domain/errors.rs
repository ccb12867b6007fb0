//! Domain error types
//!
//! [`DomainError`] covers validation of domain values (paths, identifiers).
//! [`OperationError`] is the typed, non-fatal failure of a single remote
//! operation; callers decide whether to aggregate it or degrade to an empty
//! result.

use thiserror::Error;

use crate::ports::remote_storage::RemoteNotFound;

/// Errors that can occur when constructing or validating domain values
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid remote path format
    #[error("Invalid remote path: {0}")]
    InvalidRemotePath(String),

    /// Invalid object ID format
    #[error("Invalid object ID: {0}")]
    InvalidObjectId(String),
}

/// Failure of a single remote or local operation
///
/// These are never fatal to the enclosing traversal. They are logged where
/// they happen and returned so the caller can collect them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OperationError {
    /// The remote path does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A directory was expected but the path resolves to a file
    #[error("Not a directory: {0}")]
    NotADirectory(String),

    /// A file was expected but the path resolves to something else
    #[error("Not a file: {0}")]
    NotAFile(String),

    /// The path could not be turned into a valid remote or local path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// The storage service or transport reported an error
    #[error("Remote error: {0}")]
    Remote(String),

    /// A local filesystem operation failed
    #[error("IO error: {0}")]
    Io(String),
}

impl OperationError {
    /// Builds an [`OperationError`] from a port-level error
    ///
    /// Adapters signal a missing node by putting a [`RemoteNotFound`] in the
    /// error chain; everything else is an opaque remote failure.
    pub fn from_remote(err: &anyhow::Error) -> Self {
        if let Some(missing) = err.chain().find_map(|c| c.downcast_ref::<RemoteNotFound>()) {
            return OperationError::NotFound(missing.0.clone());
        }
        OperationError::Remote(format!("{err:#}"))
    }
}

impl From<DomainError> for OperationError {
    fn from(err: DomainError) -> Self {
        OperationError::InvalidPath(err.to_string())
    }
}

impl From<std::io::Error> for OperationError {
    fn from(err: std::io::Error) -> Self {
        OperationError::Io(err.to_string())
    }
}
