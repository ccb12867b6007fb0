//! Domain newtypes with validation
//!
//! This module provides strongly-typed wrappers for remote paths and object
//! identifiers. Each newtype ensures data validity at construction time.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

// ============================================================================
// RemotePath
// ============================================================================

/// An absolute path in the remote hierarchy
///
/// Stored in canonical form: a leading `/`, no trailing `/` (except for the
/// root itself), no empty, `.` or `..` segments. Container lookups that need
/// the trailing slash use [`RemotePath::as_container`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemotePath(String);

impl RemotePath {
    /// Create a new RemotePath from a canonical string
    ///
    /// # Errors
    /// Returns error if path doesn't start with `/`, has a trailing slash,
    /// double slashes, or `.`/`..` segments
    pub fn new(path: String) -> Result<Self, DomainError> {
        if !path.starts_with('/') {
            return Err(DomainError::InvalidRemotePath(format!(
                "Remote path must start with '/': {path}"
            )));
        }

        if path == "/" {
            return Ok(Self(path));
        }

        if path.ends_with('/') {
            return Err(DomainError::InvalidRemotePath(format!(
                "Remote path must not end with '/': {path}"
            )));
        }

        for segment in path[1..].split('/') {
            match segment {
                "" => {
                    return Err(DomainError::InvalidRemotePath(format!(
                        "Remote path contains invalid double slashes: {path}"
                    )))
                }
                "." | ".." => {
                    return Err(DomainError::InvalidRemotePath(format!(
                        "Remote path contains invalid traversal: {path}"
                    )))
                }
                _ => {}
            }
        }

        Ok(Self(path))
    }

    /// Normalizes user input into a RemotePath
    ///
    /// Prepends a missing leading `/`, drops a trailing `/` and collapses
    /// repeated separators, so `docs/`, `/docs` and `//docs//` all map to
    /// `/docs`.
    ///
    /// # Errors
    /// Returns error if a segment is `.` or `..`
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let segments: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return Ok(Self::root());
        }
        Self::new(format!("/{}", segments.join("/")))
    }

    /// Builds the full path of an entry from its reported parent path and name
    ///
    /// The parent may or may not carry a trailing slash; exactly one
    /// separator is placed between the two.
    ///
    /// # Errors
    /// Returns error if the parent is not absolute or the name is not a
    /// single valid segment
    pub fn from_parts(parent: &str, name: &str) -> Result<Self, DomainError> {
        if !parent.starts_with('/') {
            return Err(DomainError::InvalidRemotePath(format!(
                "Parent path must start with '/': {parent}"
            )));
        }
        Self::parse(parent)?.join(name)
    }

    /// Create the root path "/"
    #[must_use]
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Returns true if this is the root path
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The path with a trailing slash, as used for container lookups
    #[must_use]
    pub fn as_container(&self) -> String {
        if self.is_root() {
            self.0.clone()
        } else {
            format!("{}/", self.0)
        }
    }

    /// The path without its leading separator (empty for the root)
    #[must_use]
    pub fn relative(&self) -> &str {
        &self.0[1..]
    }

    /// Number of segments below the root (`/` is 0, `/a/b` is 2)
    #[must_use]
    pub fn depth(&self) -> usize {
        if self.is_root() {
            0
        } else {
            self.0.matches('/').count()
        }
    }

    /// Join a path component
    ///
    /// # Errors
    /// Returns error if component is invalid
    pub fn join(&self, component: &str) -> Result<Self, DomainError> {
        if component.is_empty()
            || component.contains('/')
            || component == "."
            || component == ".."
        {
            return Err(DomainError::InvalidRemotePath(format!(
                "Invalid path component: {component}"
            )));
        }

        let new_path = if self.is_root() {
            format!("/{component}")
        } else {
            format!("{}/{component}", self.0)
        };

        Self::new(new_path)
    }

    /// Get the parent path
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }

        match self.0.rfind('/') {
            Some(0) => Some(Self::root()),
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => None,
        }
    }

    /// Get the file name component
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }

        self.0.rsplit('/').next()
    }
}

impl Display for RemotePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RemotePath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RemotePath {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RemotePath> for String {
    fn from(path: RemotePath) -> Self {
        path.0
    }
}

// ============================================================================
// ObjectId
// ============================================================================

/// Opaque identifier the storage service assigns to a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

impl ObjectId {
    /// Create a new ObjectId
    ///
    /// # Errors
    /// Returns error if the ID is empty or contains whitespace or `/`
    pub fn new(id: String) -> Result<Self, DomainError> {
        if id.is_empty() {
            return Err(DomainError::InvalidObjectId(
                "Object ID cannot be empty".to_string(),
            ));
        }

        if id.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(DomainError::InvalidObjectId(format!(
                "Object ID contains invalid characters: {id}"
            )));
        }

        Ok(Self(id))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ObjectId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for ObjectId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}
