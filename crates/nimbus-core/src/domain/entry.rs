//! Remote entries as reported by the storage service

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::newtypes::{ObjectId, RemotePath};

/// Classification of a remote node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryKind {
    File,
    Folder,
    /// Anything the client does not mirror (links, assets, unknown types)
    #[serde(other)]
    Other,
}

impl EntryKind {
    /// Returns true for folders
    pub fn is_folder(&self) -> bool {
        matches!(self, EntryKind::Folder)
    }

    /// Returns true for files
    pub fn is_file(&self) -> bool {
        matches!(self, EntryKind::File)
    }
}

impl Display for EntryKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntryKind::File => "FILE",
            EntryKind::Folder => "FOLDER",
            EntryKind::Other => "OTHER",
        };
        f.write_str(s)
    }
}

/// One node of the remote hierarchy
///
/// A read-only snapshot: `path` is the parent path exactly as the service
/// reported it (usually with a trailing slash) and `name` is the node's own
/// name. The full path is derived from these two fields, never from the
/// path the caller asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    /// Parent path as reported by the service
    pub path: String,
    /// Node name
    pub name: String,
    /// Service-assigned identifier
    pub object_id: ObjectId,
    /// File, folder or other
    pub kind: EntryKind,
}

impl RemoteEntry {
    /// Creates a new entry snapshot
    pub fn new(
        path: impl Into<String>,
        name: impl Into<String>,
        object_id: ObjectId,
        kind: EntryKind,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            object_id,
            kind,
        }
    }

    /// Full absolute path: reported parent path joined with the name
    ///
    /// # Errors
    /// Returns error if the reported fields do not form a valid path
    pub fn full_path(&self) -> Result<RemotePath, DomainError> {
        RemotePath::from_parts(&self.path, &self.name)
    }

    pub fn is_folder(&self) -> bool {
        self.kind.is_folder()
    }

    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }
}
