//! Local filesystem change notifications

use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

/// What happened to the path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchEventKind {
    Created,
    Deleted,
    Modified,
    Moved,
}

impl Display for WatchEventKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            WatchEventKind::Created => "Created",
            WatchEventKind::Deleted => "Deleted",
            WatchEventKind::Modified => "Modified",
            WatchEventKind::Moved => "Moved",
        };
        f.write_str(s)
    }
}

/// One filesystem notification
///
/// `destination_path` is `Some` exactly when `kind` is [`WatchEventKind::Moved`];
/// the constructors enforce this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    kind: WatchEventKind,
    is_directory: bool,
    source_path: PathBuf,
    destination_path: Option<PathBuf>,
}

impl WatchEvent {
    pub fn created(path: impl Into<PathBuf>, is_directory: bool) -> Self {
        Self::simple(WatchEventKind::Created, path.into(), is_directory)
    }

    pub fn deleted(path: impl Into<PathBuf>, is_directory: bool) -> Self {
        Self::simple(WatchEventKind::Deleted, path.into(), is_directory)
    }

    pub fn modified(path: impl Into<PathBuf>, is_directory: bool) -> Self {
        Self::simple(WatchEventKind::Modified, path.into(), is_directory)
    }

    pub fn moved(
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        is_directory: bool,
    ) -> Self {
        Self {
            kind: WatchEventKind::Moved,
            is_directory,
            source_path: source.into(),
            destination_path: Some(destination.into()),
        }
    }

    fn simple(kind: WatchEventKind, source_path: PathBuf, is_directory: bool) -> Self {
        Self {
            kind,
            is_directory,
            source_path,
            destination_path: None,
        }
    }

    pub fn kind(&self) -> WatchEventKind {
        self.kind
    }

    pub fn is_directory(&self) -> bool {
        self.is_directory
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn destination_path(&self) -> Option<&Path> {
        self.destination_path.as_deref()
    }

    /// `"directory"` or `"file"`
    pub fn what(&self) -> &'static str {
        if self.is_directory {
            "directory"
        } else {
            "file"
        }
    }
}

impl Display for WatchEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.destination_path {
            Some(dest) => write!(
                f,
                "{} {}: from {} to {}",
                self.kind,
                self.what(),
                self.source_path.display(),
                dest.display()
            ),
            None => write!(
                f,
                "{} {}: {}",
                self.kind,
                self.what(),
                self.source_path.display()
            ),
        }
    }
}
