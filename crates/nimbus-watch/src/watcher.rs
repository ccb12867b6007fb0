//! File watching and event mapping
//!
//! Provides a [`FileWatcher`] that wraps the `notify` crate to monitor a
//! directory tree, and the mapping from raw OS events onto [`WatchEvent`]
//! values. [`RenamePairer`] folds the halves of a rename into one move.
//!
//! ## Architecture
//!
//! ```text
//! inotify / FSEvents / kqueue
//!       │
//!       ▼
//!  FileWatcher  ──→  mpsc::channel  ──→  RenamePairer  ──→  ChangeLogger  ──→  EventSink
//! ```

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use nimbus_core::domain::WatchEvent;
use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::WatchError;

/// Capacity of the channel between the OS callback and the consumer
const EVENT_CHANNEL_CAPACITY: usize = 1024;

// ============================================================================
// FileWatcher
// ============================================================================

/// Watches a directory tree using the OS-native mechanism
///
/// On Linux this uses inotify. Raw events other than accesses are sent
/// through an mpsc channel; mapping happens on the receiving side so rename
/// halves can be paired.
///
/// ## Usage
///
/// ```ignore
/// let (mut watcher, mut rx) = FileWatcher::new()?;
/// watcher.watch(Path::new("/home/user/Documents"))?;
/// while let Some(event) = rx.recv().await { /* ... */ }
/// ```
pub struct FileWatcher {
    /// The underlying notify watcher instance
    watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Creates a new `FileWatcher` and the receiver its events arrive on
    ///
    /// # Errors
    /// Returns an error if the underlying OS watcher cannot be created
    pub fn new() -> Result<(Self, mpsc::Receiver<notify::Event>), WatchError> {
        let (tx, rx) = mpsc::channel::<notify::Event>(EVENT_CHANNEL_CAPACITY);

        let watcher = RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| match res {
                Ok(event) if matches!(event.kind, EventKind::Access(_)) => {}
                Ok(event) => {
                    if let Err(e) = tx.blocking_send(event) {
                        warn!(error = %e, "Failed to send watch event (receiver dropped)");
                    }
                }
                Err(err) => {
                    error!(error = %err, "File watcher error");
                }
            },
            notify::Config::default(),
        )?;

        Ok((Self { watcher }, rx))
    }

    /// Starts watching `path` recursively
    ///
    /// # Errors
    /// Returns an error if the path cannot be watched (missing, insufficient
    /// permissions, or the inotify watch limit was reached)
    pub fn watch(&mut self, path: &Path) -> Result<(), WatchError> {
        info!(path = %path.display(), "Starting recursive watch");
        self.watcher.watch(path, RecursiveMode::Recursive)?;
        Ok(())
    }

    /// Stops watching `path`
    ///
    /// # Errors
    /// Returns an error if the path was not being watched
    pub fn unwatch(&mut self, path: &Path) -> Result<(), WatchError> {
        info!(path = %path.display(), "Stopping watch");
        self.watcher.unwatch(path)?;
        Ok(())
    }
}

// ============================================================================
// Event mapping - notify::Event → WatchEvent
// ============================================================================

/// Directory flag carried by the event kind, when the OS reports one
fn kind_is_directory(kind: &EventKind) -> Option<bool> {
    match kind {
        EventKind::Create(CreateKind::Folder) | EventKind::Remove(RemoveKind::Folder) => Some(true),
        EventKind::Create(CreateKind::File) | EventKind::Remove(RemoveKind::File) => Some(false),
        _ => None,
    }
}

/// Directory flag from the event kind, falling back to probing `path`
///
/// Paths that no longer exist probe as files.
fn is_directory(kind: &EventKind, path: &Path) -> bool {
    kind_is_directory(kind).unwrap_or_else(|| path.is_dir())
}

/// Converts a `notify::Event` into a [`WatchEvent`]
///
/// Maps the notify event kinds as follows:
/// - `Create(*)` -> created
/// - `Remove(*)` -> deleted
/// - `Modify(Name(Both))` with 2 paths -> moved
/// - `Modify(Name(From))` -> deleted (a source [`RenamePairer`] could not pair)
/// - `Modify(Name(To))` -> created (a destination with no pending source)
/// - Other `Modify(*)` -> modified
///
/// Returns `None` for events without paths and for access or unknown kinds.
pub fn map_notify_event(event: &notify::Event) -> Option<WatchEvent> {
    let paths = &event.paths;
    let kind = &event.kind;

    match kind {
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            let path = paths.first()?;
            debug!(path = %path.display(), kind = ?kind, "Mapped create event");
            Some(WatchEvent::created(path.clone(), is_directory(kind, path)))
        }

        EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            let path = paths.first()?;
            debug!(path = %path.display(), kind = ?kind, "Mapped remove event");
            Some(WatchEvent::deleted(path.clone(), is_directory(kind, path)))
        }

        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if paths.len() >= 2 => {
            let (from, to) = (&paths[0], &paths[1]);
            debug!(from = %from.display(), to = %to.display(), "Mapped rename event");
            Some(WatchEvent::moved(from.clone(), to.clone(), to.is_dir()))
        }

        EventKind::Modify(_) => {
            let path = paths.first()?;
            debug!(path = %path.display(), kind = ?kind, "Mapped modify event");
            Some(WatchEvent::modified(path.clone(), is_directory(kind, path)))
        }

        _ => {
            debug!(kind = ?kind, "Ignoring event kind");
            None
        }
    }
}

// ============================================================================
// RenamePairer - one line per rename
// ============================================================================

/// How long a `Name(From)` half waits for its partner before it is reported
/// as a deletion
pub const RENAME_PAIR_WINDOW: Duration = Duration::from_millis(500);

/// A `Name(From)` half still waiting for its `Name(Both)` partner
#[derive(Debug)]
struct PendingRename {
    tracker: Option<usize>,
    path: PathBuf,
    seen_at: Instant,
}

/// Folds the halves of a rename into a single move
///
/// inotify reports one rename as `Name(From)`, `Name(To)` and `Name(Both)`,
/// all sharing a tracker cookie. Halves that belong to a pair are dropped
/// and only `Name(Both)` is reported. A `From` whose partner never arrives
/// within [`RENAME_PAIR_WINDOW`] left the tree and is reported as deleted;
/// a `To` with no pending `From` entered the tree and is reported as
/// created. Every other event goes through [`map_notify_event`].
#[derive(Debug)]
pub struct RenamePairer {
    pending: Vec<PendingRename>,
    window: Duration,
}

impl Default for RenamePairer {
    fn default() -> Self {
        Self::new(RENAME_PAIR_WINDOW)
    }
}

impl RenamePairer {
    pub fn new(window: Duration) -> Self {
        Self {
            pending: Vec::new(),
            window,
        }
    }

    /// Number of rename halves still waiting for a partner
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Maps `event`, after reporting any expired halves
    pub fn push(&mut self, event: &notify::Event, now: Instant) -> Vec<WatchEvent> {
        let mut out = self.flush_expired(now);
        let tracker = event.attrs.tracker();

        match &event.kind {
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) if tracker.is_some() => {
                if let Some(path) = event.paths.first() {
                    debug!(path = %path.display(), ?tracker, "Holding rename source");
                    self.pending.push(PendingRename {
                        tracker,
                        path: path.clone(),
                        seen_at: now,
                    });
                }
            }

            EventKind::Modify(ModifyKind::Name(RenameMode::To))
                if tracker.is_some() && self.pending.iter().any(|p| p.tracker == tracker) =>
            {
                debug!(?tracker, "Dropping paired rename destination");
            }

            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if event.paths.len() >= 2 => {
                let from = &event.paths[0];
                self.pending
                    .retain(|p| !(p.tracker.is_some() && p.tracker == tracker) && &p.path != from);
                out.extend(map_notify_event(event));
            }

            _ => out.extend(map_notify_event(event)),
        }

        out
    }

    /// Reports halves that waited longer than the window as deletions
    pub fn flush_expired(&mut self, now: Instant) -> Vec<WatchEvent> {
        let window = self.window;
        let (expired, waiting): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|p| now.saturating_duration_since(p.seen_at) >= window);
        self.pending = waiting;
        expired.into_iter().map(Self::unpaired).collect()
    }

    /// Reports every waiting half as a deletion
    pub fn flush_all(&mut self) -> Vec<WatchEvent> {
        self.pending.drain(..).map(Self::unpaired).collect()
    }

    fn unpaired(pending: PendingRename) -> WatchEvent {
        debug!(path = %pending.path.display(), "Rename source left the tree");
        let is_dir = pending.path.is_dir();
        WatchEvent::deleted(pending.path, is_dir)
    }
}
