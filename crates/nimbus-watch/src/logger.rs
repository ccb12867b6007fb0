//! Change logger
//!
//! Subscribes to filesystem notifications under a root directory and emits
//! one line per event through an [`EventSink`]. The halves of a rename are
//! folded into one move; nothing else is filtered, debounced or batched.
//!
//! The logger has two states: [`WatchState::Watching`] while [`ChangeLogger::run`]
//! is looping, and [`WatchState::Stopped`] once the cancellation token fires.

use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use nimbus_core::domain::WatchEvent;
use nimbus_core::ports::EventSink;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::watcher::{FileWatcher, RenamePairer};
use crate::WatchError;

/// Default interval between cancellation checks
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// Lifecycle of a [`ChangeLogger`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Watching,
    Stopped,
}

impl Display for WatchState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            WatchState::Watching => f.write_str("watching"),
            WatchState::Stopped => f.write_str("stopped"),
        }
    }
}

/// Logs every create, delete, modify and move under a directory tree
pub struct ChangeLogger {
    root: PathBuf,
    sink: Arc<dyn EventSink>,
    tick: Duration,
}

impl ChangeLogger {
    /// Creates a logger for `root` that reports to `sink`
    pub fn new(root: impl Into<PathBuf>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            root: root.into(),
            sink,
            tick: DEFAULT_TICK,
        }
    }

    /// Sets how often the loop wakes to check for cancellation
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Formats `event` and hands the line to the sink
    pub fn on_event(&self, event: &WatchEvent) {
        self.sink.emit(&event.to_string());
    }

    /// Watches the root until `shutdown` is cancelled
    ///
    /// The loop wakes on every event and on every tick, and checks the token
    /// after each wake. Each tick also reports rename sources whose partner
    /// never arrived. The watch is removed before returning.
    ///
    /// # Errors
    /// Returns [`WatchError`] if the root is missing, is not a directory, or
    /// cannot be watched. Once watching has started the loop does not fail.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<WatchState, WatchError> {
        let root = match tokio::fs::canonicalize(&self.root).await {
            Ok(root) => root,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(WatchError::PathNotFound(self.root.clone()))
            }
            Err(e) => return Err(e.into()),
        };
        if !root.is_dir() {
            return Err(WatchError::NotADirectory(root));
        }

        let (mut watcher, mut events) = FileWatcher::new()?;
        watcher.watch(&root)?;

        let mut state = WatchState::Watching;
        info!(path = %root.display(), %state, "Change logger started");

        let mut pairer = RenamePairer::default();
        let mut ticker = tokio::time::interval(self.tick);
        while state == WatchState::Watching {
            tokio::select! {
                received = events.recv() => match received {
                    Some(raw) => {
                        for event in pairer.push(&raw, Instant::now()) {
                            self.on_event(&event);
                        }
                    }
                    None => {
                        warn!("Watch event channel closed");
                        state = WatchState::Stopped;
                    }
                },
                _ = ticker.tick() => {
                    debug!("Change logger tick");
                    for event in pairer.flush_expired(Instant::now()) {
                        self.on_event(&event);
                    }
                }
            }

            if shutdown.is_cancelled() {
                state = WatchState::Stopped;
            }
        }

        for event in pairer.flush_all() {
            self.on_event(&event);
        }
        if let Err(e) = watcher.unwatch(&root) {
            warn!(path = %root.display(), error = %e, "Failed to remove watch");
        }
        info!(path = %root.display(), %state, "Change logger stopped");
        Ok(state)
    }
}
