//! Nimbus Watch - Local filesystem change logger
//!
//! Provides:
//! - A recursive filesystem watcher over the `notify` crate
//! - Mapping of raw OS notifications onto domain [`WatchEvent`]s
//! - The [`ChangeLogger`] loop that reports one line per event
//!
//! ## Modules
//!
//! - [`watcher`] - `notify` wrapper and event mapping
//! - [`logger`] - Change logger state machine
//!
//! [`WatchEvent`]: nimbus_core::domain::WatchEvent
//! [`ChangeLogger`]: logger::ChangeLogger

pub mod logger;
pub mod watcher;

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while setting up or tearing down a watch
#[derive(Debug, Error)]
pub enum WatchError {
    /// The watch root does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The watch root exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The OS notification facility failed
    #[error("Watcher error: {0}")]
    Notify(#[from] notify::Error),

    /// An I/O error occurred while resolving the watch root
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
