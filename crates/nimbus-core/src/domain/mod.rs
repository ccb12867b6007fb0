//! Domain entities
//!
//! This module contains the core domain types for Nimbus:
//! - Newtypes for validated remote paths and object identifiers
//! - Remote entries and the order-preserving mirror tree
//! - Local filesystem watch events
//! - Domain-specific error types

pub mod entry;
pub mod errors;
pub mod newtypes;
pub mod tree;
pub mod watch_event;

// Re-export commonly used types
pub use entry::{EntryKind, RemoteEntry};
pub use errors::{DomainError, OperationError};
pub use newtypes::*;
pub use tree::MirrorTree;
pub use watch_event::{WatchEvent, WatchEventKind};
