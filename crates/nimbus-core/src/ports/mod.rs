//! Port definitions (hexagonal architecture interfaces)
//!
//! Ports are interfaces that the domain core depends on, but whose
//! implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IRemoteStorage`] - Cloud-storage operations (stat, list, transfer, move, delete)
//! - [`EventSink`] - Destination for per-event log lines

pub mod event_sink;
pub mod remote_storage;

pub use event_sink::{EventSink, MemorySink, TracingSink};
pub use remote_storage::{IRemoteStorage, RemoteNotFound, UploadTarget};
