//! Use cases (interactors) for Nimbus
//!
//! This module contains the application use cases that orchestrate
//! domain entities and port interfaces. Use cases are thin coordinators
//! that delegate I/O to ports and keep their own failure policy explicit.
//!
//! ## Use Cases
//!
//! - [`MirrorTreeUseCase`] - Breadth-first remote listing and local materialization
//! - [`RemoteOperations`] - Single-shot create/list/get/move/delete/upload operations

pub mod mirror_tree;
pub mod remote_ops;

#[cfg(test)]
pub(crate) mod test_support;

pub use mirror_tree::{MaterializeReport, MirrorTreeUseCase};
pub use remote_ops::RemoteOperations;
