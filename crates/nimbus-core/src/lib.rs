//! Nimbus Core - Domain logic for the Nimbus cloud-drive client
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `RemoteEntry`, `MirrorTree`, `WatchEvent`
//! - **Use cases** - `MirrorTreeUseCase`, `RemoteOperations`
//! - **Port definitions** - `IRemoteStorage`, the black-box storage capability
//!
//! # Architecture
//!
//! The domain module contains pure data types with no I/O.
//! Ports define trait interfaces that adapter crates implement.
//! Use cases orchestrate domain entities through port interfaces.

pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;
