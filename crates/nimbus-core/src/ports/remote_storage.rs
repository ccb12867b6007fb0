//! Remote storage port (driven/secondary port)
//!
//! This module defines the black-box capability the core consumes from the
//! cloud-storage service: stat, list, create, upload, download, move and
//! delete. The HTTP implementation lives in `nimbus-remote`.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because errors at port boundaries are
//!   adapter-specific. The only failure the core needs to classify is a
//!   missing node, which adapters report by putting [`RemoteNotFound`] in
//!   the error chain.
//! - Implementations must not retry; every call maps to exactly one request.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{EntryKind, ObjectId, RemoteEntry};

/// Marker error for a path or object the service does not know
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Not found: {0}")]
pub struct RemoteNotFound(pub String);

// ============================================================================
// UploadTarget
// ============================================================================

/// Where and how to send the bytes of a pending upload
///
/// Returned by [`IRemoteStorage::get_upload_target`]. The same value feeds
/// both [`IRemoteStorage::upload_bytes`] (endpoint and parameters) and
/// [`IRemoteStorage::complete_upload`] (storage key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTarget {
    /// Absolute URL the content is posted to
    pub endpoint: String,
    /// Form parameters that must accompany the content
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    /// Key identifying the stored blob when completing the upload
    pub storage_key: String,
}

// ============================================================================
// IRemoteStorage trait
// ============================================================================

/// Port trait for the cloud-storage service
///
/// Paths passed in are absolute and already normalized by the caller;
/// container lookups use the trailing-slash form.
#[async_trait::async_trait]
pub trait IRemoteStorage: Send + Sync {
    /// Fetches the metadata of the node at `path`
    ///
    /// # Errors
    /// Fails with [`RemoteNotFound`] in the chain if nothing exists there
    async fn get_info_by_path(&self, path: &str) -> anyhow::Result<RemoteEntry>;

    /// Lists the immediate children of the container at `path`
    async fn list_by_path(&self, path: &str) -> anyhow::Result<Vec<RemoteEntry>>;

    /// Creates a node named `name` of the given kind under `parent_path`
    async fn create_by_path(
        &self,
        parent_path: &str,
        name: &str,
        kind: EntryKind,
    ) -> anyhow::Result<RemoteEntry>;

    /// Requests an upload slot for `size_bytes` of content for a file node
    async fn get_upload_target(
        &self,
        object_id: &ObjectId,
        size_bytes: u64,
    ) -> anyhow::Result<UploadTarget>;

    /// Sends file content to an upload endpoint
    async fn upload_bytes(
        &self,
        endpoint: &str,
        parameters: &BTreeMap<String, String>,
        name: &str,
        data: Vec<u8>,
    ) -> anyhow::Result<()>;

    /// Marks an upload as finished so the service attaches the blob
    async fn complete_upload(&self, object_id: &ObjectId, storage_key: &str)
        -> anyhow::Result<()>;

    /// Downloads the content of a file node
    async fn download_bytes(&self, object_id: &ObjectId) -> anyhow::Result<Vec<u8>>;

    /// Moves a node under a new parent, optionally renaming it
    async fn move_by_path(
        &self,
        source_id: &ObjectId,
        dest_parent_id: &ObjectId,
        new_name: &str,
    ) -> anyhow::Result<()>;

    /// Moves the given nodes to the recycle bin
    async fn delete_by_ids(&self, ids: &[ObjectId]) -> anyhow::Result<()>;
}
