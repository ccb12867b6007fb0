//! HttpRemoteStorage - IRemoteStorage implementation over the HTTP client
//!
//! Wraps the [`NimbusClient`] and adapts it to the [`IRemoteStorage`] port
//! contract.
//!
//! A 404 is reported as [`RemoteNotFound`] so the core can tell a missing
//! node from any other failure. The session token is fixed once the client
//! is handed over.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use tracing::debug;

use nimbus_core::domain::{EntryKind, ObjectId, RemoteEntry};
use nimbus_core::ports::{IRemoteStorage, RemoteNotFound, UploadTarget};

use crate::client::NimbusClient;
use crate::RemoteError;

/// Converts a client error into a port error, surfacing missing nodes
fn port_error(err: RemoteError) -> anyhow::Error {
    match err {
        RemoteError::NotFound(message) => anyhow::Error::new(RemoteNotFound(message)),
        other => anyhow::Error::new(other),
    }
}

/// Remote storage backed by the service's REST API
pub struct HttpRemoteStorage {
    client: NimbusClient,
}

impl std::fmt::Debug for HttpRemoteStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRemoteStorage").finish_non_exhaustive()
    }
}

impl HttpRemoteStorage {
    /// Creates a new `HttpRemoteStorage` wrapping the given [`NimbusClient`]
    pub fn new(client: NimbusClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl IRemoteStorage for HttpRemoteStorage {
    async fn get_info_by_path(&self, path: &str) -> Result<RemoteEntry> {
        let client = &self.client;
        debug!(path, "HttpRemoteStorage::get_info_by_path");
        client
            .get_info(path)
            .await
            .map_err(port_error)
            .with_context(|| format!("Failed to get info for {path}"))
    }

    async fn list_by_path(&self, path: &str) -> Result<Vec<RemoteEntry>> {
        let client = &self.client;
        debug!(path, "HttpRemoteStorage::list_by_path");
        client
            .list_children(path)
            .await
            .map_err(port_error)
            .with_context(|| format!("Failed to list {path}"))
    }

    async fn create_by_path(
        &self,
        parent_path: &str,
        name: &str,
        kind: EntryKind,
    ) -> Result<RemoteEntry> {
        let client = &self.client;
        debug!(parent = parent_path, name, %kind, "HttpRemoteStorage::create_by_path");
        client
            .create_node(parent_path, name, kind)
            .await
            .map_err(port_error)
            .with_context(|| format!("Failed to create {name} under {parent_path}"))
    }

    async fn get_upload_target(
        &self,
        object_id: &ObjectId,
        size_bytes: u64,
    ) -> Result<UploadTarget> {
        let client = &self.client;
        debug!(id = %object_id, size_bytes, "HttpRemoteStorage::get_upload_target");
        client
            .upload_target(object_id, size_bytes)
            .await
            .map_err(port_error)
            .context("Failed to get upload target")
    }

    async fn upload_bytes(
        &self,
        endpoint: &str,
        parameters: &BTreeMap<String, String>,
        name: &str,
        data: Vec<u8>,
    ) -> Result<()> {
        let client = &self.client;
        debug!(endpoint, name, size = data.len(), "HttpRemoteStorage::upload_bytes");
        client
            .upload_multipart(endpoint, parameters, name, data)
            .await
            .map_err(port_error)
            .with_context(|| format!("Failed to upload {name}"))
    }

    async fn complete_upload(&self, object_id: &ObjectId, storage_key: &str) -> Result<()> {
        let client = &self.client;
        debug!(id = %object_id, "HttpRemoteStorage::complete_upload");
        client
            .complete_upload(object_id, storage_key)
            .await
            .map_err(port_error)
            .context("Failed to complete upload")
    }

    async fn download_bytes(&self, object_id: &ObjectId) -> Result<Vec<u8>> {
        let client = &self.client;
        debug!(id = %object_id, "HttpRemoteStorage::download_bytes");
        client
            .download(object_id)
            .await
            .map_err(port_error)
            .with_context(|| format!("Failed to download {object_id}"))
    }

    async fn move_by_path(
        &self,
        source_id: &ObjectId,
        dest_parent_id: &ObjectId,
        new_name: &str,
    ) -> Result<()> {
        let client = &self.client;
        debug!(id = %source_id, dest = %dest_parent_id, new_name, "HttpRemoteStorage::move_by_path");
        client
            .move_node(source_id, dest_parent_id, new_name)
            .await
            .map_err(port_error)
            .with_context(|| format!("Failed to move {source_id}"))
    }

    async fn delete_by_ids(&self, ids: &[ObjectId]) -> Result<()> {
        let client = &self.client;
        debug!(count = ids.len(), "HttpRemoteStorage::delete_by_ids");
        client
            .recycle(ids)
            .await
            .map_err(port_error)
            .context("Failed to recycle nodes")
    }
}

// ============================================================================
// Tests
// ============================================================================
