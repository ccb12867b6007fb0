//! Single-shot remote operations
//!
//! Thin wrappers over [`IRemoteStorage`] for the one-off commands: upload a
//! local file, create a directory, list, download, move and recycle. Each
//! method logs before its remote calls, logs failures, and returns a typed
//! [`OperationError`] so the caller can decide how to degrade.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::domain::{EntryKind, ObjectId, OperationError, RemoteEntry, RemotePath};
use crate::ports::IRemoteStorage;
use crate::usecases::mirror_tree::list_entries;

/// Facade over the storage port for one-off commands
pub struct RemoteOperations {
    storage: Arc<dyn IRemoteStorage>,
}

impl RemoteOperations {
    pub fn new(storage: Arc<dyn IRemoteStorage>) -> Self {
        Self { storage }
    }

    async fn info(&self, path: &RemotePath) -> Result<RemoteEntry, OperationError> {
        self.storage
            .get_info_by_path(path.as_str())
            .await
            .map_err(|e| OperationError::from_remote(&e))
    }

    // ========================================================================
    // Upload
    // ========================================================================

    /// Uploads `local_file` into the remote directory `remote_dir`
    ///
    /// Creates the file node, requests an upload target, posts the bytes to
    /// the target's endpoint and completes the upload with the target's
    /// storage key.
    ///
    /// # Errors
    /// [`OperationError::NotADirectory`] if `remote_dir` is a file; otherwise
    /// the first failing local read or remote call
    pub async fn create_file(
        &self,
        remote_dir: &RemotePath,
        local_file: &Path,
    ) -> Result<RemoteEntry, OperationError> {
        let result = self.upload(remote_dir, local_file).await;
        if let Err(ref err) = result {
            error!(
                from = %local_file.display(),
                to = %remote_dir.as_container(),
                error = %err,
                "Upload failed"
            );
        }
        result
    }

    async fn upload(
        &self,
        remote_dir: &RemotePath,
        local_file: &Path,
    ) -> Result<RemoteEntry, OperationError> {
        let container = remote_dir.as_container();
        debug!(from = %local_file.display(), to = %container, "Uploading file");

        let dest = self.info(remote_dir).await?;
        if dest.is_file() {
            return Err(OperationError::NotADirectory(container));
        }

        let name = local_file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                OperationError::InvalidPath(format!(
                    "no usable file name in {}",
                    local_file.display()
                ))
            })?
            .to_string();

        let data = tokio::fs::read(local_file).await?;

        debug!(path = %container, name = %name, "Creating file node");
        let created = self
            .storage
            .create_by_path(&container, &name, EntryKind::File)
            .await
            .map_err(|e| OperationError::from_remote(&e))?;

        let upload = self
            .storage
            .get_upload_target(&created.object_id, data.len() as u64)
            .await
            .map_err(|e| OperationError::from_remote(&e))?;

        debug!(name = %name, endpoint = %upload.endpoint, "Starting file upload");
        self.storage
            .upload_bytes(&upload.endpoint, &upload.parameters, &name, data)
            .await
            .map_err(|e| OperationError::from_remote(&e))?;

        debug!(name = %name, "Finishing file upload");
        self.storage
            .complete_upload(&created.object_id, &upload.storage_key)
            .await
            .map_err(|e| OperationError::from_remote(&e))?;

        Ok(created)
    }

    // ========================================================================
    // Directories and listing
    // ========================================================================

    /// Creates the directory `path`
    ///
    /// # Errors
    /// [`OperationError::InvalidPath`] for the root; otherwise the remote
    /// failure (an existing directory is reported by the service)
    pub async fn create_dir(&self, path: &RemotePath) -> Result<RemoteEntry, OperationError> {
        let (parent, name) = match (path.parent(), path.file_name()) {
            (Some(parent), Some(name)) => (parent, name),
            _ => {
                return Err(OperationError::InvalidPath(
                    "cannot create the root directory".to_string(),
                ))
            }
        };

        debug!(path = %path, "Creating directory");
        self.storage
            .create_by_path(parent.as_str(), name, EntryKind::Folder)
            .await
            .map_err(|e| {
                let err = OperationError::from_remote(&e);
                error!(path = %path, error = %err, "Failed to create directory");
                err
            })
    }

    /// Lists `path`; a file lists as itself
    ///
    /// # Errors
    /// The metadata or listing failure
    pub async fn list(&self, path: &RemotePath) -> Result<Vec<RemoteEntry>, OperationError> {
        list_entries(self.storage.as_ref(), path).await.map_err(|err| {
            error!(path = %path, error = %err, "Failed to list directory");
            err
        })
    }

    // ========================================================================
    // Download
    // ========================================================================

    /// Downloads the file at `path`
    ///
    /// # Errors
    /// [`OperationError::NotAFile`] if `path` is not a file
    pub async fn get_file(&self, path: &RemotePath) -> Result<Vec<u8>, OperationError> {
        debug!(path = %path, "Downloading file");
        let info = self.info(path).await?;
        if !info.is_file() {
            error!(path = %path, kind = %info.kind, "Supplied path is not a file");
            return Err(OperationError::NotAFile(path.to_string()));
        }
        self.storage
            .download_bytes(&info.object_id)
            .await
            .map_err(|e| {
                let err = OperationError::from_remote(&e);
                error!(path = %path, error = %err, "Download failed");
                err
            })
    }

    // ========================================================================
    // Move and delete
    // ========================================================================

    /// Moves `source` into the directory `dest_dir`, optionally renaming it
    ///
    /// # Errors
    /// [`OperationError::NotADirectory`] if `dest_dir` is a file
    pub async fn move_entry(
        &self,
        source: &RemotePath,
        dest_dir: &RemotePath,
        new_name: Option<&str>,
    ) -> Result<(), OperationError> {
        debug!(from = %source, to = %dest_dir, "Moving entry");
        let src = self.info(source).await?;
        let dest = self.info(dest_dir).await?;
        if dest.is_file() {
            error!(path = %dest_dir, "Move destination is not a directory");
            return Err(OperationError::NotADirectory(dest_dir.to_string()));
        }

        let name = new_name.unwrap_or(&src.name);
        self.storage
            .move_by_path(&src.object_id, &dest.object_id, name)
            .await
            .map_err(|e| {
                let err = OperationError::from_remote(&e);
                error!(from = %source, to = %dest_dir, error = %err, "Move failed");
                err
            })
    }

    /// Moves every resolvable path in `paths` to the recycle bin in one call
    ///
    /// Paths that cannot be resolved are logged and skipped. Returns the
    /// number of entries recycled.
    ///
    /// # Errors
    /// [`OperationError::NotFound`] if none of the paths resolve; otherwise
    /// the failure of the recycle call
    pub async fn delete(&self, paths: &[RemotePath]) -> Result<usize, OperationError> {
        let mut ids: Vec<ObjectId> = Vec::with_capacity(paths.len());
        for path in paths {
            match self.info(path).await {
                Ok(entry) => ids.push(entry.object_id),
                Err(err) => warn!(path = %path, error = %err, "Skipping unresolvable path"),
            }
        }

        if ids.is_empty() {
            return Err(OperationError::NotFound(
                paths
                    .iter()
                    .map(|p| p.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            ));
        }

        debug!(count = ids.len(), "Recycling entries");
        self.storage.delete_by_ids(&ids).await.map_err(|e| {
            let err = OperationError::from_remote(&e);
            error!(error = %err, "Recycle failed");
            err
        })?;
        Ok(ids.len())
    }
}
