//! Remote tree mirroring use case
//!
//! Walks the remote hierarchy breadth-first from a root path, records every
//! entry in a [`MirrorTree`], and reproduces the hierarchy under a local base
//! directory.
//!
//! ## Failure policy
//!
//! Listing and materialization are fail-soft: an unreachable subtree lists
//! as empty and a failed download is recorded in the [`MaterializeReport`],
//! but neither aborts the pass.

use std::collections::VecDeque;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::{EntryKind, MirrorTree, OperationError, RemoteEntry, RemotePath};
use crate::ports::IRemoteStorage;

/// Outcome of a materialization pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MaterializeReport {
    /// Local directories created (or already present)
    pub folders_created: usize,
    /// Files downloaded and written
    pub files_written: usize,
    /// Entries that are neither files nor folders
    pub skipped: usize,
    /// Entries that could not be materialized, with the reason
    pub failures: Vec<(RemotePath, OperationError)>,
}

impl MaterializeReport {
    /// Returns true if every entry was materialized or deliberately skipped
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Use case for mirroring a remote hierarchy onto local disk
///
/// Strictly sequential: one remote call per queue item while building the
/// tree, then one download per file while materializing.
pub struct MirrorTreeUseCase {
    storage: Arc<dyn IRemoteStorage>,
    max_entries: Option<usize>,
}

impl MirrorTreeUseCase {
    /// Creates a new MirrorTreeUseCase over the given storage port
    pub fn new(storage: Arc<dyn IRemoteStorage>) -> Self {
        Self {
            storage,
            max_entries: None,
        }
    }

    /// Stops tree expansion once this many entries have been recorded
    pub fn with_max_entries(mut self, max_entries: Option<usize>) -> Self {
        self.max_entries = max_entries;
        self
    }

    // ========================================================================
    // Listing
    // ========================================================================

    /// Lists the immediate children of `path`, reporting failures
    ///
    /// If `path` resolves to a file, the result is that single file.
    ///
    /// # Errors
    /// Returns the typed reason if the metadata or listing call fails
    pub async fn try_list_children(
        &self,
        path: &RemotePath,
    ) -> Result<Vec<RemoteEntry>, OperationError> {
        list_entries(self.storage.as_ref(), path).await
    }

    /// Lists the immediate children of `path`; failures list as empty
    pub async fn list_children(&self, path: &RemotePath) -> Vec<RemoteEntry> {
        match self.try_list_children(path).await {
            Ok(entries) => entries,
            Err(err) => {
                warn!(path = %path, error = %err, "Listing failed, treating as empty");
                Vec::new()
            }
        }
    }

    // ========================================================================
    // Tree building
    // ========================================================================

    /// Builds the full tree reachable from `root`
    ///
    /// Breadth-first over a FIFO queue. Each child's key is derived from its
    /// own reported path and name. Duplicate keys overwrite earlier entries.
    pub async fn build_tree(&self, root: &RemotePath) -> MirrorTree {
        let mut tree = MirrorTree::new();
        let mut queue = VecDeque::from([root.clone()]);

        while let Some(current) = queue.pop_front() {
            for entry in self.list_children(&current).await {
                let full_path = match entry.full_path() {
                    Ok(p) => p,
                    Err(err) => {
                        warn!(
                            parent = %entry.path,
                            name = %entry.name,
                            error = %err,
                            "Skipping entry with invalid path"
                        );
                        continue;
                    }
                };

                if entry.is_folder() {
                    queue.push_back(full_path.clone());
                }
                tree.insert(full_path, entry);

                if let Some(limit) = self.max_entries {
                    if tree.len() >= limit {
                        warn!(limit, pending = queue.len(), "Entry limit reached, stopping traversal");
                        return tree;
                    }
                }
            }
        }

        info!(root = %root, entries = tree.len(), "Remote tree built");
        tree
    }

    // ========================================================================
    // Materialization
    // ========================================================================

    /// Reproduces `tree` under `local_base`
    ///
    /// Entries are processed in depth order so a folder exists before
    /// anything nested in it is written. A file's parent directory is also
    /// created on demand, so parents that are not folders in the tree (above
    /// the root, or reported as other kinds) never block the write.
    pub async fn materialize(&self, tree: &MirrorTree, local_base: &Path) -> MaterializeReport {
        let mut report = MaterializeReport::default();

        if let Err(err) = tokio::fs::create_dir_all(local_base).await {
            warn!(base = %local_base.display(), error = %err, "Cannot create local base directory");
        }

        for (remote_path, entry) in tree.materialization_order() {
            let result = match entry.kind {
                EntryKind::Folder => self.materialize_folder(remote_path, local_base).await,
                EntryKind::File => {
                    self.materialize_file(remote_path, entry, local_base).await
                }
                EntryKind::Other => {
                    debug!(path = %remote_path, "Skipping entry that is neither file nor folder");
                    report.skipped += 1;
                    continue;
                }
            };

            match (result, entry.kind) {
                (Ok(()), EntryKind::Folder) => report.folders_created += 1,
                (Ok(()), _) => report.files_written += 1,
                (Err(err), _) => {
                    warn!(path = %remote_path, error = %err, "Failed to materialize entry");
                    report.failures.push((remote_path.clone(), err));
                }
            }
        }

        info!(
            folders = report.folders_created,
            files = report.files_written,
            skipped = report.skipped,
            failed = report.failures.len(),
            "Materialization finished"
        );
        report
    }

    /// Builds the tree from `root` and materializes it under `local_base`
    pub async fn mirror(&self, root: &RemotePath, local_base: &Path) -> MaterializeReport {
        let tree = self.build_tree(root).await;
        self.materialize(&tree, local_base).await
    }

    async fn materialize_folder(
        &self,
        remote_path: &RemotePath,
        local_base: &Path,
    ) -> Result<(), OperationError> {
        let local = local_path_for(local_base, remote_path)?;
        debug!(remote = %remote_path, local = %local.display(), "Creating directory");
        tokio::fs::create_dir_all(&local).await?;
        Ok(())
    }

    async fn materialize_file(
        &self,
        remote_path: &RemotePath,
        entry: &RemoteEntry,
        local_base: &Path,
    ) -> Result<(), OperationError> {
        let local = local_path_for(local_base, remote_path)?;
        if let Some(dir) = local.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        debug!(remote = %remote_path, id = %entry.object_id, "Downloading file");
        let data = self
            .storage
            .download_bytes(&entry.object_id)
            .await
            .map_err(|e| OperationError::from_remote(&e))?;

        tokio::fs::write(&local, &data).await?;
        debug!(local = %local.display(), bytes = data.len(), "Wrote file");
        Ok(())
    }
}

/// Lists the children of `path` through `storage`; a file lists as itself
pub(crate) async fn list_entries(
    storage: &dyn IRemoteStorage,
    path: &RemotePath,
) -> Result<Vec<RemoteEntry>, OperationError> {
    debug!(path = %path, "Listing directory");

    let info = storage
        .get_info_by_path(path.as_str())
        .await
        .map_err(|e| OperationError::from_remote(&e))?;

    if info.is_file() {
        return Ok(vec![info]);
    }

    storage
        .list_by_path(&path.as_container())
        .await
        .map_err(|e| OperationError::from_remote(&e))
}

/// Maps a remote path onto the local base directory
///
/// # Errors
/// Returns [`OperationError::InvalidPath`] if the relative part would not
/// stay inside `local_base`
pub fn local_path_for(local_base: &Path, remote_path: &RemotePath) -> Result<PathBuf, OperationError> {
    let relative = Path::new(remote_path.relative());
    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        return Err(OperationError::InvalidPath(format!(
            "{remote_path} escapes the local base"
        )));
    }
    Ok(local_base.join(relative))
}
