//! In-memory [`IRemoteStorage`] used by the use case tests

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{anyhow, bail};
use async_trait::async_trait;

use crate::domain::{EntryKind, ObjectId, RemoteEntry, RemotePath};
use crate::ports::{IRemoteStorage, RemoteNotFound, UploadTarget};

struct MockNode {
    entry: RemoteEntry,
    content: Option<Vec<u8>>,
    listed_under: Option<String>,
}

#[derive(Default)]
struct State {
    nodes: Vec<MockNode>,
    pending_uploads: HashMap<String, Vec<u8>>,
    next_id: usize,
}

/// Mock storage holding a hierarchy of folders and files
///
/// Every port call is appended to [`MockStorage::calls`] so tests can
/// assert on ordering.
#[derive(Default)]
pub struct MockStorage {
    state: Mutex<State>,
    failing_lists: HashSet<String>,
    failing_infos: HashSet<String>,
    failing_downloads: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

fn parent_container(path: &RemotePath) -> String {
    path.parent()
        .map(|p| p.as_container())
        .unwrap_or_else(|| "/".to_string())
}

fn normalize(path: &str) -> String {
    RemotePath::parse(path)
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|_| path.to_string())
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(self, full: &str, kind: EntryKind, content: Option<Vec<u8>>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.next_id += 1;
            let path = RemotePath::parse(full).unwrap();
            let id = ObjectId::new(format!("id-{}", state.next_id)).unwrap();
            let entry = RemoteEntry::new(
                parent_container(&path),
                path.file_name().unwrap(),
                id,
                kind,
            );
            state.nodes.push(MockNode {
                entry,
                content,
                listed_under: None,
            });
        }
        self
    }

    pub fn folder(self, path: &str) -> Self {
        self.add(path, EntryKind::Folder, None)
    }

    pub fn file(self, path: &str, content: &[u8]) -> Self {
        self.add(path, EntryKind::File, Some(content.to_vec()))
    }

    pub fn other(self, path: &str) -> Self {
        self.add(path, EntryKind::Other, None)
    }

    /// Adds a raw entry exactly as given, bypassing path derivation
    pub fn raw(self, entry: RemoteEntry) -> Self {
        self.state.lock().unwrap().nodes.push(MockNode {
            entry,
            content: None,
            listed_under: None,
        });
        self
    }

    /// Adds a raw entry that is returned when listing `container`,
    /// whatever parent path the entry itself reports
    pub fn raw_under(self, container: &str, entry: RemoteEntry) -> Self {
        self.state.lock().unwrap().nodes.push(MockNode {
            entry,
            content: None,
            listed_under: Some(normalize(container)),
        });
        self
    }

    pub fn fail_list(mut self, path: &str) -> Self {
        self.failing_lists.insert(normalize(path));
        self
    }

    pub fn fail_info(mut self, path: &str) -> Self {
        self.failing_infos.insert(normalize(path));
        self
    }

    pub fn fail_download(mut self, path: &str) -> Self {
        self.failing_downloads.insert(normalize(path));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn id_of(&self, path: &str) -> ObjectId {
        let state = self.state.lock().unwrap();
        Self::find(&state, &normalize(path)).unwrap().entry.object_id.clone()
    }

    pub fn content_of(&self, path: &str) -> Option<Vec<u8>> {
        let state = self.state.lock().unwrap();
        Self::find(&state, &normalize(path)).and_then(|n| n.content.clone())
    }

    pub fn exists(&self, path: &str) -> bool {
        let state = self.state.lock().unwrap();
        Self::find(&state, &normalize(path)).is_some()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn find<'a>(state: &'a State, path: &str) -> Option<&'a MockNode> {
        state.nodes.iter().find(|n| {
            n.entry
                .full_path()
                .map(|p| p.as_str() == path)
                .unwrap_or(false)
        })
    }

    fn full_path_of_id(state: &State, id: &ObjectId) -> Option<String> {
        state
            .nodes
            .iter()
            .find(|n| &n.entry.object_id == id)
            .and_then(|n| n.entry.full_path().ok())
            .map(|p| p.as_str().to_string())
    }
}

#[async_trait]
impl IRemoteStorage for MockStorage {
    async fn get_info_by_path(&self, path: &str) -> anyhow::Result<RemoteEntry> {
        self.record(format!("info {path}"));
        let key = normalize(path);
        if self.failing_infos.contains(&key) {
            bail!("Server error: info {key}");
        }
        if key == "/" {
            return Ok(RemoteEntry::new(
                "/",
                "",
                ObjectId::new("root".to_string())?,
                EntryKind::Folder,
            ));
        }
        let state = self.state.lock().unwrap();
        Self::find(&state, &key)
            .map(|n| n.entry.clone())
            .ok_or_else(|| anyhow::Error::new(RemoteNotFound(key)))
    }

    async fn list_by_path(&self, path: &str) -> anyhow::Result<Vec<RemoteEntry>> {
        self.record(format!("list {path}"));
        let key = normalize(path);
        if self.failing_lists.contains(&key) {
            bail!("Server error: list {key}");
        }
        let state = self.state.lock().unwrap();
        Ok(state
            .nodes
            .iter()
            .filter(|n| match &n.listed_under {
                Some(container) => container == &key,
                None => normalize(&n.entry.path) == key,
            })
            .map(|n| n.entry.clone())
            .collect())
    }

    async fn create_by_path(
        &self,
        parent_path: &str,
        name: &str,
        kind: EntryKind,
    ) -> anyhow::Result<RemoteEntry> {
        self.record(format!("create {parent_path} {name} {kind}"));
        let parent = RemotePath::parse(parent_path)?;
        let full = parent.join(name)?;
        let mut state = self.state.lock().unwrap();
        if Self::find(&state, full.as_str()).is_some() {
            bail!("Conflict: {full} already exists");
        }
        state.next_id += 1;
        let id = ObjectId::new(format!("id-{}", state.next_id))?;
        let entry = RemoteEntry::new(parent.as_container(), name, id, kind);
        state.nodes.push(MockNode {
            entry: entry.clone(),
            content: None,
            listed_under: None,
        });
        Ok(entry)
    }

    async fn get_upload_target(
        &self,
        object_id: &ObjectId,
        size_bytes: u64,
    ) -> anyhow::Result<UploadTarget> {
        self.record(format!("upload-target {object_id} {size_bytes}"));
        let mut parameters = BTreeMap::new();
        parameters.insert("policy".to_string(), format!("policy-{object_id}"));
        Ok(UploadTarget {
            endpoint: format!("mock://upload/{object_id}"),
            parameters,
            storage_key: format!("key-{object_id}"),
        })
    }

    async fn upload_bytes(
        &self,
        endpoint: &str,
        parameters: &BTreeMap<String, String>,
        name: &str,
        data: Vec<u8>,
    ) -> anyhow::Result<()> {
        let policy = parameters.get("policy").cloned().unwrap_or_default();
        self.record(format!("upload {endpoint} {policy} {name}"));
        let id = endpoint
            .strip_prefix("mock://upload/")
            .ok_or_else(|| anyhow!("unknown endpoint {endpoint}"))?;
        self.state
            .lock()
            .unwrap()
            .pending_uploads
            .insert(format!("key-{id}"), data);
        Ok(())
    }

    async fn complete_upload(
        &self,
        object_id: &ObjectId,
        storage_key: &str,
    ) -> anyhow::Result<()> {
        self.record(format!("complete {object_id} {storage_key}"));
        let mut state = self.state.lock().unwrap();
        let data = state
            .pending_uploads
            .remove(storage_key)
            .ok_or_else(|| anyhow!("no pending upload for {storage_key}"))?;
        let node = state
            .nodes
            .iter_mut()
            .find(|n| &n.entry.object_id == object_id)
            .ok_or_else(|| anyhow::Error::new(RemoteNotFound(object_id.to_string())))?;
        node.content = Some(data);
        Ok(())
    }

    async fn download_bytes(&self, object_id: &ObjectId) -> anyhow::Result<Vec<u8>> {
        self.record(format!("download {object_id}"));
        let state = self.state.lock().unwrap();
        if let Some(path) = Self::full_path_of_id(&state, object_id) {
            if self.failing_downloads.contains(&path) {
                bail!("Server error: download {path}");
            }
        }
        state
            .nodes
            .iter()
            .find(|n| &n.entry.object_id == object_id)
            .and_then(|n| n.content.clone())
            .ok_or_else(|| anyhow::Error::new(RemoteNotFound(object_id.to_string())))
    }

    async fn move_by_path(
        &self,
        source_id: &ObjectId,
        dest_parent_id: &ObjectId,
        new_name: &str,
    ) -> anyhow::Result<()> {
        self.record(format!("move {source_id} {dest_parent_id} {new_name}"));
        let mut state = self.state.lock().unwrap();
        let dest_container = if dest_parent_id.as_str() == "root" {
            "/".to_string()
        } else {
            let dest = Self::full_path_of_id(&state, dest_parent_id)
                .ok_or_else(|| anyhow::Error::new(RemoteNotFound(dest_parent_id.to_string())))?;
            RemotePath::parse(&dest)?.as_container()
        };
        let node = state
            .nodes
            .iter_mut()
            .find(|n| &n.entry.object_id == source_id)
            .ok_or_else(|| anyhow::Error::new(RemoteNotFound(source_id.to_string())))?;
        node.entry.path = dest_container;
        node.entry.name = new_name.to_string();
        Ok(())
    }

    async fn delete_by_ids(&self, ids: &[ObjectId]) -> anyhow::Result<()> {
        let joined: Vec<&str> = ids.iter().map(|i| i.as_str()).collect();
        self.record(format!("delete {}", joined.join(",")));
        self.state
            .lock()
            .unwrap()
            .nodes
            .retain(|n| !ids.contains(&n.entry.object_id));
        Ok(())
    }
}
