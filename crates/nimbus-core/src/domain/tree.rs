//! Order-preserving map of a remote hierarchy
//!
//! Keys are full remote paths. Iteration follows discovery order, and
//! [`MirrorTree::materialization_order`] gives a depth-sorted view in which
//! every folder precedes everything nested under it.

use std::collections::HashMap;

use super::entry::RemoteEntry;
use super::newtypes::RemotePath;

/// Mapping from absolute remote path to the entry found there
#[derive(Debug, Clone, Default)]
pub struct MirrorTree {
    entries: Vec<(RemotePath, RemoteEntry)>,
    index: HashMap<RemotePath, usize>,
}

impl MirrorTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `path -> entry`
    ///
    /// A path seen before keeps its original position and has its entry
    /// replaced (last write wins). Returns the replaced entry, if any.
    pub fn insert(&mut self, path: RemotePath, entry: RemoteEntry) -> Option<RemoteEntry> {
        if let Some(&idx) = self.index.get(&path) {
            return Some(std::mem::replace(&mut self.entries[idx].1, entry));
        }
        self.index.insert(path.clone(), self.entries.len());
        self.entries.push((path, entry));
        None
    }

    pub fn get(&self, path: &RemotePath) -> Option<&RemoteEntry> {
        self.index.get(path).map(|&idx| &self.entries[idx].1)
    }

    pub fn contains(&self, path: &RemotePath) -> bool {
        self.index.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in discovery order
    pub fn iter(&self) -> impl Iterator<Item = (&RemotePath, &RemoteEntry)> {
        self.entries.iter().map(|(p, e)| (p, e))
    }

    /// Keys in discovery order
    pub fn paths(&self) -> impl Iterator<Item = &RemotePath> {
        self.entries.iter().map(|(p, _)| p)
    }

    /// Entries sorted by path depth, ties kept in discovery order
    ///
    /// Materializing in this order guarantees a folder's directory exists
    /// before any entry below it is written.
    pub fn materialization_order(&self) -> Vec<(&RemotePath, &RemoteEntry)> {
        let mut ordered: Vec<_> = self.iter().collect();
        ordered.sort_by_key(|(path, _)| path.depth());
        ordered
    }
}
