use serde::Serialize;
use std::cell::OnceCell;
use std::cmp::Ordering;

use super::Commit;

#[derive(Debug, Clone, Serialize)]
pub struct Tree {
    pub id: String,
    /// Entry name; empty for a root tree.
    pub name: String,
    /// Path below the revision root; empty for a root tree.
    pub path: String,
    /// Sub-trees first, then blobs, each group ordered by name.
    pub entries: Vec<TreeEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TreeEntry {
    pub id: String,
    pub name: String,
    pub path: String,
    pub is_tree: bool,
    pub mode: i32,
    /// Byte size, blobs only.
    pub size: Option<u64>,
    /// Last commit touching this entry, only when history was requested.
    pub last_commit: Option<Commit>,
}

impl Tree {
    pub fn new(id: String, name: String, path: String, mut entries: Vec<TreeEntry>) -> Self {
        sort_entries(&mut entries);
        Self {
            id,
            name,
            path,
            entries,
        }
    }

    pub fn entry(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn trees(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.iter().filter(|e| e.is_tree)
    }

    pub fn blobs(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.iter().filter(|e| !e.is_tree)
    }
}

/// Trees before blobs, then ascending by name within each group.
pub fn sort_entries(entries: &mut [TreeEntry]) {
    entries.sort_by(|a, b| match (a.is_tree, b.is_tree) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.name.cmp(&b.name),
    });
}

#[derive(Debug, Clone, Serialize)]
pub struct Blob {
    pub id: String,
    pub name: String,
    pub path: String,
    pub size: u64,
    pub mode: i32,
    pub mime_type: String,
    #[serde(skip)]
    pub(crate) data: OnceCell<Vec<u8>>,
}

impl Blob {
    /// Content bytes if they were already loaded.
    pub fn cached_data(&self) -> Option<&[u8]> {
        self.data.get().map(Vec::as_slice)
    }
}

impl PartialEq for Blob {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.path == other.path
    }
}
