//! Per-commit change data.
//!
//! - `Diff`: one changed file against the first parent, with its patch text
//! - `DiffStatus`: kind of change
//! - `Stats`: per-file insertion/deletion counts plus totals

use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiffStatus {
    Added,
    Deleted,
    Modified,
    Renamed,
    Copied,
    TypeChanged,
    Unmodified,
}

#[derive(Debug, Clone, Serialize)]
pub struct Diff {
    pub a_path: Option<String>,
    pub b_path: Option<String>,
    pub status: DiffStatus,
    pub rename_from: Option<String>,
    pub rename_to: Option<String>,
    pub is_binary: bool,
    /// Unified diff text for this file.
    pub patch: String,
    pub insertions: usize,
    pub deletions: usize,
}

impl Diff {
    pub fn is_new_file(&self) -> bool {
        self.status == DiffStatus::Added
    }

    pub fn is_deleted_file(&self) -> bool {
        self.status == DiffStatus::Deleted
    }

    /// Path the change is reported under: the new path, or the old one for deletions.
    pub fn path(&self) -> &str {
        self.b_path
            .as_deref()
            .or(self.a_path.as_deref())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Default, PartialEq, Eq)]
pub struct FileStats {
    pub insertions: usize,
    pub deletions: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Default, PartialEq, Eq)]
pub struct TotalStats {
    pub files: usize,
    pub insertions: usize,
    pub deletions: usize,
}

#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct Stats {
    pub files: BTreeMap<String, FileStats>,
    pub total: TotalStats,
}

impl Stats {
    pub fn from_diffs(diffs: &[Diff]) -> Self {
        let mut stats = Stats::default();
        for diff in diffs {
            let file = stats.files.entry(diff.path().to_string()).or_default();
            file.insertions += diff.insertions;
            file.deletions += diff.deletions;
            stats.total.insertions += diff.insertions;
            stats.total.deletions += diff.deletions;
        }
        stats.total.files = stats.files.len();
        stats
    }
}
