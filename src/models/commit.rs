use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cell::OnceCell;

use super::{Diff, Stats};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Commit {
    pub id: String,
    pub author: Signature,
    pub committer: Signature,
    /// Committer time, seconds since the epoch.
    pub committed_date: i64,
    /// `committed_date` as a UTC timestamp, serialized as RFC 3339.
    pub committed_at: DateTime<Utc>,
    pub message: String,
    pub summary: String,
    /// Parent ids; empty for a root commit, two or more for merges.
    pub parents: Vec<String>,
    pub tree_id: String,
    /// Some branch currently points at this commit.
    pub is_branch: bool,
    /// Some tag currently points at this commit.
    pub is_tag: bool,
    #[serde(skip)]
    pub(crate) diffs: OnceCell<Vec<Diff>>,
}

/// Length of the abbreviated ids used in archive names.
pub const SHORT_ID_LEN: usize = 8;

pub fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

impl Commit {
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// Diffs already computed for this commit, if any.
    pub fn cached_diffs(&self) -> Option<&[Diff]> {
        self.diffs.get().map(Vec::as_slice)
    }

    /// Stats derived from already computed diffs.
    pub fn cached_stats(&self) -> Option<Stats> {
        self.cached_diffs().map(Stats::from_diffs)
    }
}

impl PartialEq for Commit {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Commit {}

/// A named ref (branch or tag) and the commit it resolves to.
#[derive(Debug, Clone, Serialize)]
pub struct Branch {
    pub name: String,
    pub commit: Commit,
}
