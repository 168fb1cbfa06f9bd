//! Blame data.
//!
//! A file's blame is a list of `BlameGroup`s in line order. Groups are
//! contiguous and non-overlapping and together cover every line of the file.

use serde::Serialize;

use super::Commit;

/// A run of consecutive lines last modified by the same commit.
#[derive(Debug, Clone, Serialize)]
pub struct BlameGroup {
    pub commit: Commit,
    /// First line of the group (1-indexed)
    pub start_line: usize,
    pub lines: Vec<String>,
}

impl BlameGroup {
    /// One past the last line of the group (1-indexed)
    pub fn end_line(&self) -> usize {
        self.start_line + self.lines.len()
    }
}
