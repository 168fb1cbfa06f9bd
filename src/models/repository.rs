//! Repository-level values returned by facade conveniences.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReadmeKind {
    Markdown,
    /// reStructuredText. Rendered as escaped `<pre>` text, not converted.
    Rst,
    Plain,
}

/// README rendered to HTML.
#[derive(Debug, Clone, Serialize)]
pub struct Readme {
    pub name: String,
    pub content: String,
    pub kind: ReadmeKind,
}

/// A submodule entry from `.gitmodules`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Submodule {
    pub name: String,
    /// Directory containing the submodule; empty at the root.
    pub path_base: String,
    /// Final path segment of the submodule.
    pub path_name: String,
    pub url: String,
}

/// A tar.gz snapshot of one revision.
#[derive(Debug, Clone)]
pub struct Archive {
    pub filename: String,
    pub mime_type: &'static str,
    pub data: Vec<u8>,
}

/// Listing entry for the repository index.
#[derive(Debug, Clone, Serialize)]
pub struct RepositorySummary {
    pub name: String,
    pub description: Option<String>,
    pub is_empty: bool,
    pub is_bare: bool,
}
