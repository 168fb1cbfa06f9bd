//! git2-backed implementation of [`crate::repository::Repository`].
//!
//! - `repository`: construction, commit lookup, refs, activity feed
//! - `resolver`: revision strings to commit ids, ref decoration
//! - `tree`: path traversal and tree listings
//! - `history`: per-path commit history
//! - `blame`: line attribution
//! - `diff`: per-commit diffs and stats
//! - `archive`: tar.gz export

pub mod archive;
pub mod blame;
pub mod diff;
pub mod history;
pub mod repository;
pub mod resolver;
pub mod tree;

pub use repository::GitRepository;
pub use resolver::resolve_ref;
