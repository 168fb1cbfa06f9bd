//! Read-only value types produced by the repository layer.
//!
//! Everything here is content-addressed and immutable once built. The only
//! interior state is memoization of derived data (blob bytes, commit diffs),
//! filled at most once per instance.
//!
//! - `commit`: Commit, Signature, Branch
//! - `tree`: Tree, TreeEntry, Blob
//! - `diff`: Diff, DiffStatus, Stats
//! - `blame`: BlameGroup
//! - `repository`: Readme, Submodule, Archive, RepositorySummary

pub mod blame;
pub mod commit;
pub mod diff;
pub mod repository;
pub mod tree;

pub use blame::*;
pub use commit::*;
pub use diff::*;
pub use repository::*;
pub use tree::*;
