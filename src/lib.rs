//! Read-only browsing of git repositories.
//!
//! The core is the [`repository::Repository`] trait and its git2
//! implementation [`git::GitRepository`]: revision resolution, path
//! traversal, history, blame, diffs and archive export over a
//! `<revision>/<subpath>` namespace. Everything else is thin glue around it.
//!
//! - [`models`] - immutable values handed to callers
//! - [`error`] - typed failures
//! - [`config`] - explicit configuration
//! - [`registry`] - repositories under the configured root
//! - [`cache`] - response cache port keyed by resolved revisions
//! - [`routes`] - HTTP endpoints

pub mod cache;
pub mod config;
pub mod error;
pub mod git;
pub mod mime;
pub mod models;
pub mod readme;
pub mod registry;
pub mod repository;
pub mod routes;
pub mod submodule;

pub use config::Config;
pub use error::{RepositoryError, Result};
pub use git::GitRepository;
pub use repository::{Node, Repository};
