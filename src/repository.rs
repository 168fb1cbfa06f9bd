//! The repository capability interface.
//!
//! Every backend implements `Repository`. Paths handed to path-taking
//! operations have the form `<revision>/<subpath...>`: the first segment is
//! a branch name, tag name or commit hash, the rest descends through trees.
//!
//! Conveniences that only need primitive operations (README lookup, license
//! check, submodule listing, raw export) are default methods, so a backend
//! gets them for free.

use std::collections::BTreeMap;

use crate::error::{RepositoryError, Result};
use crate::models::{
    Archive, BlameGroup, Blob, Branch, Commit, Diff, Readme, Stats, Submodule, Tree,
};
use crate::{readme, submodule};

/// File names checked, in order, by [`Repository::license`].
pub const LICENSE_FILES: [&str; 4] = ["LICENSE", "LICENSE.md", "LICENSE.txt", "COPYING"];

/// Result of walking a path: either a directory listing or a file.
#[derive(Debug, Clone)]
pub enum Node {
    Tree(Tree),
    Blob(Blob),
}

/// Split `<revision>/<subpath>` into the revision and a normalized subpath.
///
/// Empty segments are dropped, so `"master/"`, `"master"` and `"master//"`
/// all address the root tree.
pub fn split_path(path: &str) -> (&str, String) {
    let (revision, rest) = path.split_once('/').unwrap_or((path, ""));
    let subpath = rest
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    (revision, subpath)
}

pub trait Repository {
    fn name(&self) -> &str;

    fn description(&self) -> Option<&str>;

    /// True when the repository has no branches.
    fn is_empty(&self) -> bool;

    fn is_bare(&self) -> bool;

    /// Branch HEAD points to, or the commit id of a detached HEAD.
    fn active_branch(&self) -> Result<String>;

    /// Resolve a branch, tag or hash to a commit id. `None` if nothing matches.
    fn resolve_ref(&self, reference: &str) -> Result<Option<String>>;

    fn commit(&self, revision: &str) -> Result<Commit>;

    /// Changes against the first parent, computed once per commit instance.
    fn diffs<'c>(&self, commit: &'c Commit) -> Result<&'c [Diff]>;

    fn stats(&self, commit: &Commit) -> Result<Stats> {
        Ok(Stats::from_diffs(self.diffs(commit)?))
    }

    /// Walk `<revision>/<subpath>`. With `with_history`, every child of a
    /// returned tree carries the last commit that touched it.
    fn traverse(&self, path: &str, with_history: bool) -> Result<Node>;

    fn tree(&self, path: &str, with_history: bool) -> Result<Tree> {
        match self.traverse(path, with_history)? {
            Node::Tree(tree) => Ok(tree),
            Node::Blob(_) => Err(RepositoryError::PathNotFound(path.to_string())),
        }
    }

    fn blob(&self, path: &str) -> Result<Blob> {
        match self.traverse(path, false)? {
            Node::Blob(blob) => Ok(blob),
            Node::Tree(_) => Err(RepositoryError::PathNotFound(path.to_string())),
        }
    }

    /// Content of a blob, loaded once per blob instance.
    fn blob_data<'b>(&self, blob: &'b Blob) -> Result<&'b [u8]>;

    /// Commits touching the path, newest first. Each call walks afresh.
    fn history(
        &self,
        path: &str,
        limit: Option<usize>,
        skip: usize,
    ) -> Result<Box<dyn Iterator<Item = Result<Commit>> + '_>>;

    fn blame(&self, path: &str) -> Result<Vec<BlameGroup>>;

    /// Local branches, most recently committed first.
    fn branches(&self) -> Result<Vec<Branch>>;

    fn tags(&self) -> Result<Vec<Branch>>;

    /// tar.gz snapshot of a revision.
    fn archive(&self, revision: &str) -> Result<Archive>;

    /// Most recent commits reachable from `revision`.
    fn last_activities(&self, revision: &str, count: usize, skip: usize) -> Result<Vec<Commit>>;

    fn commit_count(&self, revision: &str) -> Result<usize>;

    /// Clone URL per protocol.
    fn clone_urls(&self) -> BTreeMap<String, String>;

    /// First README found at the root of the active branch, rendered to HTML.
    fn readme(&self) -> Result<Option<Readme>> {
        let branch = self.active_branch()?;
        for (name, kind) in readme::CANDIDATES {
            let blob = match self.blob(&format!("{}/{}", branch, name)) {
                Ok(blob) => blob,
                Err(RepositoryError::PathNotFound(_)) => continue,
                Err(e) => return Err(e),
            };
            let source = String::from_utf8_lossy(self.blob_data(&blob)?);
            return Ok(Some(Readme {
                name: name.to_string(),
                content: readme::render(kind, &source),
                kind,
            }));
        }
        Ok(None)
    }

    /// Path of the license file on the active branch, if there is one.
    fn license(&self) -> Result<Option<String>> {
        let branch = self.active_branch()?;
        for name in LICENSE_FILES {
            let path = format!("{}/{}", branch, name);
            match self.blob(&path) {
                Ok(_) => return Ok(Some(path)),
                Err(RepositoryError::PathNotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    /// Submodules declared directly under `base`, sorted by path name.
    fn submodules(&self, base: &str, revision: &str) -> Result<Vec<Submodule>> {
        let blob = match self.blob(&format!("{}/.gitmodules", revision)) {
            Ok(blob) => blob,
            Err(RepositoryError::PathNotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        let config = String::from_utf8_lossy(self.blob_data(&blob)?);
        let base = base.trim_matches('/');
        let mut modules: Vec<Submodule> = submodule::parse(&config)?
            .into_iter()
            .filter(|m| m.path_base == base)
            .collect();
        modules.sort_by(|a, b| a.path_name.cmp(&b.path_name));
        Ok(modules)
    }

    /// Blob bytes and MIME type, served unmodified.
    fn raw(&self, path: &str) -> Result<(Vec<u8>, String)> {
        let blob = self.blob(path)?;
        let data = self.blob_data(&blob)?.to_vec();
        Ok((data, blob.mime_type))
    }
}
