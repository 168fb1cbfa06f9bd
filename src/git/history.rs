//! Per-path commit history.
//!
//! A commit touches a path when the object stored at that path differs from
//! what every parent stores there (for a root commit: the path exists).
//!
//! Merges are simplified the way `git log -- <path>` does it: when a merge
//! stores the same object at the path as one of its parents, only that
//! parent is followed, so changes discarded by the merge never show up.

use git2::{Oid, Repository};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::path::Path;

use crate::error::{RepositoryError, Result};
use crate::git::repository::GitRepository;
use crate::git::resolver::RefIndex;
use crate::models::Commit;
use crate::repository::split_path;

/// Id of the object at `path` inside `tree`; the tree itself for an empty path.
fn entry_id(tree: &git2::Tree, path: &str) -> Option<Oid> {
    if path.is_empty() {
        return Some(tree.id());
    }
    tree.get_path(Path::new(path)).ok().map(|e| e.id())
}

/// Newest-first walk over the commits touching `path`, with merge
/// simplification. An empty path yields every reachable commit.
pub(crate) struct PathWalk<'r> {
    repo: &'r Repository,
    path: String,
    // Max-heap on commit time; ties broken by id for a stable order.
    queue: BinaryHeap<(i64, Reverse<Oid>)>,
    seen: HashSet<Oid>,
}

impl<'r> PathWalk<'r> {
    pub fn new(repo: &'r Repository, start: &git2::Commit, path: &str) -> Self {
        let mut walk = Self {
            repo,
            path: path.to_string(),
            queue: BinaryHeap::new(),
            seen: HashSet::new(),
        };
        walk.enqueue(start);
        walk
    }

    fn enqueue(&mut self, commit: &git2::Commit) {
        if self.seen.insert(commit.id()) {
            self.queue.push((commit.time().seconds(), Reverse(commit.id())));
        }
    }

    /// Queue the parents worth following and report whether `commit` touches the path.
    fn visit(&mut self, commit: &git2::Commit<'r>) -> Result<bool> {
        let parents: Vec<git2::Commit<'r>> = commit.parents().collect();

        if self.path.is_empty() {
            for parent in &parents {
                self.enqueue(parent);
            }
            return Ok(true);
        }

        let current = entry_id(&commit.tree()?, &self.path);
        for parent in &parents {
            if entry_id(&parent.tree()?, &self.path) == current {
                self.enqueue(parent);
                return Ok(false);
            }
        }

        for parent in &parents {
            self.enqueue(parent);
        }
        Ok(!parents.is_empty() || current.is_some())
    }
}

impl<'r> Iterator for PathWalk<'r> {
    type Item = Result<git2::Commit<'r>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (_, Reverse(oid)) = self.queue.pop()?;
            let commit = match self.repo.find_commit(oid) {
                Ok(commit) => commit,
                Err(e) => return Some(Err(e.into())),
            };
            match self.visit(&commit) {
                Ok(true) => return Some(Ok(commit)),
                Ok(false) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Lazy walk over the commits touching one path, newest first.
pub struct History<'r> {
    walk: PathWalk<'r>,
    refs: RefIndex,
    skip: usize,
    remaining: Option<usize>,
}

impl Iterator for History<'_> {
    type Item = Result<Commit>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.remaining == Some(0) {
                return None;
            }

            let commit = match self.walk.next()? {
                Ok(commit) => commit,
                Err(e) => return Some(Err(e)),
            };

            if self.skip > 0 {
                self.skip -= 1;
                continue;
            }

            if let Some(remaining) = self.remaining.as_mut() {
                *remaining -= 1;
            }
            return Some(Ok(self.refs.to_commit(&commit)));
        }
    }
}

impl GitRepository {
    pub(crate) fn path_history(
        &self,
        path: &str,
        limit: Option<usize>,
        skip: usize,
    ) -> Result<History<'_>> {
        let (revision, subpath) = split_path(path);
        let commit = self.find_commit(revision)?;

        if entry_id(&commit.tree()?, &subpath).is_none() {
            return Err(RepositoryError::PathNotFound(path.to_string()));
        }

        Ok(History {
            walk: PathWalk::new(&self.repo, &commit, &subpath),
            refs: RefIndex::load(&self.repo)?,
            skip,
            remaining: limit,
        })
    }
}

/// Last commit touching each of `paths`, relative to `start`.
///
/// Same answer as the first element of each path's history.
pub(crate) fn last_commits_for_paths(
    repo: &Repository,
    start: Oid,
    paths: &[String],
    refs: &RefIndex,
) -> Result<HashMap<String, Commit>> {
    let mut results: HashMap<String, Commit> = HashMap::new();
    if paths.is_empty() {
        return Ok(results);
    }

    let start = repo.find_commit(start)?;
    // Commits touching several children are converted once.
    let mut models: HashMap<Oid, Commit> = HashMap::new();

    let walk_start = std::time::Instant::now();
    for path in paths {
        let Some(commit) = PathWalk::new(repo, &start, path).next().transpose()? else {
            continue;
        };
        let model = models
            .entry(commit.id())
            .or_insert_with(|| refs.to_commit(&commit))
            .clone();
        results.insert(path.clone(), model);
    }

    tracing::debug!(
        "Resolved last commits for {} paths in {:?}",
        results.len(),
        walk_start.elapsed()
    );

    Ok(results)
}
