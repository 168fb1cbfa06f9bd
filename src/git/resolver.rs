//! Revision resolution.
//!
//! A full 40-character hex id is taken as-is without touching the backend.
//! Ids are accepted in either case and always returned lowercase.
//! Anything else is matched against branch names, then tag names, then
//! tried as an abbreviated commit id.

use git2::{Oid, Repository};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{RepositoryError, Result};
use crate::git::repository::commit_to_model;
use crate::models::Commit;

pub const HASH_LEN: usize = 40;

/// Shortest abbreviated id accepted.
const MIN_ABBREV_LEN: usize = 4;

pub fn is_full_hash(reference: &str) -> bool {
    reference.len() == HASH_LEN && is_hex(reference)
}

fn is_abbreviated_hash(reference: &str) -> bool {
    (MIN_ABBREV_LEN..HASH_LEN).contains(&reference.len()) && is_hex(reference)
}

fn is_hex(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Resolve `reference` in the repository at `repository` to a commit id.
///
/// Returns `Ok(None)` when nothing matches. Used by cache keys, which must
/// not pay for opening the full facade.
pub fn resolve_ref<P: AsRef<Path>>(repository: P, reference: &str) -> Result<Option<String>> {
    let path = repository.as_ref();
    if !path.exists() {
        return Err(RepositoryError::RepositoryDoesNotExist(
            path.to_string_lossy().to_string(),
        ));
    }

    if is_full_hash(reference) {
        return Ok(Some(reference.to_ascii_lowercase()));
    }

    let repo = Repository::open(path).map_err(|_| {
        RepositoryError::NotAVersionControlRepository(path.to_string_lossy().to_string())
    })?;
    Ok(resolve_in(&repo, reference)?.map(|oid| oid.to_string()))
}

pub(crate) fn resolve_in(repo: &Repository, reference: &str) -> Result<Option<Oid>> {
    if is_full_hash(reference) {
        return Ok(Some(Oid::from_str(&reference.to_ascii_lowercase())?));
    }

    if reference == "HEAD" {
        return Ok(repo.head().and_then(|h| h.peel_to_commit()).ok().map(|c| c.id()));
    }

    let head_name = format!("refs/heads/{}", reference);
    let tag_name = format!("refs/tags/{}", reference);
    let mut tag_match = None;

    for r in repo.references()? {
        let r = r?;
        let name = r.name();
        if name == Some(head_name.as_str()) {
            if let Ok(commit) = r.peel_to_commit() {
                return Ok(Some(commit.id()));
            }
        } else if name == Some(tag_name.as_str()) && tag_match.is_none() {
            tag_match = r.peel_to_commit().ok().map(|c| c.id());
        }
    }

    if tag_match.is_some() {
        return Ok(tag_match);
    }

    if is_abbreviated_hash(reference) {
        let found = repo
            .revparse_single(&reference.to_ascii_lowercase())
            .and_then(|obj| obj.peel_to_commit())
            .ok()
            .map(|c| c.id());
        return Ok(found);
    }

    Ok(None)
}

/// Commit ids currently pointed at by branches and tags.
///
/// Loaded once per operation so decorating many commits costs one ref scan.
pub(crate) struct RefIndex {
    branches: HashSet<Oid>,
    tags: HashSet<Oid>,
}

impl RefIndex {
    pub fn load(repo: &Repository) -> Result<Self> {
        let mut branches = HashSet::new();
        let mut tags = HashSet::new();

        for r in repo.references()? {
            let r = r?;
            let Ok(commit) = r.peel_to_commit() else {
                continue;
            };
            if r.is_branch() {
                branches.insert(commit.id());
            } else if r.is_tag() {
                tags.insert(commit.id());
            }
        }

        Ok(Self { branches, tags })
    }

    pub fn is_branch(&self, oid: Oid) -> bool {
        self.branches.contains(&oid)
    }

    pub fn is_tag(&self, oid: Oid) -> bool {
        self.tags.contains(&oid)
    }

    pub fn to_commit(&self, commit: &git2::Commit) -> Commit {
        commit_to_model(commit, self.is_branch(commit.id()), self.is_tag(commit.id()))
    }
}
