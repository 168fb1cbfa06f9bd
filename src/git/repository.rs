use chrono::DateTime;
use git2::{BranchType, Sort};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{Config, NAME_PLACEHOLDER};
use crate::error::{RepositoryError, Result};
use crate::git::resolver::{self, RefIndex};
use crate::models::{
    Archive, BlameGroup, Blob, Branch, Commit, Diff, RepositorySummary, Signature,
};
use crate::repository::{Node, Repository};

/// Marker file in the git directory that publishes a repository.
pub const EXPORT_FLAG_FILE: &str = "git-daemon-export-ok";

/// Facade over one on-disk git repository.
///
/// Built per request and never shared between threads; all reads go through
/// the single `git2::Repository` handle it owns.
pub struct GitRepository {
    pub(crate) repo: git2::Repository,
    path: PathBuf,
    name: String,
    description: Option<String>,
    clone_url_templates: BTreeMap<String, String>,
}

impl GitRepository {
    /// Open a repository, failing with `EmptyRepository` if it has no branches.
    pub fn open<P: AsRef<Path>>(path: P, config: &Config) -> Result<Self> {
        Self::open_with(path, config, false)
    }

    /// Open a repository even if it is empty.
    pub fn open_forced<P: AsRef<Path>>(path: P, config: &Config) -> Result<Self> {
        Self::open_with(path, config, true)
    }

    fn open_with<P: AsRef<Path>>(path: P, config: &Config, force: bool) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.to_string_lossy().to_string();

        if !path.exists() {
            return Err(RepositoryError::RepositoryDoesNotExist(path_str));
        }

        let repo = git2::Repository::open(path)
            .map_err(|_| RepositoryError::NotAVersionControlRepository(path_str.clone()))?;

        if config.preserve_export_flag && !has_export_flag(&repo) {
            return Err(RepositoryError::NotAVersionControlRepository(path_str));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path_str.clone());

        let description = fs::read_to_string(repo.path().join("description"))
            .ok()
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let repository = Self {
            repo,
            path: path.to_path_buf(),
            name,
            description,
            clone_url_templates: config.clone_urls.clone(),
        };

        if !force && repository.is_empty() {
            return Err(RepositoryError::EmptyRepository(repository.name));
        }

        tracing::debug!("Opened repository {} at {}", repository.name, path_str);
        Ok(repository)
    }

    /// Whether `path` is a git repository that may be served under `config`.
    pub fn is_repository<P: AsRef<Path>>(path: P, config: &Config) -> bool {
        let path = path.as_ref();
        if !path.exists() {
            return false;
        }
        match git2::Repository::open(path) {
            Ok(repo) => !config.preserve_export_flag || has_export_flag(&repo),
            Err(_) => false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn summary(&self) -> RepositorySummary {
        RepositorySummary {
            name: self.name.clone(),
            description: self.description.clone(),
            is_empty: self.is_empty(),
            is_bare: self.is_bare(),
        }
    }

    /// Look up the git2 commit a revision resolves to.
    pub(crate) fn find_commit(&self, revision: &str) -> Result<git2::Commit<'_>> {
        let not_found = || RepositoryError::NoSuchRevision(revision.to_string());
        let oid = resolver::resolve_in(&self.repo, revision)
            .map_err(|_| not_found())?
            .ok_or_else(not_found)?;
        self.repo
            .find_object(oid, None)
            .and_then(|obj| obj.peel_to_commit())
            .map_err(|_| not_found())
    }

    /// Revwalk over everything reachable from `revision`, newest first.
    pub(crate) fn revwalk_from(&self, revision: &str) -> Result<git2::Revwalk<'_>> {
        let start = self.find_commit(revision)?.id();
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        revwalk.push(start)?;
        Ok(revwalk)
    }

    fn refs_to_branches(&self, kind: &str) -> Result<Vec<Branch>> {
        let refs = RefIndex::load(&self.repo)?;
        let prefix = format!("refs/{}/", kind);
        let mut branches = Vec::new();

        for r in self.repo.references()? {
            let r = r?;
            let Some(name) = r.name().and_then(|n| n.strip_prefix(prefix.as_str())) else {
                continue;
            };
            let name = name.to_string();
            let Ok(commit) = r.peel_to_commit() else {
                continue;
            };
            branches.push(Branch {
                name,
                commit: refs.to_commit(&commit),
            });
        }

        Ok(branches)
    }
}

fn has_export_flag(repo: &git2::Repository) -> bool {
    repo.path().join(EXPORT_FLAG_FILE).exists()
}

pub fn commit_to_model(commit: &git2::Commit, is_branch: bool, is_tag: bool) -> Commit {
    let author = commit.author();
    let committer = commit.committer();
    let seconds = commit.time().seconds();
    Commit {
        id: commit.id().to_string(),
        author: Signature {
            name: author.name().unwrap_or("Unknown").to_string(),
            email: author.email().unwrap_or("").to_string(),
        },
        committer: Signature {
            name: committer.name().unwrap_or("Unknown").to_string(),
            email: committer.email().unwrap_or("").to_string(),
        },
        committed_date: seconds,
        committed_at: DateTime::from_timestamp(seconds, 0).unwrap_or_default(),
        message: commit.message().unwrap_or("").to_string(),
        summary: commit.summary().unwrap_or("").to_string(),
        parents: commit.parent_ids().map(|id| id.to_string()).collect(),
        tree_id: commit.tree_id().to_string(),
        is_branch,
        is_tag,
        diffs: Default::default(),
    }
}

impl Repository for GitRepository {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn is_empty(&self) -> bool {
        self.repo
            .branches(Some(BranchType::Local))
            .map(|mut branches| branches.next().is_none())
            .unwrap_or(true)
    }

    fn is_bare(&self) -> bool {
        self.repo.is_bare()
    }

    fn active_branch(&self) -> Result<String> {
        let no_head = || RepositoryError::NoSuchRevision("HEAD".to_string());
        let head = self.repo.find_reference("HEAD").map_err(|_| no_head())?;

        match head.symbolic_target() {
            Some(target) => target
                .strip_prefix("refs/heads/")
                .map(str::to_string)
                .ok_or_else(no_head),
            None => head.target().map(|oid| oid.to_string()).ok_or_else(no_head),
        }
    }

    fn resolve_ref(&self, reference: &str) -> Result<Option<String>> {
        if resolver::is_full_hash(reference) {
            return Ok(Some(reference.to_ascii_lowercase()));
        }
        Ok(resolver::resolve_in(&self.repo, reference)?.map(|oid| oid.to_string()))
    }

    fn commit(&self, revision: &str) -> Result<Commit> {
        let commit = self.find_commit(revision)?;
        let refs = RefIndex::load(&self.repo)?;
        Ok(refs.to_commit(&commit))
    }

    fn diffs<'c>(&self, commit: &'c Commit) -> Result<&'c [Diff]> {
        if let Some(diffs) = commit.diffs.get() {
            return Ok(diffs);
        }
        let diffs = self.commit_diffs(&commit.id)?;
        Ok(commit.diffs.get_or_init(|| diffs))
    }

    fn traverse(&self, path: &str, with_history: bool) -> Result<Node> {
        self.traverse_path(path, with_history)
    }

    fn blob_data<'b>(&self, blob: &'b Blob) -> Result<&'b [u8]> {
        if let Some(data) = blob.data.get() {
            return Ok(data);
        }
        let oid = git2::Oid::from_str(&blob.id)?;
        let data = self.repo.find_blob(oid)?.content().to_vec();
        Ok(blob.data.get_or_init(|| data))
    }

    fn history(
        &self,
        path: &str,
        limit: Option<usize>,
        skip: usize,
    ) -> Result<Box<dyn Iterator<Item = Result<Commit>> + '_>> {
        Ok(Box::new(self.path_history(path, limit, skip)?))
    }

    fn blame(&self, path: &str) -> Result<Vec<BlameGroup>> {
        self.blame_path(path)
    }

    fn branches(&self) -> Result<Vec<Branch>> {
        let mut branches = self.refs_to_branches("heads")?;
        branches.sort_by(|a, b| {
            b.commit
                .committed_date
                .cmp(&a.commit.committed_date)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(branches)
    }

    fn tags(&self) -> Result<Vec<Branch>> {
        let mut tags = self.refs_to_branches("tags")?;
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    fn archive(&self, revision: &str) -> Result<Archive> {
        self.archive_revision(revision)
    }

    fn last_activities(&self, revision: &str, count: usize, skip: usize) -> Result<Vec<Commit>> {
        let refs = RefIndex::load(&self.repo)?;
        let mut commits = Vec::new();

        for oid in self.revwalk_from(revision)?.skip(skip).take(count) {
            let commit = self.repo.find_commit(oid?)?;
            commits.push(refs.to_commit(&commit));
        }

        Ok(commits)
    }

    fn commit_count(&self, revision: &str) -> Result<usize> {
        let mut count = 0;
        for oid in self.revwalk_from(revision)? {
            oid?;
            count += 1;
        }
        Ok(count)
    }

    fn clone_urls(&self) -> BTreeMap<String, String> {
        self.clone_url_templates
            .iter()
            .map(|(protocol, pattern)| {
                (protocol.clone(), pattern.replace(NAME_PLACEHOLDER, &self.name))
            })
            .collect()
    }
}
