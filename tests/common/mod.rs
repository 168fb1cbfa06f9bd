//! Test fixtures: real git repositories built with git2 inside a TempDir.
//!
//! Commits get deterministic signatures and strictly increasing timestamps
//! so history ordering is predictable.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use git2::build::TreeUpdateBuilder;
use git2::{FileMode, Oid, Repository, RepositoryInitOptions, Signature, Time};
use tempfile::TempDir;

use git_browse::config::Config;
use git_browse::git::repository::EXPORT_FLAG_FILE;

pub const START_TIME: i64 = 1_600_000_000;

/// A directory acting as the repository root.
pub struct Root {
    pub dir: TempDir,
}

impl Root {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Config serving everything under this root, export markers ignored.
    pub fn config(&self) -> Config {
        let mut config = Config::with_root(self.path());
        config.preserve_export_flag = false;
        config
    }

    pub fn repo(&self, name: &str) -> TestRepo {
        TestRepo::init(&self.path().join(name))
    }
}

pub enum Change<'a> {
    Write(&'a str, &'a [u8]),
    Executable(&'a str, &'a [u8]),
    Symlink(&'a str, &'a str),
    Remove(&'a str),
}

pub struct TestRepo {
    pub repo: Repository,
    pub path: PathBuf,
    time: i64,
}

impl TestRepo {
    /// Bare repository whose HEAD points at `master`.
    pub fn init(path: &Path) -> Self {
        let mut opts = RepositoryInitOptions::new();
        opts.bare(true).initial_head("master");
        let repo = Repository::init_opts(path, &opts).expect("failed to init repository");
        Self {
            repo,
            path: path.to_path_buf(),
            time: START_TIME,
        }
    }

    /// Handle on an existing fixture repository; new commits sort after old ones.
    pub fn reopen(path: &Path) -> Self {
        Self {
            repo: Repository::open(path).expect("failed to open repository"),
            path: path.to_path_buf(),
            time: START_TIME + 1_000_000,
        }
    }

    fn signature(&self) -> Signature<'static> {
        Signature::new("Test User", "test@example.com", &Time::new(self.time, 0)).unwrap()
    }

    fn tip(&self, branch: &str) -> Option<git2::Commit<'_>> {
        self.repo
            .find_reference(&format!("refs/heads/{}", branch))
            .ok()
            .and_then(|r| r.peel_to_commit().ok())
    }

    /// Tree of `base` (or the empty tree) with `changes` applied.
    fn build_tree(&self, base: Option<&git2::Commit>, changes: &[Change]) -> Oid {
        let baseline = match base {
            Some(commit) => commit.tree().unwrap(),
            None => {
                let empty = self.repo.treebuilder(None).unwrap().write().unwrap();
                self.repo.find_tree(empty).unwrap()
            }
        };

        let mut update = TreeUpdateBuilder::new();
        for change in changes {
            match change {
                Change::Write(path, data) => {
                    let blob = self.repo.blob(data).unwrap();
                    update.upsert(*path, blob, FileMode::Blob);
                }
                Change::Executable(path, data) => {
                    let blob = self.repo.blob(data).unwrap();
                    update.upsert(*path, blob, FileMode::BlobExecutable);
                }
                Change::Symlink(path, target) => {
                    let blob = self.repo.blob(target.as_bytes()).unwrap();
                    update.upsert(*path, blob, FileMode::Link);
                }
                Change::Remove(path) => {
                    update.remove(*path);
                }
            }
        }
        update.create_updated(&self.repo, &baseline).unwrap()
    }

    fn write_commit(&mut self, branch: &str, message: &str, tree: Oid, parents: &[Oid]) -> Oid {
        self.time += 60;
        let sig = self.signature();
        let tree = self.repo.find_tree(tree).unwrap();
        let parents: Vec<git2::Commit> = parents
            .iter()
            .map(|id| self.repo.find_commit(*id).unwrap())
            .collect();
        let parents: Vec<&git2::Commit> = parents.iter().collect();
        self.repo
            .commit(
                Some(&format!("refs/heads/{}", branch)),
                &sig,
                &sig,
                message,
                &tree,
                &parents,
            )
            .unwrap()
    }

    /// Commit `changes` on top of the tip of `branch`.
    pub fn commit_on(&mut self, branch: &str, message: &str, changes: &[Change]) -> Oid {
        let parent = self.tip(branch);
        let tree = self.build_tree(parent.as_ref(), changes);
        let parents: Vec<Oid> = parent.iter().map(|c| c.id()).collect();
        drop(parent);
        self.write_commit(branch, message, tree, &parents)
    }

    /// Merge `other` into `branch`. The result keeps `branch`'s tree with
    /// `changes` applied; the first parent is the old tip of `branch`.
    pub fn merge(&mut self, branch: &str, message: &str, other: Oid, changes: &[Change]) -> Oid {
        let tip = self.tip(branch).expect("branch has no commits");
        let tree = self.build_tree(Some(&tip), changes);
        let parents = [tip.id(), other];
        drop(tip);
        self.write_commit(branch, message, tree, &parents)
    }

    pub fn commit(&mut self, message: &str, changes: &[Change]) -> Oid {
        self.commit_on("master", message, changes)
    }

    pub fn branch(&self, name: &str, target: Oid) {
        self.repo
            .reference(&format!("refs/heads/{}", name), target, true, "test branch")
            .unwrap();
    }

    pub fn tag(&self, name: &str, target: Oid) {
        let object = self.repo.find_object(target, None).unwrap();
        self.repo.tag_lightweight(name, &object, true).unwrap();
    }

    pub fn annotated_tag(&self, name: &str, target: Oid) {
        let object = self.repo.find_object(target, None).unwrap();
        let sig = self.signature();
        self.repo.tag(name, &object, &sig, "release", true).unwrap();
    }

    pub fn mark_exported(&self) {
        std::fs::write(self.repo.path().join(EXPORT_FLAG_FILE), "").unwrap();
    }

    pub fn set_description(&self, text: &str) {
        std::fs::write(self.repo.path().join("description"), text).unwrap();
    }
}

/// The three-commit repository used across tests:
/// A (root, empty) → B (adds README.md) → C (adds src/main.go), all on master.
pub struct Scenario {
    pub root: Root,
    pub a: Oid,
    pub b: Oid,
    pub c: Oid,
}

pub const README: &str = "# Demo\n\nA *small* project.\n";
pub const MAIN_GO: &str = "package main\n\nfunc main() {}\n";

impl Scenario {
    pub fn new() -> Self {
        let root = Root::new();
        let mut repo = root.repo("demo");
        let a = repo.commit("Initial commit", &[]);
        let b = repo.commit("Add readme", &[Change::Write("README.md", README.as_bytes())]);
        let c = repo.commit("Add main", &[Change::Write("src/main.go", MAIN_GO.as_bytes())]);
        Self { root, a, b, c }
    }

    pub fn config(&self) -> Config {
        self.root.config()
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().join("demo")
    }

    pub fn open(&self) -> git_browse::GitRepository {
        git_browse::GitRepository::open(self.path(), &self.config()).expect("failed to open")
    }
}
