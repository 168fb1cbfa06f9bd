use git2::{ObjectType, Oid};

use crate::error::{RepositoryError, Result};
use crate::git::history::last_commits_for_paths;
use crate::git::repository::GitRepository;
use crate::git::resolver::RefIndex;
use crate::mime;
use crate::models::{Blob, Tree, TreeEntry};
use crate::repository::{split_path, Node};

const TREE_MODE: i32 = 0o040000;

impl GitRepository {
    /// Walk `<revision>/<subpath>` by exact entry name.
    pub(crate) fn traverse_path(&self, path: &str, with_history: bool) -> Result<Node> {
        let (revision, subpath) = split_path(path);
        let commit = self.find_commit(revision)?;
        let not_found = || RepositoryError::PathNotFound(path.to_string());

        let mut current = commit.tree()?.into_object();
        let mut mode = TREE_MODE;
        let mut name = String::new();

        if !subpath.is_empty() {
            for segment in subpath.split('/') {
                // A blob has no children, so descending past one fails here.
                let next = {
                    let tree = current.as_tree().ok_or_else(not_found)?;
                    let entry = tree.get_name(segment).ok_or_else(not_found)?;
                    if !matches!(entry.kind(), Some(ObjectType::Tree | ObjectType::Blob)) {
                        return Err(not_found());
                    }
                    mode = entry.filemode();
                    entry.to_object(&self.repo)?
                };
                current = next;
                name = segment.to_string();
            }
        }

        match current.kind() {
            Some(ObjectType::Tree) => {
                let tree = current.as_tree().ok_or_else(not_found)?;
                let history_start = with_history.then(|| commit.id());
                Ok(Node::Tree(self.build_tree(tree, name, subpath, history_start)?))
            }
            Some(ObjectType::Blob) => Ok(Node::Blob(Blob {
                id: current.id().to_string(),
                mime_type: mime::detect(&name),
                size: current.as_blob().map(|b| b.size() as u64).unwrap_or(0),
                name,
                path: subpath,
                mode,
                data: Default::default(),
            })),
            _ => Err(not_found()),
        }
    }

    fn build_tree(
        &self,
        tree: &git2::Tree,
        name: String,
        path: String,
        history_start: Option<Oid>,
    ) -> Result<Tree> {
        let odb = self.repo.odb()?;
        let mut entries = Vec::new();

        for entry in tree.iter() {
            // Gitlinks are listed through submodules() instead.
            let is_tree = match entry.kind() {
                Some(ObjectType::Tree) => true,
                Some(ObjectType::Blob) => false,
                _ => continue,
            };

            let entry_name = String::from_utf8_lossy(entry.name_bytes()).to_string();
            let entry_path = if path.is_empty() {
                entry_name.clone()
            } else {
                format!("{}/{}", path, entry_name)
            };

            let size = if is_tree {
                None
            } else {
                odb.read_header(entry.id()).ok().map(|(size, _)| size as u64)
            };

            entries.push(TreeEntry {
                id: entry.id().to_string(),
                name: entry_name,
                path: entry_path,
                is_tree,
                mode: entry.filemode(),
                size,
                last_commit: None,
            });
        }

        if let Some(start) = history_start {
            let refs = RefIndex::load(&self.repo)?;
            let paths: Vec<String> = entries.iter().map(|e| e.path.clone()).collect();
            let mut last_commits = last_commits_for_paths(&self.repo, start, &paths, &refs)?;

            for entry in &mut entries {
                entry.last_commit = last_commits.remove(&entry.path);
            }
        }

        Ok(Tree::new(tree.id().to_string(), name, path, entries))
    }
}
