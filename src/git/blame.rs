use git2::{BlameOptions, ObjectType, Oid};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{RepositoryError, Result};
use crate::git::repository::GitRepository;
use crate::git::resolver::RefIndex;
use crate::models::{BlameGroup, Commit};
use crate::repository::split_path;

impl GitRepository {
    /// Line attribution for the file at `<revision>/<subpath>`.
    ///
    /// Adjacent hunks from the same commit are merged, so every group is a
    /// maximal run of lines sharing a commit.
    pub(crate) fn blame_path(&self, path: &str) -> Result<Vec<BlameGroup>> {
        let (revision, subpath) = split_path(path);
        let commit = self.find_commit(revision)?;
        let not_found = || RepositoryError::PathNotFound(path.to_string());

        if subpath.is_empty() {
            return Err(not_found());
        }
        let entry = commit
            .tree()?
            .get_path(Path::new(&subpath))
            .map_err(|_| not_found())?;
        if entry.kind() != Some(ObjectType::Blob) {
            return Err(not_found());
        }

        let blob = self.repo.find_blob(entry.id())?;
        let content = String::from_utf8_lossy(blob.content());
        let lines: Vec<&str> = content.lines().collect();

        let mut opts = BlameOptions::new();
        opts.newest_commit(commit.id());
        let blame = self.repo.blame_file(Path::new(&subpath), Some(&mut opts))?;

        let refs = RefIndex::load(&self.repo)?;
        let mut commits: HashMap<Oid, Commit> = HashMap::new();
        let mut groups: Vec<BlameGroup> = Vec::new();

        for hunk in blame.iter() {
            let start = hunk.final_start_line();
            let from = start.saturating_sub(1).min(lines.len());
            let to = (from + hunk.lines_in_hunk()).min(lines.len());
            if from >= to {
                continue;
            }
            let chunk = lines[from..to].iter().map(|line| line.to_string());
            let oid = hunk.final_commit_id();

            if let Some(last) = groups.last_mut() {
                if last.commit.id == oid.to_string() && last.end_line() == from + 1 {
                    last.lines.extend(chunk);
                    continue;
                }
            }

            let commit = match commits.get(&oid) {
                Some(commit) => commit.clone(),
                None => {
                    let commit = refs.to_commit(&self.repo.find_commit(oid)?);
                    commits.insert(oid, commit.clone());
                    commit
                }
            };

            groups.push(BlameGroup {
                commit,
                start_line: from + 1,
                lines: chunk.collect(),
            });
        }

        Ok(groups)
    }
}
