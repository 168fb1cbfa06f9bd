use git2::{Delta, DiffOptions, Oid, Patch};

use crate::error::Result;
use crate::git::repository::GitRepository;
use crate::models::{Diff, DiffStatus};

impl GitRepository {
    /// Changes of a commit against its first parent; a root commit is
    /// compared with the empty tree.
    pub(crate) fn commit_diffs(&self, commit_id: &str) -> Result<Vec<Diff>> {
        let commit = self.repo.find_commit(Oid::from_str(commit_id)?)?;
        let tree = commit.tree()?;
        let parent_tree = if commit.parent_count() > 0 {
            Some(commit.parent(0)?.tree()?)
        } else {
            None
        };

        let mut opts = DiffOptions::new();
        opts.context_lines(3);

        let mut diff =
            self.repo
                .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;
        diff.find_similar(None)?;

        let mut diffs = Vec::new();

        for (delta_idx, delta) in diff.deltas().enumerate() {
            let status = match delta.status() {
                Delta::Added => DiffStatus::Added,
                Delta::Deleted => DiffStatus::Deleted,
                Delta::Modified => DiffStatus::Modified,
                Delta::Renamed => DiffStatus::Renamed,
                Delta::Copied => DiffStatus::Copied,
                Delta::Typechange => DiffStatus::TypeChanged,
                _ => DiffStatus::Unmodified,
            };

            let old_path = delta.old_file().path().map(|p| p.to_string_lossy().to_string());
            let new_path = delta.new_file().path().map(|p| p.to_string_lossy().to_string());

            let (rename_from, rename_to) = if status == DiffStatus::Renamed {
                (old_path.clone(), new_path.clone())
            } else {
                (None, None)
            };

            let (patch, insertions, deletions) = match Patch::from_diff(&diff, delta_idx)? {
                Some(mut patch) => {
                    let (_, insertions, deletions) = patch.line_stats()?;
                    let text = String::from_utf8_lossy(&patch.to_buf()?).to_string();
                    (text, insertions, deletions)
                }
                None => (String::new(), 0, 0),
            };

            diffs.push(Diff {
                a_path: if status == DiffStatus::Added { None } else { old_path },
                b_path: if status == DiffStatus::Deleted { None } else { new_path },
                is_binary: delta.flags().is_binary(),
                status,
                rename_from,
                rename_to,
                patch,
                insertions,
                deletions,
            });
        }

        Ok(diffs)
    }
}
