//! tar.gz export of a revision.
//!
//! Entries are written without a leading directory, so unpacking reproduces
//! the revision's root tree. Every entry's mtime is the commit time.

use flate2::write::GzEncoder;
use flate2::Compression;
use git2::ObjectType;
use std::io::{self, Write};
use tar::{EntryType, Header};

use crate::error::Result;
use crate::git::repository::GitRepository;
use crate::models::{short_id, Archive};
use crate::repository::Repository;

pub const ARCHIVE_MIME_TYPE: &str = "application/x-gzip";

const SYMLINK_MODE: i32 = 0o120000;
const EXECUTABLE_MODE: i32 = 0o100755;

impl GitRepository {
    pub(crate) fn archive_revision(&self, revision: &str) -> Result<Archive> {
        let commit = self.find_commit(revision)?;
        let mtime = commit.time().seconds().max(0) as u64;

        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        self.append_tree(&mut builder, &commit.tree()?, "", mtime)?;
        let data = builder.into_inner()?.finish()?;

        let id = commit.id().to_string();
        tracing::debug!("Archived {} at {} ({} bytes)", self.name(), id, data.len());

        Ok(Archive {
            filename: format!("{}-{}.tar.gz", self.name(), short_id(&id)),
            mime_type: ARCHIVE_MIME_TYPE,
            data,
        })
    }

    fn append_tree<W: Write>(
        &self,
        builder: &mut tar::Builder<W>,
        tree: &git2::Tree,
        prefix: &str,
        mtime: u64,
    ) -> Result<()> {
        for entry in tree.iter() {
            let name = String::from_utf8_lossy(entry.name_bytes());
            let path = if prefix.is_empty() {
                name.to_string()
            } else {
                format!("{}/{}", prefix, name)
            };

            match entry.kind() {
                Some(ObjectType::Tree) => {
                    append_directory(builder, &path, mtime)?;
                    let subtree = self.repo.find_tree(entry.id())?;
                    self.append_tree(builder, &subtree, &path, mtime)?;
                }
                Some(ObjectType::Blob) => {
                    let blob = self.repo.find_blob(entry.id())?;
                    let mut header = Header::new_gnu();
                    header.set_mtime(mtime);

                    if entry.filemode() == SYMLINK_MODE {
                        let target = String::from_utf8_lossy(blob.content()).to_string();
                        header.set_entry_type(EntryType::Symlink);
                        header.set_mode(0o777);
                        header.set_size(0);
                        builder.append_link(&mut header, &path, target)?;
                    } else {
                        header.set_entry_type(EntryType::Regular);
                        header.set_mode(if entry.filemode() == EXECUTABLE_MODE { 0o755 } else { 0o644 });
                        header.set_size(blob.size() as u64);
                        builder.append_data(&mut header, &path, blob.content())?;
                    }
                }
                // Submodules become empty directories, as with `git archive`.
                Some(ObjectType::Commit) => append_directory(builder, &path, mtime)?,
                _ => {}
            }
        }

        Ok(())
    }
}

fn append_directory<W: Write>(builder: &mut tar::Builder<W>, path: &str, mtime: u64) -> io::Result<()> {
    let mut header = Header::new_gnu();
    header.set_entry_type(EntryType::Directory);
    header.set_mode(0o755);
    header.set_size(0);
    header.set_mtime(mtime);
    builder.append_data(&mut header, format!("{}/", path), io::empty())
}
