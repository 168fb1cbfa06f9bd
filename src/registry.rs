//! Repositories available under the configured root.
//!
//! Only immediate subdirectories are considered; hidden entries are skipped.

use std::fs;

use crate::config::Config;
use crate::error::{RepositoryError, Result};
use crate::git::GitRepository;
use crate::models::RepositorySummary;

/// Names of servable repositories, sorted alphabetically.
pub fn repository_names(config: &Config) -> Result<Vec<String>> {
    let root = &config.repository_root;
    if !root.is_dir() {
        return Err(RepositoryError::RepositoryDoesNotExist(
            root.to_string_lossy().to_string(),
        ));
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();

        if name.starts_with('.') || !entry.path().is_dir() {
            continue;
        }
        if GitRepository::is_repository(entry.path(), config) {
            names.push(name);
        }
    }

    names.sort();
    Ok(names)
}

/// Summaries of every servable repository, empty ones included.
pub fn list_repositories(config: &Config) -> Result<Vec<RepositorySummary>> {
    let mut summaries = Vec::new();
    for name in repository_names(config)? {
        match GitRepository::open_forced(config.repository_path(&name), config) {
            Ok(repo) => summaries.push(repo.summary()),
            Err(e) => tracing::warn!("Skipping repository {}: {}", name, e),
        }
    }
    Ok(summaries)
}

/// Open the repository called `name` below the root.
///
/// Names that could escape the root are rejected as not being repositories.
pub fn open_repository(config: &Config, name: &str) -> Result<GitRepository> {
    check_name(name)?;
    GitRepository::open(config.repository_path(name), config)
}

pub(crate) fn check_name(name: &str) -> Result<()> {
    if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
        return Err(RepositoryError::NotAVersionControlRepository(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_escaping_names() {
        assert!(check_name("..").is_err());
        assert!(check_name(".hidden").is_err());
        assert!(check_name("a/b").is_err());
        assert!(check_name("").is_err());
        assert!(check_name("pyggi").is_ok());
    }
}
