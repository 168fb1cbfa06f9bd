//! Server configuration.
//!
//! Loaded from a TOML file and passed explicitly to everything that needs
//! it. Example:
//!
//! ```toml
//! repository_root = "/srv/git"
//! preserve_export_flag = false
//!
//! [clone_urls]
//! git = "git://example.org/{name}"
//! http = "https://example.org/git/{name}"
//!
//! [cache]
//! enabled = true
//! ttl_secs = 600
//! max_entries = 500
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Placeholder replaced by the repository name in clone URL patterns.
pub const NAME_PLACEHOLDER: &str = "{name}";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory whose immediate children are the served repositories.
    pub repository_root: PathBuf,

    /// Only serve repositories carrying a `git-daemon-export-ok` marker.
    #[serde(default = "default_true")]
    pub preserve_export_flag: bool,

    /// Protocol name to URL pattern.
    #[serde(default)]
    pub clone_urls: BTreeMap<String, String>,

    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Responses kept at once; the oldest is evicted beyond this.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl_secs: default_ttl_secs(),
            max_entries: default_max_entries(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

fn default_true() -> bool {
    true
}

fn default_ttl_secs() -> u64 {
    300
}

fn default_max_entries() -> usize {
    1000
}

impl Config {
    /// Configuration with defaults for everything but the root.
    pub fn with_root<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            repository_root: root.into(),
            preserve_export_flag: true,
            clone_urls: BTreeMap::new(),
            cache: CacheConfig::default(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&contents).map_err(|message| ConfigError::ParseError {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn parse(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|e| e.to_string())
    }

    /// Absolute on-disk location of the repository called `name`.
    pub fn repository_path(&self, name: &str) -> PathBuf {
        self.repository_root.join(name)
    }
}
