//! `.gitmodules` parsing.
//!
//! Parsed by hand instead of through libgit2's submodule API, which only
//! reads the configuration of the checked-out HEAD.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{RepositoryError, Result};
use crate::models::Submodule;

static SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*\[submodule\s*"(.*?)"\s*\]"#).expect("valid regex"));
static PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*path\s*=\s*(.*?)\s*$").expect("valid regex"));
static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*url\s*=\s*(.*?)\s*$").expect("valid regex"));

/// Parse every `[submodule "..."]` block. A block lacking `path` or `url`
/// fails the whole parse.
pub fn parse(config: &str) -> Result<Vec<Submodule>> {
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    for line in config.lines() {
        if line.trim_start().starts_with("[submodule") {
            blocks.push(Vec::new());
        }
        if let Some(block) = blocks.last_mut() {
            block.push(line);
        }
    }

    blocks.iter().map(|block| parse_block(block)).collect()
}

fn parse_block(lines: &[&str]) -> Result<Submodule> {
    let capture = |re: &Regex| {
        lines
            .iter()
            .find_map(|line| re.captures(line).map(|c| c[1].to_string()))
    };

    let name = capture(&SECTION);
    let path = capture(&PATH);
    let url = capture(&URL);

    let (Some(name), Some(path), Some(url)) = (name, path, url) else {
        let header = lines.first().copied().unwrap_or_default();
        return Err(RepositoryError::CorruptSubmoduleConfig(header.trim().to_string()));
    };

    let (path_base, path_name) = match path.rsplit_once('/') {
        Some((base, name)) => (base.to_string(), name.to_string()),
        None => (String::new(), path),
    };

    Ok(Submodule {
        name,
        path_base,
        path_name,
        url,
    })
}
