use crate::accounts::Whitelist;
use crate::error::{FollowDiffError, Result};
use std::fs;
use std::path::Path;
use tracing::info;

/// Read a whitelist file: one handle per line, surrounding whitespace
/// stripped, blank lines ignored.
pub fn load_whitelist<P: AsRef<Path>>(path: P) -> Result<Whitelist> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| FollowDiffError::io(path, e))?;
    let whitelist = parse_whitelist(&content);

    info!(action = "loaded", component = "whitelist", file_path = ?path, entry_count = whitelist.len(), "Loaded whitelist");
    Ok(whitelist)
}

pub fn parse_whitelist(content: &str) -> Whitelist {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}
