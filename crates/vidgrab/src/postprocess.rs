//! Clean-up of downloaded files.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::logging::targets;

/// File name with spaces replaced by `_` and brackets and parentheses
/// removed.
pub fn sanitized_file_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '[' | ']' | '(' | ')'))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

/// Rename `path` to its sanitized file name in the same directory.
///
/// Returns the new path, which is `path` itself when the name was already
/// clean.
pub fn rename_sanitized(path: &Path) -> Result<PathBuf> {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return Ok(path.to_path_buf());
    };
    let clean = sanitized_file_name(name);
    if clean == name {
        return Ok(path.to_path_buf());
    }
    let target = path.with_file_name(clean);
    std::fs::rename(path, &target)?;
    tracing::info!(target: targets::MODEL, from = %path.display(), to = %target.display(), "renamed download");
    Ok(target)
}
