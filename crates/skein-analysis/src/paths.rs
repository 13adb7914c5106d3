//! Path normalization and NodeId conversion.
//!
//! Node ids for in-repo files are repo-relative POSIX paths; files outside
//! the root keep their POSIX-normalized absolute path. Builtin ids
//! (`node:`) never map back to a filesystem path.

use std::path::{Path, PathBuf};

use path_clean::PathClean;

/// Replace backslashes with forward slashes.
pub fn to_posix(path: &str) -> String {
    path.replace('\\', "/")
}

/// True for POSIX-absolute paths (`/…`).
pub fn is_posix_absolute(path: &str) -> bool {
    path.starts_with('/')
}

/// True for Windows-drive-absolute paths (`C:/…` or `C:\…`).
pub fn is_windows_drive_absolute(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'/' || bytes[2] == b'\\')
}

/// Convert an absolute path to a node id.
///
/// Returns the id string and whether the path lies outside the root. The id
/// is empty only when `abs_path` equals `cwd` itself, which callers must
/// reject (the empty string is never a valid node key).
pub fn abs_path_to_node_id(abs_path: &Path, cwd: &Path) -> (String, bool) {
    let abs = to_posix(&abs_path.clean().to_string_lossy());
    let mut root = to_posix(&cwd.clean().to_string_lossy());
    while root.len() > 1 && root.ends_with('/') {
        root.pop();
    }
    if abs == root {
        return (String::new(), false);
    }
    let prefix = if root.ends_with('/') {
        root.clone()
    } else {
        format!("{root}/")
    };
    if let Some(rel) = abs.strip_prefix(&prefix) {
        let rel = rel.strip_prefix("./").unwrap_or(rel);
        (rel.to_string(), false)
    } else {
        (abs, true)
    }
}

/// Convert a node id back to an absolute path.
///
/// Returns `None` for builtin ids. Absolute ids (POSIX or Windows-drive) are
/// returned verbatim; anything else is joined onto `cwd` as a POSIX-relative
/// path.
pub fn node_id_to_abs_path(cwd: &Path, id: &str) -> Option<PathBuf> {
    if id.starts_with("node:") {
        return None;
    }
    if is_posix_absolute(id) || is_windows_drive_absolute(id) {
        return Some(PathBuf::from(id));
    }
    Some(cwd.join(id))
}

/// True when a POSIX-normalized path passes through a `node_modules`
/// directory.
pub fn is_under_node_modules(path: &Path) -> bool {
    let posix = to_posix(&path.to_string_lossy());
    posix.contains("/node_modules/") || posix.starts_with("node_modules/")
}
