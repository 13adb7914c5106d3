//! Extension and index-file probing.
//!
//! Resolution of a path-like specifier tries the exact path, then each
//! configured extension appended to it, then `index.<ext>` inside it when it
//! is a directory. Extensions are appended rather than substituted so
//! `./config.base` probes `./config.base.ts`, not `./config.ts`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Try a candidate path as-is, then with each extension appended.
pub fn try_extensions(candidate: &Path, extensions: &[String]) -> Option<PathBuf> {
    if candidate.is_file() {
        return Some(candidate.to_path_buf());
    }
    for ext in extensions {
        let mut with_ext = OsString::from(candidate.as_os_str());
        with_ext.push(format!(".{ext}"));
        let with_ext = PathBuf::from(with_ext);
        if with_ext.is_file() {
            return Some(with_ext);
        }
    }
    None
}

/// Try `index.<ext>` files inside a directory.
pub fn try_index_files(dir: &Path, extensions: &[String]) -> Option<PathBuf> {
    if !dir.is_dir() {
        return None;
    }
    for ext in extensions {
        let index = dir.join(format!("index.{ext}"));
        if index.is_file() {
            return Some(index);
        }
    }
    None
}

/// Full path-like probe: extensions first, then index files.
pub fn resolve_path_like(candidate: &Path, extensions: &[String]) -> Option<PathBuf> {
    try_extensions(candidate, extensions).or_else(|| try_index_files(candidate, extensions))
}
