//! Universe scanning.
//!
//! Enumerates the candidate files for a build and applies the layered
//! filtering precedence:
//!
//! 1. Hard implicit deny: `.git` always; `node_modules` unless an include
//!    glob explicitly matches the path.
//! 2. Exclude globs (override everything below).
//! 3. Include globs (override gitignore).
//! 4. Root `.gitignore` rules.
//! 5. Default allow.
//!
//! All filtering is a pure function of the directory contents and the
//! config: same inputs, same sorted output.

use std::collections::BTreeSet;
use std::path::Path;

use globset::{GlobBuilder, GlobMatcher};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use tracing::debug;
use walkdir::WalkDir;

use crate::config::ScanConfig;
use crate::paths::to_posix;

/// Scan result: sorted unique repo-relative POSIX paths plus non-fatal
/// warnings (invalid glob patterns).
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub files: Vec<String>,
    pub warnings: Vec<String>,
}

/// Enumerate and filter the universe under `cwd`.
pub fn scan_universe(cwd: &Path, config: &ScanConfig) -> ScanOutcome {
    let mut warnings = Vec::new();
    let includes = compile_globs(&config.includes, &mut warnings);
    let excludes = compile_globs(&config.excludes, &mut warnings);
    // Re-admission is scoped to the non-catch-all include globs; the
    // catch-all would otherwise re-open everything under `node_modules`.
    let readmit: Vec<(String, GlobMatcher)> = includes
        .iter()
        .filter(|(pattern, _)| pattern != "**/*")
        .cloned()
        .collect();
    let gitignore = load_root_gitignore(cwd);

    // Base enumeration walks everything except `.git` and `node_modules`.
    let mut candidates: BTreeSet<String> = BTreeSet::new();
    let base = WalkDir::new(cwd)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            entry.depth() == 0 || (name != ".git" && name != "node_modules")
        });
    for entry in base.flatten() {
        if entry.file_type().is_file() {
            if let Some(rel) = relative_posix(cwd, entry.path()) {
                candidates.insert(rel);
            }
        }
    }

    // Extra enumeration lets include globs re-admit `node_modules` paths.
    // Only `.git` stays pruned here.
    if !readmit.is_empty() {
        let extra = WalkDir::new(cwd)
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0 || entry.file_name().to_string_lossy() != ".git"
            });
        for entry in extra.flatten() {
            if entry.file_type().is_file() {
                if let Some(rel) = relative_posix(cwd, entry.path()) {
                    if matches_any(&readmit, &rel) {
                        candidates.insert(rel);
                    }
                }
            }
        }
    }

    let mut files = Vec::with_capacity(candidates.len());
    for rel in candidates {
        if rel == ".git" || rel.starts_with(".git/") {
            continue;
        }
        let explicit_allow = matches_any(&includes, &rel);
        if (rel == "node_modules" || rel.starts_with("node_modules/")) && !explicit_allow {
            continue;
        }
        let mut included = !is_gitignored(gitignore.as_ref(), &rel);
        if explicit_allow {
            included = true;
        }
        if matches_any(&excludes, &rel) {
            included = false;
        }
        if included {
            files.push(rel);
        } else {
            debug!(path = %rel, "scan: filtered out");
        }
    }

    ScanOutcome { files, warnings }
}

/// Compile glob patterns, dropping invalid ones with a warning.
///
/// `literal_separator` keeps `*`/`?` from crossing `/`, so patterns follow
/// the standard `**`, `*`, `?` semantics; dot-files match.
fn compile_globs(patterns: &[String], warnings: &mut Vec<String>) -> Vec<(String, GlobMatcher)> {
    let mut matchers = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        let posix = to_posix(pattern);
        match GlobBuilder::new(&posix).literal_separator(true).build() {
            Ok(glob) => matchers.push((posix, glob.compile_matcher())),
            Err(err) => warnings.push(format!("invalid glob pattern '{pattern}': {err}")),
        }
    }
    matchers
}

fn matches_any(matchers: &[(String, GlobMatcher)], rel: &str) -> bool {
    matchers.iter().any(|(_, m)| m.is_match(Path::new(rel)))
}

/// Load the root `.gitignore`; absent or unreadable files count as empty.
fn load_root_gitignore(cwd: &Path) -> Option<Gitignore> {
    let path = cwd.join(".gitignore");
    if !path.exists() {
        return None;
    }
    let mut builder = GitignoreBuilder::new(cwd);
    if let Some(err) = builder.add(&path) {
        debug!(error = %err, "scan: unreadable .gitignore treated as empty");
        return None;
    }
    builder.build().ok()
}

fn is_gitignored(gitignore: Option<&Gitignore>, rel: &str) -> bool {
    gitignore.is_some_and(|gi| {
        gi.matched_path_or_any_parents(Path::new(rel), false)
            .is_ignore()
    })
}

fn relative_posix(cwd: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(cwd).ok()?;
    let rel = to_posix(&rel.to_string_lossy());
    if rel.is_empty() {
        None
    } else {
        Some(rel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn scan(root: &Path, includes: &[&str], excludes: &[&str]) -> ScanOutcome {
        scan_universe(
            root,
            &ScanConfig {
                includes: includes.iter().map(|s| s.to_string()).collect(),
                excludes: excludes.iter().map(|s| s.to_string()).collect(),
            },
        )
    }

    #[test]
    fn enumerates_sorted_and_skips_git_and_node_modules() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "src/z.ts", "");
        write(root, "src/a.ts", "");
        write(root, ".git/config", "");
        write(root, "node_modules/pkg/index.js", "");

        let outcome = scan(root, &[], &[]);
        assert_eq!(outcome.files, vec!["src/a.ts", "src/z.ts"]);
    }

    #[test]
    fn dot_files_are_included() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, ".env", "");
        write(root, "src/.hidden.ts", "");

        let outcome = scan(root, &[], &[]);
        assert_eq!(outcome.files, vec![".env", "src/.hidden.ts"]);
    }

    #[test]
    fn gitignore_filters_by_default() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, ".gitignore", "dist/\nsecret.ts\n");
        write(root, "dist/out.js", "");
        write(root, "secret.ts", "");
        write(root, "src/a.ts", "");

        let outcome = scan(root, &[], &[]);
        assert_eq!(outcome.files, vec![".gitignore", "src/a.ts"]);
    }

    #[test]
    fn include_overrides_gitignore() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, ".gitignore", "dist/\n");
        write(root, "dist/out.js", "");

        let outcome = scan(root, &["dist/**"], &[]);
        assert!(outcome.files.contains(&"dist/out.js".to_string()));
    }

    #[test]
    fn exclude_overrides_include() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "src/a.ts", "");
        write(root, "src/a.test.ts", "");

        let outcome = scan(root, &["src/**"], &["**/*.test.ts"]);
        assert_eq!(outcome.files, vec!["src/a.ts"]);
    }

    #[test]
    fn include_readmits_node_modules() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "node_modules/pkg/index.d.ts", "");
        write(root, "node_modules/other/index.d.ts", "");
        write(root, "src/a.ts", "");

        let outcome = scan(root, &["node_modules/pkg/**"], &[]);
        assert_eq!(
            outcome.files,
            vec!["node_modules/pkg/index.d.ts", "src/a.ts"]
        );
    }

    #[test]
    fn catch_all_include_does_not_readmit_node_modules() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "node_modules/pkg/index.js", "");
        write(root, "src/a.ts", "");

        let outcome = scan(root, &["**/*"], &[]);
        assert_eq!(outcome.files, vec!["src/a.ts"]);
    }

    #[test]
    fn readmission_is_scoped_to_non_catch_all_globs() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "node_modules/pkg/index.d.ts", "");
        write(root, "node_modules/other/index.d.ts", "");
        write(root, "src/a.ts", "");

        // The catch-all must not widen re-admission beyond pkg.
        let outcome = scan(root, &["**/*", "node_modules/pkg/**"], &[]);
        assert_eq!(
            outcome.files,
            vec!["node_modules/pkg/index.d.ts", "src/a.ts"]
        );
    }

    #[test]
    fn git_is_denied_even_when_included() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, ".git/config", "");

        let outcome = scan(root, &[".git/**"], &[]);
        assert!(outcome.files.is_empty());
    }

    #[test]
    fn invalid_glob_warns_and_is_omitted() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "src/a.ts", "");

        let outcome = scan(root, &["[unclosed"], &[]);
        assert_eq!(outcome.files, vec!["src/a.ts"]);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("invalid glob pattern"));
    }

    #[test]
    fn single_star_does_not_cross_directories() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, ".gitignore", "src/a.ts\nsrc/b.ts\n");
        write(root, "src/a.ts", "");
        write(root, "src/b.ts", "");
        write(root, "src/deep/c.ts", "");

        // `*.ts` only matches top-level files, so it re-admits nothing.
        let outcome = scan(root, &["*.ts"], &[]);
        assert_eq!(outcome.files, vec![".gitignore", "src/deep/c.ts"]);
    }
}
