//! package.json manifests and package-root discovery.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::Deserialize;

/// The dependency-relevant subset of a package manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageManifest {
    pub name: Option<String>,
    /// TypeScript entry, preferred over `main` when present.
    pub types: Option<String>,
    /// Legacy alias for `types`.
    pub typings: Option<String>,
    pub main: Option<String>,
}

impl PackageManifest {
    /// Load a manifest; unreadable or malformed files yield `None`.
    pub fn load(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// The entry specifier to probe, favoring declaration-bearing fields.
    pub fn entry(&self) -> Option<&str> {
        self.types
            .as_deref()
            .or(self.typings.as_deref())
            .or(self.main.as_deref())
    }
}

/// Per-call cache of nearest-ancestor `package.json` directories.
#[derive(Debug, Default)]
pub struct PackageRootCache {
    roots: FxHashMap<PathBuf, Option<PathBuf>>,
}

impl PackageRootCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The closest ancestor directory of `path` containing a
    /// `package.json`, or `None` when no ancestor has one.
    pub fn nearest(&mut self, path: &Path) -> Option<PathBuf> {
        let start = if path.is_dir() {
            path.to_path_buf()
        } else {
            path.parent()?.to_path_buf()
        };
        if let Some(cached) = self.roots.get(&start) {
            return cached.clone();
        }
        let mut found = None;
        for dir in start.ancestors() {
            if dir.join("package.json").is_file() {
                found = Some(dir.to_path_buf());
                break;
            }
        }
        self.roots.insert(start, found.clone());
        found
    }
}

/// Split a bare specifier into package name and optional subpath.
///
/// Scoped packages keep both segments: `@scope/pkg/sub` splits into
/// `@scope/pkg` + `sub`.
pub fn split_package_specifier(specifier: &str) -> (String, Option<String>) {
    let mut parts = specifier.splitn(3, '/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scope), Some(name), rest) if scope.starts_with('@') => {
            (format!("{scope}/{name}"), rest.map(str::to_string))
        }
        (Some(name), rest, rest2) => {
            let subpath = match (rest, rest2) {
                (Some(a), Some(b)) => Some(format!("{a}/{b}")),
                (Some(a), None) => Some(a.to_string()),
                _ => None,
            };
            (name.to_string(), subpath)
        }
        _ => (specifier.to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn splits_plain_and_scoped_specifiers() {
        assert_eq!(split_package_specifier("react"), ("react".to_string(), None));
        assert_eq!(
            split_package_specifier("lodash/merge"),
            ("lodash".to_string(), Some("merge".to_string()))
        );
        assert_eq!(
            split_package_specifier("@scope/pkg"),
            ("@scope/pkg".to_string(), None)
        );
        assert_eq!(
            split_package_specifier("@scope/pkg/deep/mod"),
            ("@scope/pkg".to_string(), Some("deep/mod".to_string()))
        );
    }

    #[test]
    fn manifest_entry_prefers_types() {
        let manifest = PackageManifest {
            name: Some("pkg".to_string()),
            types: Some("index.d.ts".to_string()),
            typings: None,
            main: Some("index.js".to_string()),
        };
        assert_eq!(manifest.entry(), Some("index.d.ts"));
    }

    #[test]
    fn nearest_root_walks_up_and_caches() {
        let temp = TempDir::new().unwrap();
        let pkg = temp.path().join("node_modules/pkg");
        fs::create_dir_all(pkg.join("lib")).unwrap();
        fs::write(pkg.join("package.json"), "{\"name\":\"pkg\"}").unwrap();
        fs::write(pkg.join("lib/a.d.ts"), "").unwrap();

        let mut cache = PackageRootCache::new();
        assert_eq!(cache.nearest(&pkg.join("lib/a.d.ts")), Some(pkg.clone()));
        // Cached second lookup.
        assert_eq!(cache.nearest(&pkg.join("lib/a.d.ts")), Some(pkg));
    }

    #[test]
    fn no_manifest_yields_none() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("deep/a.ts");
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, "").unwrap();
        let mut cache = PackageRootCache::new();
        assert_eq!(cache.nearest(&file), None);
    }
}
