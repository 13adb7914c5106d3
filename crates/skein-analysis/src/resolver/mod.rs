//! Module resolution.
//!
//! Node-style resolution of a specifier from an importing file:
//!
//! 1. Builtins (with or without the `node:` prefix) resolve immediately.
//! 2. Relative and absolute specifiers probe extensions and index files.
//! 3. Bare specifiers walk `node_modules` directories upward from the
//!    importing file, consulting each package's manifest
//!    (`types`/`typings`/`main`) before index probing.
//!
//! Anything that survives none of these is a missing module; missing is a
//! normal outcome, never an error.

mod builtins;
mod extensions;
mod package;

pub use builtins::{builtin_name, NODE_BUILTINS};
pub use extensions::{resolve_path_like, try_extensions, try_index_files};
pub use package::{split_package_specifier, PackageManifest, PackageRootCache};

use std::path::{Path, PathBuf};

use path_clean::PathClean;

use skein_graph::NodeId;

use crate::config::ResolverOptions;
use crate::paths::{is_posix_absolute, is_under_node_modules, is_windows_drive_absolute};

/// Outcome of resolving one specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A runtime builtin; `id` carries the `node:` prefix.
    Builtin { id: NodeId },
    /// A file on disk. `is_external` is true when the path passes through
    /// `node_modules`.
    File { abs_path: PathBuf, is_external: bool },
    /// Unresolvable; the verbatim specifier becomes the node id.
    Missing { specifier: String },
}

/// Node-style module resolver rooted at a repository.
#[derive(Debug)]
pub struct ModuleResolver {
    options: ResolverOptions,
}

impl ModuleResolver {
    pub fn new(options: ResolverOptions) -> Self {
        Self { options }
    }

    /// Resolve `specifier` as imported from the file `from_abs`.
    pub fn resolve(&self, specifier: &str, from_abs: &Path) -> Resolution {
        if specifier.is_empty() {
            return Resolution::Missing {
                specifier: specifier.to_string(),
            };
        }

        if let Some(name) = builtin_name(specifier, &self.options.extra_builtins) {
            return Resolution::Builtin {
                id: NodeId::builtin(name),
            };
        }

        if specifier.starts_with('.') {
            let base = from_abs.parent().unwrap_or(from_abs).join(specifier).clean();
            return self.file_or_missing(&base, specifier);
        }

        if is_posix_absolute(specifier) || is_windows_drive_absolute(specifier) {
            return self.file_or_missing(&PathBuf::from(specifier).clean(), specifier);
        }

        self.resolve_bare(specifier, from_abs)
    }

    fn file_or_missing(&self, candidate: &Path, specifier: &str) -> Resolution {
        match resolve_path_like(candidate, &self.options.extensions) {
            Some(abs_path) => {
                let is_external = is_under_node_modules(&abs_path);
                Resolution::File {
                    abs_path,
                    is_external,
                }
            }
            None => Resolution::Missing {
                specifier: specifier.to_string(),
            },
        }
    }

    /// Walk `node_modules` directories from the importing file upward.
    fn resolve_bare(&self, specifier: &str, from_abs: &Path) -> Resolution {
        let (package_name, subpath) = split_package_specifier(specifier);
        let start = from_abs.parent().unwrap_or(from_abs);
        for dir in start.ancestors() {
            let package_dir = dir.join("node_modules").join(&package_name);
            if !package_dir.is_dir() {
                continue;
            }
            let candidate = match &subpath {
                Some(sub) => resolve_path_like(&package_dir.join(sub), &self.options.extensions),
                None => self.resolve_package_entry(&package_dir),
            };
            if let Some(abs_path) = candidate {
                return Resolution::File {
                    abs_path,
                    is_external: true,
                };
            }
        }
        Resolution::Missing {
            specifier: specifier.to_string(),
        }
    }

    /// Resolve the entry file of a package directory: manifest
    /// `types`/`typings`/`main` first, then index probing.
    fn resolve_package_entry(&self, package_dir: &Path) -> Option<PathBuf> {
        if let Some(manifest) = PackageManifest::load(&package_dir.join("package.json")) {
            if let Some(entry) = manifest.entry() {
                let candidate = package_dir.join(entry).clean();
                if let Some(resolved) = resolve_path_like(&candidate, &self.options.extensions) {
                    return Some(resolved);
                }
            }
        }
        try_index_files(package_dir, &self.options.extensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn resolver() -> ModuleResolver {
        ModuleResolver::new(ResolverOptions::default())
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn builtins_resolve_with_and_without_prefix() {
        let from = Path::new("/repo/src/a.ts");
        assert_eq!(
            resolver().resolve("fs", from),
            Resolution::Builtin {
                id: NodeId::builtin("fs")
            }
        );
        assert_eq!(
            resolver().resolve("node:path", from),
            Resolution::Builtin {
                id: NodeId::builtin("path")
            }
        );
    }

    #[test]
    fn relative_specifier_probes_extensions() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "src/a.ts", "");
        write(root, "src/utils.ts", "");

        let result = resolver().resolve("./utils", &root.join("src/a.ts"));
        assert_eq!(
            result,
            Resolution::File {
                abs_path: root.join("src/utils.ts"),
                is_external: false
            }
        );
    }

    #[test]
    fn parent_relative_specifier_resolves() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "src/deep/a.ts", "");
        write(root, "src/shared.ts", "");

        let result = resolver().resolve("../shared", &root.join("src/deep/a.ts"));
        assert_eq!(
            result,
            Resolution::File {
                abs_path: root.join("src/shared.ts"),
                is_external: false
            }
        );
    }

    #[test]
    fn unresolved_relative_is_missing() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/a.ts", "");
        assert_eq!(
            resolver().resolve("./nope", &temp.path().join("src/a.ts")),
            Resolution::Missing {
                specifier: "./nope".to_string()
            }
        );
    }

    #[test]
    fn bare_specifier_walks_node_modules_and_is_external() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "src/a.ts", "");
        write(
            root,
            "node_modules/pkg/package.json",
            r#"{"name":"pkg","types":"index.d.ts"}"#,
        );
        write(root, "node_modules/pkg/index.d.ts", "");

        let result = resolver().resolve("pkg", &root.join("src/a.ts"));
        assert_eq!(
            result,
            Resolution::File {
                abs_path: root.join("node_modules/pkg/index.d.ts"),
                is_external: true
            }
        );
    }

    #[test]
    fn package_without_manifest_uses_index() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "src/a.ts", "");
        write(root, "node_modules/bare/index.js", "");

        let result = resolver().resolve("bare", &root.join("src/a.ts"));
        assert_eq!(
            result,
            Resolution::File {
                abs_path: root.join("node_modules/bare/index.js"),
                is_external: true
            }
        );
    }

    #[test]
    fn package_subpath_resolves() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "src/a.ts", "");
        write(root, "node_modules/pkg/package.json", r#"{"name":"pkg"}"#);
        write(root, "node_modules/pkg/lib/util.d.ts", "");

        let result = resolver().resolve("pkg/lib/util", &root.join("src/a.ts"));
        assert_eq!(
            result,
            Resolution::File {
                abs_path: root.join("node_modules/pkg/lib/util.d.ts"),
                is_external: true
            }
        );
    }

    #[test]
    fn unknown_bare_specifier_is_missing() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/a.ts", "");
        assert_eq!(
            resolver().resolve("ghost-pkg", &temp.path().join("src/a.ts")),
            Resolution::Missing {
                specifier: "ghost-pkg".to_string()
            }
        );
    }

    #[test]
    fn relative_inside_node_modules_is_external() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "node_modules/pkg/index.d.ts", "");
        write(root, "node_modules/pkg/a.d.ts", "");

        let result = resolver().resolve("./a", &root.join("node_modules/pkg/index.d.ts"));
        assert_eq!(
            result,
            Resolution::File {
                abs_path: root.join("node_modules/pkg/a.d.ts"),
                is_external: true
            }
        );
    }
}
