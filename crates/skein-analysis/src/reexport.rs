//! AST-first re-export traversal.
//!
//! Follows a `(module, export name)` pair through the module's forwarding
//! graph (`export * from`, `export * as ns from`, `export { a as b } from`,
//! import-then-export) until modules are found that define the name locally,
//! or that are targeted as whole modules by namespace forwarding.
//!
//! The traversal is a DFS with an explicit in-stack key set: revisiting a
//! key currently being resolved yields an empty result for that branch, so
//! cyclic forwarding graphs terminate while other branches still
//! accumulate. Completed keys are memoized for the lifetime of one
//! traversal invocation.

use std::path::{Path, PathBuf};

use rustc_hash::{FxHashMap, FxHashSet};

use crate::host::ModuleHost;
use crate::paths::to_posix;
use crate::surface::ForwardTarget;

/// A resolved defining export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefiningExport {
    /// The module at `abs_path` defines `export_name` locally.
    Symbol {
        abs_path: PathBuf,
        export_name: String,
    },
    /// The module at `abs_path` is a module-level dependency (namespace
    /// forwarding).
    Module { abs_path: PathBuf },
}

struct Traversal<'h> {
    host: &'h dyn ModuleHost,
    memo: FxHashMap<String, Vec<DefiningExport>>,
    in_stack: FxHashSet<String>,
}

fn key(abs_path: &Path, export_name: &str) -> String {
    format!("{}\0{}", to_posix(&abs_path.to_string_lossy()), export_name)
}

/// Resolve the defining exports for `export_name` of the module at
/// `entry_abs`.
///
/// Unresolvable forwarding specifiers and unreadable modules are skipped;
/// results are de-duplicated preserving first occurrence. Deterministic
/// given the AST iteration order of each module.
pub fn resolve_defining_exports(
    host: &dyn ModuleHost,
    entry_abs: &Path,
    export_name: &str,
) -> Vec<DefiningExport> {
    let mut traversal = Traversal {
        host,
        memo: FxHashMap::default(),
        in_stack: FxHashSet::default(),
    };
    traversal.resolve(entry_abs, export_name)
}

impl Traversal<'_> {
    fn resolve(&mut self, abs_path: &Path, export_name: &str) -> Vec<DefiningExport> {
        let k = key(abs_path, export_name);
        if let Some(cached) = self.memo.get(&k) {
            return cached.clone();
        }
        if self.in_stack.contains(&k) {
            // Cycle: this branch contributes nothing; siblings still
            // accumulate. Not memoized, so the key resolves fully when
            // reached outside the cycle.
            return Vec::new();
        }
        self.in_stack.insert(k.clone());

        let mut results: Vec<DefiningExport> = Vec::new();
        if let Some(surface) = self.host.module_surface(abs_path) {
            if surface.defines_locally(export_name) {
                results.push(DefiningExport::Symbol {
                    abs_path: abs_path.to_path_buf(),
                    export_name: export_name.to_string(),
                });
            }
            for target in surface.forwarding_targets(export_name) {
                match target {
                    ForwardTarget::Module { specifier } => {
                        if let Some(next) = self.host.resolve_abs_path(abs_path, &specifier) {
                            results.push(DefiningExport::Module { abs_path: next });
                        }
                    }
                    ForwardTarget::Symbol {
                        specifier,
                        import_name,
                    } => {
                        if let Some(next) = self.host.resolve_abs_path(abs_path, &specifier) {
                            results.extend(self.resolve(&next, &import_name));
                        }
                    }
                }
            }
        }

        self.in_stack.remove(&k);
        let results = dedup_preserving_first(results);
        self.memo.insert(k, results.clone());
        results
    }
}

fn dedup_preserving_first(results: Vec<DefiningExport>) -> Vec<DefiningExport> {
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut deduped = Vec::with_capacity(results.len());
    for result in results {
        let fingerprint = match &result {
            DefiningExport::Symbol {
                abs_path,
                export_name,
            } => format!("s\0{}\0{}", abs_path.display(), export_name),
            DefiningExport::Module { abs_path } => format!("m\0{}", abs_path.display()),
        };
        if seen.insert(fingerprint) {
            deduped.push(result);
        }
    }
    deduped
}
