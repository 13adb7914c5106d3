//! Tunnel expansion.
//!
//! Turns one tunnel request (specifier + export name from an importing
//! source) into the declaration files that actually define the name, by
//! resolving the barrel and running the re-export traversal.
//!
//! When the barrel is external, the commander rule applies: tunneled files
//! must live in the same package as the barrel itself (equal
//! nearest-ancestor `package.json` directories). A star re-export that
//! crosses into another package is a dependency of that package, not of the
//! importer; files with no discoverable package root are retained.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use crate::host::ModuleHost;
use crate::paths::is_under_node_modules;
use crate::reexport::{resolve_defining_exports, DefiningExport};
use crate::resolver::{ModuleResolver, PackageRootCache, Resolution};
use crate::surface::TunnelRequest;

/// Expand a tunnel request into defining declaration files.
pub fn expand_tunnel(
    host: &dyn ModuleHost,
    resolver: &ModuleResolver,
    package_roots: &mut PackageRootCache,
    from_abs: &Path,
    request: &TunnelRequest,
) -> Vec<PathBuf> {
    let Resolution::File {
        abs_path: barrel,
        is_external,
    } = resolver.resolve(&request.specifier, from_abs)
    else {
        return Vec::new();
    };

    let defining = resolve_defining_exports(host, &barrel, &request.export_name);
    let mut files: Vec<PathBuf> = defining
        .into_iter()
        .map(|def| match def {
            DefiningExport::Symbol { abs_path, .. } => abs_path,
            DefiningExport::Module { abs_path } => abs_path,
        })
        .collect();

    if is_external || is_under_node_modules(&barrel) {
        let barrel_root = package_roots.nearest(&barrel);
        files.retain(|file| match package_roots.nearest(file) {
            None => true,
            Some(root) => Some(&root) == barrel_root.as_ref(),
        });
    }

    let mut seen: FxHashSet<PathBuf> = FxHashSet::default();
    files.retain(|file| seen.insert(file.clone()));
    files
}
