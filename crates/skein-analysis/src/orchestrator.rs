//! Per-source analysis orchestration.
//!
//! For each dirty source this module extracts the parsed surface, resolves
//! every explicit import, expands every tunnel request, and materializes the
//! nodes those edges reference: builtins and missing modules lazily, file
//! nodes hashed on first sight.

use std::collections::BTreeSet;
use std::path::Path;

use rustc_hash::FxHashMap;
use tracing::debug;

use skein_graph::{Edge, Language, Node, NodeId, NodeKind};

use crate::host::{AnalysisHost, ModuleHost};
use crate::node_factory::{hashed_file_node, language_for_path};
use crate::paths::{abs_path_to_node_id, is_under_node_modules, node_id_to_abs_path};
use crate::resolver::{ModuleResolver, PackageRootCache, Resolution};
use crate::tunnel::expand_tunnel;

/// Analyze the dirty sources, materializing referenced nodes into `nodes`
/// and returning the raw outgoing edges per source.
pub fn analyze_dirty_sources(
    cwd: &Path,
    dirty_source_ids: &BTreeSet<NodeId>,
    nodes: &mut FxHashMap<NodeId, Node>,
    resolver: &ModuleResolver,
    host: &AnalysisHost<'_>,
    package_roots: &mut PackageRootCache,
    warnings: &mut Vec<String>,
) -> FxHashMap<NodeId, Vec<Edge>> {
    let mut edges_by_source: FxHashMap<NodeId, Vec<Edge>> = FxHashMap::default();

    for source_id in dirty_source_ids {
        let mut edges: Vec<Edge> = Vec::new();
        let Some(abs) = node_id_to_abs_path(cwd, source_id.as_str()) else {
            edges_by_source.insert(source_id.clone(), edges);
            continue;
        };
        let Some(surface) = host.module_surface(&abs) else {
            warnings.push(format!("failed to analyze {source_id}: unreadable or unparsable"));
            edges_by_source.insert(source_id.clone(), edges);
            continue;
        };
        debug!(
            source = %source_id,
            imports = surface.explicit_imports.len(),
            tunnels = surface.tunnel_requests.len(),
            "analyzing"
        );

        for import in &surface.explicit_imports {
            match resolver.resolve(&import.specifier, &abs) {
                Resolution::Builtin { id } => {
                    nodes
                        .entry(id.clone())
                        .or_insert_with(|| Node::new(id.clone(), NodeKind::Builtin, Language::Other));
                    edges.push(Edge::explicit(id, import.kind));
                }
                Resolution::Missing { specifier } => match NodeId::new(specifier) {
                    Ok(id) => {
                        nodes.entry(id.clone()).or_insert_with(|| {
                            Node::new(id.clone(), NodeKind::Missing, Language::Other)
                        });
                        edges.push(Edge::explicit(id, import.kind));
                    }
                    Err(_) => {
                        warnings.push(format!(
                            "ignoring import with empty specifier in {source_id}"
                        ));
                    }
                },
                Resolution::File {
                    abs_path,
                    is_external,
                } => {
                    if let Some(id) =
                        materialize_file_node(nodes, &abs_path, cwd, is_external, warnings)
                    {
                        edges.push(Edge::explicit(id, import.kind));
                    }
                }
            }
        }

        for request in &surface.tunnel_requests {
            for file in expand_tunnel(host, resolver, package_roots, &abs, request) {
                let is_external = is_under_node_modules(&file);
                if let Some(id) = materialize_file_node(nodes, &file, cwd, is_external, warnings) {
                    edges.push(Edge::implicit(id, request.kind));
                }
            }
        }

        edges_by_source.insert(source_id.clone(), edges);
    }

    edges_by_source
}

/// Materialize a file node, hashing it unless an already fully populated
/// node (hash + size) exists at that id.
///
/// Kind hint: `source` when the id already names a source node or when the
/// file is neither external nor outside the root; `external` otherwise.
fn materialize_file_node(
    nodes: &mut FxHashMap<NodeId, Node>,
    abs_path: &Path,
    cwd: &Path,
    is_external: bool,
    warnings: &mut Vec<String>,
) -> Option<NodeId> {
    let (id_str, is_outside_root) = abs_path_to_node_id(abs_path, cwd);
    let id = match NodeId::new(id_str) {
        Ok(id) => id,
        Err(_) => {
            warnings.push(format!(
                "cannot derive node id for {}",
                abs_path.display()
            ));
            return None;
        }
    };

    let already_source = nodes
        .get(&id)
        .is_some_and(|node| node.kind == NodeKind::Source);
    let external_hint = is_external || is_outside_root || is_under_node_modules(abs_path);
    let kind = if already_source || !external_hint {
        NodeKind::Source
    } else {
        NodeKind::External
    };

    let fully_populated = nodes
        .get(&id)
        .and_then(|node| node.metadata.as_ref())
        .is_some_and(|meta| meta.hash.is_some() && meta.size.is_some());
    if !fully_populated {
        match hashed_file_node(abs_path, cwd, kind) {
            Ok(node) => {
                nodes.insert(id.clone(), node);
            }
            Err(err) => {
                warnings.push(format!("cannot hash {id}: {err}"));
                nodes
                    .entry(id.clone())
                    .or_insert_with(|| Node::new(id.clone(), kind, language_for_path(abs_path)));
            }
        }
    }
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverOptions;
    use skein_graph::{EdgeKind, EdgeResolution};
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn id(s: &str) -> NodeId {
        NodeId::new(s).unwrap()
    }

    fn analyze(root: &Path, dirty: &[&str]) -> (FxHashMap<NodeId, Node>, FxHashMap<NodeId, Vec<Edge>>) {
        let mut nodes = FxHashMap::default();
        for rel in dirty {
            let node = hashed_file_node(&root.join(rel), root, NodeKind::Source).unwrap();
            nodes.insert(node.id.clone(), node);
        }
        let dirty: BTreeSet<NodeId> = dirty.iter().map(|s| id(s)).collect();
        let resolver = ModuleResolver::new(ResolverOptions::default());
        let host = AnalysisHost::new(&resolver);
        let mut package_roots = PackageRootCache::new();
        let mut warnings = Vec::new();
        let edges = analyze_dirty_sources(
            root,
            &dirty,
            &mut nodes,
            &resolver,
            &host,
            &mut package_roots,
            &mut warnings,
        );
        (nodes, edges)
    }

    #[test]
    fn builtin_and_missing_imports_materialize() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "builtin.ts", "import fs from 'fs';");
        write(root, "miss.ts", "import x from './nope';");

        let (nodes, edges) = analyze(root, &["builtin.ts", "miss.ts"]);

        let fs_node = nodes.get(&id("node:fs")).unwrap();
        assert_eq!(fs_node.kind, NodeKind::Builtin);
        assert_eq!(fs_node.language, Language::Other);
        assert!(fs_node.metadata.is_none());

        let miss_node = nodes.get(&id("./nope")).unwrap();
        assert_eq!(miss_node.kind, NodeKind::Missing);

        assert_eq!(
            edges.get(&id("builtin.ts")).unwrap().as_slice(),
            &[Edge::explicit(id("node:fs"), EdgeKind::Runtime)]
        );
        assert_eq!(
            edges.get(&id("miss.ts")).unwrap().as_slice(),
            &[Edge::explicit(id("./nope"), EdgeKind::Runtime)]
        );
    }

    #[test]
    fn local_import_materializes_source_node_with_hash() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "a.ts", "import { b } from './b';");
        write(root, "b.ts", "export const b = 1;");

        // Only a.ts is in the dirty universe; b.ts gets materialized.
        let (nodes, edges) = analyze(root, &["a.ts"]);

        let b_node = nodes.get(&id("b.ts")).unwrap();
        assert_eq!(b_node.kind, NodeKind::Source);
        let meta = b_node.metadata.as_ref().unwrap();
        assert!(meta.hash.is_some() && meta.size.is_some());

        let a_edges = edges.get(&id("a.ts")).unwrap();
        assert!(a_edges.contains(&Edge::explicit(id("b.ts"), EdgeKind::Runtime)));
        // Tunneled definer is b.ts itself, implicit.
        assert!(a_edges.contains(&Edge::implicit(id("b.ts"), EdgeKind::Runtime)));
    }

    #[test]
    fn tunneled_edges_carry_the_request_kind() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "models/user.ts", "export type User = { id: string };");
        write(root, "models/index.ts", "export type { User } from './user';");
        write(root, "feature.ts", "import type { User } from './models';");

        let (_, edges) = analyze(root, &["feature.ts"]);
        let feature_edges = edges.get(&id("feature.ts")).unwrap();
        assert!(feature_edges.contains(&Edge::explicit(id("models/index.ts"), EdgeKind::Type)));
        assert!(feature_edges.contains(&Edge::implicit(id("models/user.ts"), EdgeKind::Type)));
        // No other edges out of feature.ts.
        assert_eq!(feature_edges.len(), 2);
    }

    #[test]
    fn namespace_import_has_no_implicit_edge() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "a.ts", "export const x = 1;");
        write(root, "barrel.ts", "export * from './a';");
        write(root, "use.ts", "import * as Ns from './barrel';");

        let (_, edges) = analyze(root, &["use.ts"]);
        assert_eq!(
            edges.get(&id("use.ts")).unwrap().as_slice(),
            &[Edge::explicit(id("barrel.ts"), EdgeKind::Runtime)]
        );
    }

    #[test]
    fn external_nodes_get_external_kind() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(
            root,
            "node_modules/pkg/package.json",
            r#"{"name":"pkg","types":"index.d.ts"}"#,
        );
        write(
            root,
            "node_modules/pkg/index.d.ts",
            "export declare const A: number;",
        );
        write(root, "use.ts", "import { A } from 'pkg';");

        let (nodes, edges) = analyze(root, &["use.ts"]);
        let ext = nodes.get(&id("node_modules/pkg/index.d.ts")).unwrap();
        assert_eq!(ext.kind, NodeKind::External);

        let use_edges = edges.get(&id("use.ts")).unwrap();
        assert_eq!(
            use_edges.iter().filter(|e| e.resolution == EdgeResolution::Explicit).count(),
            1
        );
        // The definer is the barrel itself, so the implicit edge collapses
        // onto the same target.
        assert!(use_edges.contains(&Edge::implicit(
            id("node_modules/pkg/index.d.ts"),
            EdgeKind::Runtime
        )));
    }
}
