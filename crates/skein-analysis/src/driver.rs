//! Top-level build driver.
//!
//! Sequences the pipeline: scan, hash, plan, analyze, carry, describe,
//! finalize, check invariants, cap errors.

use std::collections::BTreeSet;
use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use skein_graph::{cap_errors, check_hash_size, finalize_parts, Graph, Node, NodeId, NodeKind};

use crate::config::{is_valid_description_tag, BuildOptions};
use crate::describe::extract_description;
use crate::error::BuildError;
use crate::host::AnalysisHost;
use crate::node_factory::hashed_file_node;
use crate::orchestrator::analyze_dirty_sources;
use crate::paths::node_id_to_abs_path;
use crate::planner::plan_incremental;
use crate::resolver::{ModuleResolver, PackageRootCache};
use crate::scanner::scan_universe;

/// Headline numbers for a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStats {
    /// `|nodes|`
    pub modules: usize,
    /// Total edge count across all sources.
    pub edges: usize,
    /// Number of sources re-analyzed this run.
    pub dirty: usize,
}

/// Result of [`build_graph`].
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub graph: Graph,
    pub stats: BuildStats,
    /// Non-fatal conditions: warnings in emission order, invariant messages
    /// ascending, truncation sentinel last.
    pub errors: Vec<String>,
}

/// Compile the dependency graph for a repository.
///
/// Fatal outcomes: an invalid root directory, a metadata invariant
/// violation under the `error` policy, or an internal invariant breach.
/// Everything else surfaces through `BuildResult::errors`.
pub fn build_graph(options: &BuildOptions) -> Result<BuildResult, BuildError> {
    let cwd = options.cwd.as_path();
    if !cwd.is_absolute() {
        return Err(BuildError::InvalidCwd {
            path: cwd.to_path_buf(),
            reason: "path is not absolute".to_string(),
        });
    }
    if !cwd.is_dir() {
        return Err(BuildError::InvalidCwd {
            path: cwd.to_path_buf(),
            reason: "path is not a directory".to_string(),
        });
    }

    let mut warnings: Vec<String> = Vec::new();

    let description_tags: Vec<String> = options
        .node_description_tags
        .iter()
        .filter(|tag| {
            let valid = is_valid_description_tag(tag);
            if !valid {
                warnings.push(format!("invalid description tag '{tag}' dropped"));
            }
            valid
        })
        .cloned()
        .collect();

    // Universe scan and hashing.
    let scan = scan_universe(cwd, &options.config);
    warnings.extend(scan.warnings);

    let mut nodes: FxHashMap<NodeId, Node> = FxHashMap::default();
    for rel in &scan.files {
        let abs = cwd.join(rel);
        match hashed_file_node(&abs, cwd, NodeKind::Source) {
            Ok(node) => {
                nodes.insert(node.id.clone(), node);
            }
            Err(err) => warnings.push(format!("skipping unreadable file {rel}: {err}")),
        }
    }

    // Incremental plan.
    let analyzable: BTreeSet<NodeId> = nodes
        .values()
        .filter(|node| node.language.is_analyzable())
        .map(|node| node.id.clone())
        .collect();
    let plan = plan_incremental(cwd, &analyzable, &nodes, options.previous_graph.as_ref());

    // Analysis of the dirty set.
    let resolver = ModuleResolver::new(options.resolver.clone());
    let host = AnalysisHost::new(&resolver);
    let mut package_roots = PackageRootCache::new();
    let mut edges_by_source = analyze_dirty_sources(
        cwd,
        &plan.dirty_source_ids,
        &mut nodes,
        &resolver,
        &host,
        &mut package_roots,
        &mut warnings,
    );

    // Clean sources reuse their previous edges; nodes those edges reference
    // that the universe no longer produces are carried verbatim.
    for (id, edges) in plan.reused_edges_by_source {
        edges_by_source.entry(id).or_insert(edges);
    }
    let mut carried_ids: FxHashSet<NodeId> = FxHashSet::default();
    for (id, node) in plan.carried_nodes {
        if !nodes.contains_key(&id) {
            carried_ids.insert(id.clone());
            nodes.insert(id, node);
        }
    }

    // Descriptions for analyzable file nodes materialized this run.
    if options.node_description_limit > 0 && !description_tags.is_empty() {
        for node in nodes.values_mut() {
            if carried_ids.contains(&node.id)
                || !node.kind.is_file()
                || !node.language.is_analyzable()
            {
                continue;
            }
            let Some(abs) = node_id_to_abs_path(cwd, node.id.as_str()) else {
                continue;
            };
            if let Ok(text) = std::fs::read_to_string(&abs) {
                node.description = extract_description(
                    &text,
                    options.node_description_limit,
                    &description_tags,
                );
            }
        }
    }

    let graph = finalize_parts(nodes, edges_by_source);
    verify_edge_closure(&graph)?;

    let invariant_messages = check_hash_size(&graph, options.hash_size_enforcement)?;
    warnings.extend(invariant_messages);
    let errors = cap_errors(warnings, options.max_errors);

    let stats = BuildStats {
        modules: graph.nodes.len(),
        edges: graph.edge_count(),
        dirty: plan.dirty_source_ids.len(),
    };
    debug!(
        modules = stats.modules,
        edges = stats.edges,
        dirty = stats.dirty,
        "build complete"
    );

    Ok(BuildResult {
        graph,
        stats,
        errors,
    })
}

/// Every edge endpoint must name a materialized node; anything else is a
/// bug in node materialization or a malformed previous graph.
fn verify_edge_closure(graph: &Graph) -> Result<(), BuildError> {
    for (src, edges) in &graph.edges {
        if !graph.nodes.contains_key(src.as_str()) {
            return Err(BuildError::Internal(format!(
                "edges recorded for unknown node {src}"
            )));
        }
        for edge in edges {
            if !graph.nodes.contains_key(edge.target.as_str()) {
                return Err(BuildError::Internal(format!(
                    "edge {src} -> {} references unknown node",
                    edge.target
                )));
            }
        }
    }
    Ok(())
}
