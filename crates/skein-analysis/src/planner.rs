//! Incremental planning.
//!
//! Compares the current universe against a previous graph to decide which
//! sources must be re-analyzed. Three change signals feed the dirty set:
//! hash mismatches between runs, deleted source files, and on-disk drift of
//! previously hashed nodes. The transitive reverse-dependency closure of the
//! changed set, intersected with the analyzable universe, is the dirty set;
//! everything else reuses its previous edges, carrying forward any nodes
//! those edges reference that the current universe no longer produces.

use std::collections::BTreeSet;
use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use skein_graph::{Edge, Graph, Node, NodeId};

use crate::hasher::try_hash_file;
use crate::paths::node_id_to_abs_path;

/// Output of incremental planning.
#[derive(Debug, Default)]
pub struct IncrementalPlan {
    /// Analyzable sources that must be re-analyzed this run.
    pub dirty_source_ids: BTreeSet<NodeId>,
    /// Previous outgoing edges reused for clean sources.
    pub reused_edges_by_source: FxHashMap<NodeId, Vec<Edge>>,
    /// Nodes referenced by reused edges that are absent from the current
    /// universe, copied verbatim from the previous graph.
    pub carried_nodes: FxHashMap<NodeId, Node>,
    /// Raw changed/deleted/drifted ids, for diagnostics.
    pub changed_node_ids: BTreeSet<NodeId>,
}

fn node_hash(node: &Node) -> Option<&str> {
    if !node.kind.is_file() {
        return None;
    }
    node.metadata.as_ref().and_then(|m| m.hash.as_deref())
}

/// Plan the incremental work for this run.
///
/// With no previous graph every analyzable source is dirty and nothing is
/// reused or carried.
pub fn plan_incremental(
    cwd: &Path,
    analyzable_source_ids: &BTreeSet<NodeId>,
    current_nodes: &FxHashMap<NodeId, Node>,
    previous_graph: Option<&Graph>,
) -> IncrementalPlan {
    let Some(previous) = previous_graph else {
        return IncrementalPlan {
            dirty_source_ids: analyzable_source_ids.clone(),
            ..IncrementalPlan::default()
        };
    };

    // Reverse index over previous edges: target -> sources.
    let mut reverse: FxHashMap<&NodeId, Vec<&NodeId>> = FxHashMap::default();
    for (src, edges) in &previous.edges {
        for edge in edges {
            reverse.entry(&edge.target).or_default().push(src);
        }
    }

    let mut changed: BTreeSet<NodeId> = BTreeSet::new();

    // Hash mismatches between the previous graph and the fresh universe.
    for (id, node) in current_nodes {
        let Some(current_hash) = node_hash(node) else {
            continue;
        };
        let previous_hash = previous
            .nodes
            .get(id.as_str())
            .and_then(node_hash);
        if previous_hash != Some(current_hash) {
            changed.insert(id.clone());
        }
    }

    // Deleted sources: previous source nodes absent from the universe.
    for (id, node) in &previous.nodes {
        if node.kind == skein_graph::NodeKind::Source && !current_nodes.contains_key(id) {
            changed.insert(id.clone());
        }
    }

    // On-disk drift of previously hashed nodes (externals included). The
    // rehash is best-effort: unreadable files are ignored.
    for (id, node) in &previous.nodes {
        let Some(previous_hash) = node_hash(node) else {
            continue;
        };
        let Some(abs) = node_id_to_abs_path(cwd, id.as_str()) else {
            continue;
        };
        if let Some(hashed) = try_hash_file(&abs) {
            if hashed.hash_hex != previous_hash {
                changed.insert(id.clone());
            }
        }
    }

    // Transitive reverse closure via BFS.
    let mut closure: FxHashSet<&NodeId> = FxHashSet::default();
    let mut queue: Vec<&NodeId> = changed.iter().collect();
    for id in &queue {
        closure.insert(id);
    }
    while let Some(id) = queue.pop() {
        if let Some(dependents) = reverse.get(id) {
            for dependent in dependents {
                if closure.insert(dependent) {
                    queue.push(dependent);
                }
            }
        }
    }

    let dirty_source_ids: BTreeSet<NodeId> = analyzable_source_ids
        .iter()
        .filter(|id| closure.contains(id))
        .cloned()
        .collect();

    // Clean analyzable sources reuse their previous edges.
    let mut reused_edges_by_source: FxHashMap<NodeId, Vec<Edge>> = FxHashMap::default();
    for id in analyzable_source_ids {
        if dirty_source_ids.contains(id) {
            continue;
        }
        if let Some(edges) = previous.edges.get(id.as_str()) {
            if !edges.is_empty() {
                reused_edges_by_source.insert(id.clone(), edges.clone());
            }
        }
    }

    // Carry nodes referenced by reused edges that the universe no longer
    // produces.
    let mut carried_nodes: FxHashMap<NodeId, Node> = FxHashMap::default();
    for (src, edges) in &reused_edges_by_source {
        for id in std::iter::once(src).chain(edges.iter().map(|e| &e.target)) {
            if !current_nodes.contains_key(id) && !carried_nodes.contains_key(id) {
                if let Some(node) = previous.nodes.get(id.as_str()) {
                    carried_nodes.insert(id.clone(), node.clone());
                }
            }
        }
    }

    debug!(
        changed = changed.len(),
        dirty = dirty_source_ids.len(),
        reused = reused_edges_by_source.len(),
        carried = carried_nodes.len(),
        "incremental plan"
    );

    IncrementalPlan {
        dirty_source_ids,
        reused_edges_by_source,
        carried_nodes,
        changed_node_ids: changed,
    }
}
