//! Graph finalization.
//!
//! Finalization takes the working maps produced during analysis (arbitrary
//! iteration order, possibly duplicated edges, possibly missing edge keys)
//! and produces the canonical graph: normalized nodes, a complete edges map,
//! de-duplicated and sorted edge lists, ascending key order everywhere.
//! Finalization is idempotent.

use std::collections::BTreeMap;

use super::{Edge, Graph, Node, NodeId};

/// Finalize a graph into its canonical form.
///
/// - Node metadata is re-sanitized (canonical sparseness, per-kind
///   constraints) and descriptions trimmed.
/// - `edges` gains a key for every node; absence of outgoing edges is an
///   empty vector, never a missing key.
/// - Each edge list is de-duplicated on `(target, kind, resolution)` and
///   sorted by that triple.
/// - Edge entries for ids that have no node are preserved (the invariant
///   checker reports them; finalization never drops data silently).
pub fn finalize(graph: Graph) -> Graph {
    let Graph { nodes, edges } = graph;

    let mut final_nodes: BTreeMap<NodeId, Node> = BTreeMap::new();
    for (id, node) in nodes {
        final_nodes.insert(id, normalize_node(node));
    }

    let mut final_edges: BTreeMap<NodeId, Vec<Edge>> = BTreeMap::new();
    for (src, list) in edges {
        final_edges.insert(src, normalize_edges(list));
    }
    for id in final_nodes.keys() {
        final_edges.entry(id.clone()).or_default();
    }

    Graph {
        nodes: final_nodes,
        edges: final_edges,
    }
}

/// Build a graph from working hash maps and finalize it in one step.
pub fn finalize_parts(
    nodes: impl IntoIterator<Item = (NodeId, Node)>,
    edges: impl IntoIterator<Item = (NodeId, Vec<Edge>)>,
) -> Graph {
    finalize(Graph {
        nodes: nodes.into_iter().collect(),
        edges: edges.into_iter().collect(),
    })
}

fn normalize_node(node: Node) -> Node {
    let Node {
        id,
        kind,
        language,
        description,
        metadata,
    } = node;
    let metadata = metadata.and_then(|m| Node::sanitize_metadata(kind, m));
    let description = description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    Node {
        id,
        kind,
        language,
        description,
        metadata,
    }
}

fn normalize_edges(mut edges: Vec<Edge>) -> Vec<Edge> {
    edges.sort();
    edges.dedup();
    edges
}
