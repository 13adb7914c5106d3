use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Edge, Node, NodeId};

/// Errors from graph serialization.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("graph serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A file dependency graph.
///
/// Both maps are `BTreeMap` so serialization emits keys in ascending
/// lexicographic order without a separate sort step. A finalized graph
/// additionally guarantees that `edges` has a key for every node (empty
/// vector when the node has no outgoing edges) and that each edge list is
/// de-duplicated and sorted; see [`crate::finalize`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: BTreeMap<NodeId, Node>,
    pub edges: BTreeMap<NodeId, Vec<Edge>>,
}

impl Graph {
    /// Total number of edges across all sources.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    /// Serialize to the persisted JSON format.
    ///
    /// On a finalized graph this is byte-deterministic: map keys ascend,
    /// metadata keys follow the canonical order, hex hashes are lowercase.
    pub fn to_canonical_json(&self) -> Result<String, GraphError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize a graph from its persisted JSON format.
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        Ok(serde_json::from_str(json)?)
    }
}
