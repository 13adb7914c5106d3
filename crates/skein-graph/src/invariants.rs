//! Metadata invariant enforcement.
//!
//! The one cross-field rule the graph carries is "hash implies size": a
//! file-backed node (`source`/`external`) that records a content hash must
//! also record its byte size. Downstream selection engines budget on sizes,
//! so a hashed node with no size silently corrupts totals.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Graph, NodeId};

/// How many offender ids a thrown [`MetadataInvariantError`] lists.
const MAX_REPORTED_OFFENDERS: usize = 10;

/// Enforcement policy for the hash-implies-size invariant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnforcementPolicy {
    #[default]
    Warn,
    Error,
    Ignore,
}

/// Fatal hash-implies-size violation under [`EnforcementPolicy::Error`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{}", self.message())]
pub struct MetadataInvariantError {
    /// Total offender count.
    pub count: usize,
    /// Up to the first ten offender ids, ascending.
    pub ids: Vec<NodeId>,
}

impl MetadataInvariantError {
    pub(crate) fn from_offenders(offenders: &[NodeId]) -> Self {
        Self {
            count: offenders.len(),
            ids: offenders
                .iter()
                .take(MAX_REPORTED_OFFENDERS)
                .cloned()
                .collect(),
        }
    }

    fn message(&self) -> String {
        let listed: Vec<&str> = self.ids.iter().map(NodeId::as_str).collect();
        let suffix = if self.count > listed.len() { ", ..." } else { "" };
        format!(
            "metadata.size missing for {} hashed node(s): {}{}",
            self.count,
            listed.join(", "),
            suffix
        )
    }
}

/// Collect hash-without-size offenders, ascending by id.
pub(crate) fn hash_size_offenders(graph: &Graph) -> Vec<NodeId> {
    graph
        .nodes
        .values()
        .filter(|node| {
            node.kind.is_file()
                && node
                    .metadata
                    .as_ref()
                    .is_some_and(|m| m.hash.is_some() && m.size.is_none())
        })
        .map(|node| node.id.clone())
        .collect()
}

/// Enforce the hash-implies-size invariant on a finalized graph.
///
/// - `Ignore`: returns no messages.
/// - `Warn`: returns one message per offender, ascending by id.
/// - `Error`: fails with a single [`MetadataInvariantError`] listing the
///   offender count and up to the first ten ids (with `...` if more).
pub fn check_hash_size(
    graph: &Graph,
    policy: EnforcementPolicy,
) -> Result<Vec<String>, MetadataInvariantError> {
    if policy == EnforcementPolicy::Ignore {
        return Ok(Vec::new());
    }
    let offenders = hash_size_offenders(graph);
    if offenders.is_empty() {
        return Ok(Vec::new());
    }
    if policy == EnforcementPolicy::Error {
        return Err(MetadataInvariantError::from_offenders(&offenders));
    }
    Ok(offenders
        .iter()
        .map(|id| format!("warning: metadata.size missing for hashed node {id}"))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{finalize_parts, Language, Metadata, Node, NodeKind};

    fn hashed_node(name: &str, size: Option<u64>) -> (NodeId, Node) {
        let id = NodeId::new(name).unwrap();
        let node = Node::new(id.clone(), NodeKind::External, Language::Ts).with_metadata(
            Metadata {
                hash: Some("ef".repeat(32)),
                is_outside_root: false,
                size,
            },
        );
        (id, node)
    }

    #[test]
    fn clean_graph_yields_no_messages() {
        let graph = finalize_parts([hashed_node("a.ts", Some(1))], []);
        assert_eq!(
            check_hash_size(&graph, EnforcementPolicy::Warn).unwrap(),
            Vec::<String>::new()
        );
    }

    #[test]
    fn warn_lists_each_offender_ascending() {
        let graph = finalize_parts(
            [hashed_node("z.ts", None), hashed_node("a.ts", None)],
            [],
        );
        let messages = check_hash_size(&graph, EnforcementPolicy::Warn).unwrap();
        assert_eq!(
            messages,
            vec![
                "warning: metadata.size missing for hashed node a.ts".to_string(),
                "warning: metadata.size missing for hashed node z.ts".to_string(),
            ]
        );
    }

    #[test]
    fn ignore_is_silent() {
        let graph = finalize_parts([hashed_node("a.ts", None)], []);
        assert!(check_hash_size(&graph, EnforcementPolicy::Ignore)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn error_caps_reported_ids_at_ten() {
        let nodes: Vec<_> = (0..12)
            .map(|i| hashed_node(&format!("m{i:02}.ts"), None))
            .collect();
        let graph = finalize_parts(nodes, []);
        let err = check_hash_size(&graph, EnforcementPolicy::Error).unwrap_err();
        assert_eq!(err.count, 12);
        assert_eq!(err.ids.len(), 10);
        let text = err.to_string();
        assert!(text.contains("12 hashed node(s)"));
        assert!(text.ends_with(", ..."));
    }
}
