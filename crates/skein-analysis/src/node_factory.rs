//! Node construction for file-backed nodes.

use std::io;
use std::path::Path;

use thiserror::Error;

use skein_graph::{Language, Metadata, Node, NodeId, NodeIdError, NodeKind};

use crate::hasher::hash_file;
use crate::paths::abs_path_to_node_id;

/// Errors from hashed node construction.
#[derive(Debug, Error)]
pub enum NodeFactoryError {
    #[error("cannot derive node id: {0}")]
    NodeId(#[from] NodeIdError),

    #[error("cannot hash {path}: {source}")]
    Hash {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Derive the node language from a path's file name.
pub fn language_for_path(path: &Path) -> Language {
    path.file_name()
        .map(|name| Language::from_file_name(&name.to_string_lossy()))
        .unwrap_or(Language::Other)
}

/// Build a hashed file node for `abs_path`.
///
/// The id and outside-root flag come from the path normalizer; language from
/// the file extension; hash and size from a streaming read.
pub fn hashed_file_node(
    abs_path: &Path,
    cwd: &Path,
    kind: NodeKind,
) -> Result<Node, NodeFactoryError> {
    let (id, is_outside_root) = abs_path_to_node_id(abs_path, cwd);
    let id = NodeId::new(id)?;
    let hashed = hash_file(abs_path).map_err(|source| NodeFactoryError::Hash {
        path: abs_path.display().to_string(),
        source,
    })?;
    Ok(
        Node::new(id, kind, language_for_path(abs_path)).with_metadata(Metadata {
            hash: Some(hashed.hash_hex),
            is_outside_root,
            size: Some(hashed.size),
        }),
    )
}
