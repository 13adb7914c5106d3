//! # skein-graph
//!
//! Pure data structures for file dependency graphs.
//!
//! This crate provides the graph model produced by `skein-analysis` and the
//! deterministic operations defined over it, without any I/O or language
//! analysis:
//!
//! - **Nodes and edges**: tagged node variants (`source`, `external`,
//!   `builtin`, `missing`) with sparse, canonically ordered metadata, and
//!   edges classified by kind (`runtime`, `type`, `dynamic`) and resolution
//!   (`explicit`, `implicit`).
//! - **Finalization**: normalizes nodes, completes the edges map, and imposes
//!   the canonical ordering that makes serialization byte-stable.
//! - **Invariant checking**: the "hash implies size" metadata rule with a
//!   warn/error/ignore policy.
//! - **Selection summarization**: depth-limited, kind-filtered closure
//!   expansion with excludes-win semantics and a deterministic summary.
//! - **Error capping**: deterministic truncation of error collections.
//!
//! The graph serializes through serde to the persisted JSON format: node and
//! edge map keys ascend lexicographically (`BTreeMap`), metadata keys appear
//! in the order `hash`, `isOutsideRoot`, `size`, and enum tags are lowercase.
//!
//! ## Quick start
//!
//! ```rust
//! use skein_graph::{Edge, EdgeKind, EdgeResolution, Graph, Language, Node, NodeId, NodeKind};
//!
//! # fn main() -> Result<(), skein_graph::NodeIdError> {
//! let mut graph = Graph::default();
//! let id = NodeId::new("src/index.ts")?;
//! graph.nodes.insert(
//!     id.clone(),
//!     Node::new(id.clone(), NodeKind::Source, Language::Ts),
//! );
//! graph.edges.insert(id, Vec::new());
//!
//! let finalized = skein_graph::finalize(graph);
//! assert!(finalized.to_canonical_json().is_ok());
//! # Ok(())
//! # }
//! ```

pub mod edge;
pub mod errors;
pub mod finalize;
pub mod graph;
pub mod invariants;
pub mod node;
pub mod node_id;
pub mod selection;

pub use edge::{Edge, EdgeKind, EdgeResolution};
pub use errors::cap_errors;
pub use finalize::{finalize, finalize_parts};
pub use graph::{Graph, GraphError};
pub use invariants::{check_hash_size, EnforcementPolicy, MetadataInvariantError};
pub use node::{Language, Metadata, Node, NodeKind};
pub use node_id::{NodeId, NodeIdError};
pub use selection::{
    summarize_selection, EdgeKindSet, EdgeKindSpec, LargestEntry, SelectionEntry,
    SelectionOptions, SelectionSummary,
};
