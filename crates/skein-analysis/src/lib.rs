//! # skein-analysis
//!
//! Deterministic dependency-graph compiler for TypeScript/JavaScript
//! repositories.
//!
//! Given a root directory, [`build_graph`] produces a stable,
//! JSON-serializable graph of files and their inter-module relationships,
//! plus sizing/hash metadata used by downstream selection engines to budget
//! LLM context. The pipeline:
//!
//! 1. **Universe scan** ([`scanner`]): enumerate candidate files with
//!    gitignore + include/exclude precedence and implicit deny rules.
//! 2. **Hashing** ([`hasher`], [`node_factory`]): SHA-256 + byte size for
//!    every universe file, folded into sparse node metadata.
//! 3. **Incremental planning** ([`planner`]): given a previous graph, the
//!    reverse-dependency closure of changed files becomes the dirty set;
//!    clean sources reuse their previous edges, and nodes those edges
//!    reference are carried forward.
//! 4. **Analysis** ([`surface`], [`resolver`], [`reexport`], [`tunnel`],
//!    [`orchestrator`]): each dirty source yields explicit import edges and
//!    implicit "tunneled" edges that follow barrel re-export chains to the
//!    module that actually defines each imported name.
//! 5. **Finalization** (`skein-graph`): canonical ordering, invariant
//!    checks, error capping.
//!
//! Selection summarization over a built graph lives in `skein-graph` and is
//! re-exported here, so this crate is the single dependency a host needs.

pub mod config;
pub mod describe;
pub mod driver;
pub mod error;
pub mod hasher;
pub mod host;
pub mod node_factory;
pub mod orchestrator;
pub mod paths;
pub mod planner;
pub mod reexport;
pub mod resolver;
pub mod scanner;
pub mod surface;
pub mod tunnel;

pub use config::{BuildOptions, ResolverOptions, ScanConfig};
pub use describe::extract_description;
pub use driver::{build_graph, BuildResult, BuildStats};
pub use error::BuildError;
pub use host::{AnalysisHost, ModuleHost};
pub use planner::{plan_incremental, IncrementalPlan};
pub use resolver::{ModuleResolver, Resolution};

// Re-export the graph model and the second public operation so hosts depend
// on one crate.
pub use skein_graph::{
    cap_errors, summarize_selection, Edge, EdgeKind, EdgeResolution, EnforcementPolicy, Graph,
    Language, Metadata, MetadataInvariantError, Node, NodeId, NodeKind, SelectionEntry,
    SelectionOptions, SelectionSummary,
};
