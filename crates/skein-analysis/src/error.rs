use std::path::PathBuf;

use skein_graph::MetadataInvariantError;

/// Fatal errors from [`crate::build_graph`].
///
/// Non-fatal conditions (invalid globs, unreadable files, unresolved
/// specifiers) never reach this enum; they surface as entries in
/// [`crate::BuildResult::errors`].
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The configured root is not an absolute path to an existing directory.
    #[error("invalid cwd {path:?}: {reason}")]
    InvalidCwd { path: PathBuf, reason: String },

    /// Hash-without-size offenders under the `error` enforcement policy.
    #[error(transparent)]
    MetadataInvariant(#[from] MetadataInvariantError),

    /// A bug class: the finalized graph contains an edge referencing a node
    /// that was never materialized.
    #[error("internal invariant violated: {0}")]
    Internal(String),
}
