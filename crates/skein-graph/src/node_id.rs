use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when constructing a [`NodeId`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NodeIdError {
    /// The empty string is never a valid node key.
    #[error("node id must not be empty")]
    Empty,
}

/// Canonical identifier for a graph node.
///
/// Four shapes exist, distinguished by content rather than type:
///
/// - repo-relative POSIX path for in-repo files (`src/a.ts`),
/// - POSIX-normalized absolute path for outside-root files (`C:/lib/x.d.ts`),
/// - `node:<name>` for runtime builtins,
/// - the verbatim unresolved specifier for missing modules (`./nope`).
///
/// Ordering is plain lexicographic string order, which is what the
/// finalizer's canonical sort relies on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a node id, rejecting the empty string.
    pub fn new(id: impl Into<String>) -> Result<Self, NodeIdError> {
        let id = id.into();
        if id.is_empty() {
            return Err(NodeIdError::Empty);
        }
        Ok(Self(id))
    }

    /// Prefix used by builtin module ids.
    pub const BUILTIN_PREFIX: &'static str = "node:";

    /// Create the id of a runtime builtin (`node:<name>`).
    ///
    /// The `node:` prefix is stripped from `name` first, so both `fs` and
    /// `node:fs` yield `node:fs`.
    pub fn builtin(name: &str) -> Self {
        let bare = name.strip_prefix(Self::BUILTIN_PREFIX).unwrap_or(name);
        Self(format!("{}{}", Self::BUILTIN_PREFIX, bare))
    }

    /// Returns true for builtin ids (`node:` prefix).
    pub fn is_builtin(&self) -> bool {
        self.0.starts_with(Self::BUILTIN_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
