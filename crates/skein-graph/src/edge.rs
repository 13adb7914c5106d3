use serde::{Deserialize, Serialize};

use super::NodeId;

/// Edge classification.
///
/// Variant order matches the lexicographic order of the serialized names
/// (`dynamic` < `runtime` < `type`), so the derived `Ord` is the canonical
/// edge sort.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Dynamic,
    Runtime,
    Type,
}

impl EdgeKind {
    /// Bitmask value used by selection entry parsing
    /// (runtime=1, type=2, dynamic=4).
    pub fn mask_bit(self) -> u64 {
        match self {
            Self::Runtime => 1,
            Self::Type => 2,
            Self::Dynamic => 4,
        }
    }

    /// Parse a lowercase kind name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "runtime" => Some(Self::Runtime),
            "type" => Some(Self::Type),
            "dynamic" => Some(Self::Dynamic),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dynamic => "dynamic",
            Self::Runtime => "runtime",
            Self::Type => "type",
        }
    }
}

/// How an edge was discovered.
///
/// `Explicit` edges come from import/export statements in the source;
/// `Implicit` edges come from barrel tunneling. Variant order matches the
/// lexicographic order of the serialized names.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EdgeResolution {
    Explicit,
    Implicit,
}

/// A directed dependency edge to `target`.
///
/// Field order gives the derived `Ord` the canonical
/// (target, kind, resolution) sort used by the finalizer.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Edge {
    pub target: NodeId,
    pub kind: EdgeKind,
    pub resolution: EdgeResolution,
}

impl Edge {
    pub fn new(target: NodeId, kind: EdgeKind, resolution: EdgeResolution) -> Self {
        Self {
            target,
            kind,
            resolution,
        }
    }

    pub fn explicit(target: NodeId, kind: EdgeKind) -> Self {
        Self::new(target, kind, EdgeResolution::Explicit)
    }

    pub fn implicit(target: NodeId, kind: EdgeKind) -> Self {
        Self::new(target, kind, EdgeResolution::Implicit)
    }
}
