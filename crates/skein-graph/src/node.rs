use serde::{Deserialize, Serialize};

use super::NodeId;

/// Node classification.
///
/// `Source` and `External` are file-backed and may carry hash/size metadata;
/// `Builtin` and `Missing` never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Source,
    External,
    Builtin,
    Missing,
}

impl NodeKind {
    /// Returns true for the file-backed kinds (`source`, `external`).
    pub fn is_file(self) -> bool {
        matches!(self, Self::Source | Self::External)
    }

    /// The serialized (lowercase) name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::External => "external",
            Self::Builtin => "builtin",
            Self::Missing => "missing",
        }
    }
}

/// Node language derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ts,
    Js,
    Json,
    Md,
    Other,
}

impl Language {
    /// Derive the language from a file name.
    ///
    /// `.d.ts` is checked before the plain extension so declaration files
    /// classify as TypeScript rather than falling through on `ts`.
    pub fn from_file_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".d.ts") || lower.ends_with(".ts") || lower.ends_with(".tsx") {
            Self::Ts
        } else if lower.ends_with(".js") || lower.ends_with(".jsx") {
            Self::Js
        } else if lower.ends_with(".json") {
            Self::Json
        } else if lower.ends_with(".md") {
            Self::Md
        } else {
            Self::Other
        }
    }

    /// Returns true for the analyzable languages (`ts`, `js`).
    pub fn is_analyzable(self) -> bool {
        matches!(self, Self::Ts | Self::Js)
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Sparse node metadata.
///
/// Field declaration order is the canonical serialized key order
/// (`hash`, `isOutsideRoot`, `size`); absent and false values are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Lowercase hex SHA-256 of the file bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    /// Present (true) only for files outside the repository root.
    #[serde(
        rename = "isOutsideRoot",
        default,
        skip_serializing_if = "is_false"
    )]
    pub is_outside_root: bool,
    /// File size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl Metadata {
    /// True when every field is absent, meaning the whole object is omitted.
    pub fn is_empty(&self) -> bool {
        self.hash.is_none() && !self.is_outside_root && self.size.is_none()
    }
}

/// A graph node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl Node {
    /// Assemble a node with no description or metadata.
    pub fn new(id: NodeId, kind: NodeKind, language: Language) -> Self {
        Self {
            id,
            kind,
            language,
            description: None,
            metadata: None,
        }
    }

    /// Attach metadata, enforcing the per-kind constraints: builtin and
    /// missing nodes never carry hash or size, and empty metadata collapses
    /// to absent.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Self::sanitize_metadata(self.kind, metadata);
        self
    }

    /// Attach a description; empty or whitespace-only descriptions collapse
    /// to absent.
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        self
    }

    pub(crate) fn sanitize_metadata(kind: NodeKind, mut metadata: Metadata) -> Option<Metadata> {
        if !kind.is_file() {
            metadata.hash = None;
            metadata.size = None;
        }
        if metadata.hash.as_deref() == Some("") {
            metadata.hash = None;
        }
        if metadata.is_empty() {
            None
        } else {
            Some(metadata)
        }
    }
}
