//! Selection closure expansion and summarization.
//!
//! Given a finalized graph, a set of include entries, and an optional set of
//! exclude entries, this module expands each entry through outgoing edges
//! (depth-limited, kind-filtered), subtracts the exclude closure from the
//! include closure ("excludes win"), and produces a deterministic summary:
//! sorted selection, byte totals, largest nodes, sorted unique warnings.

use std::collections::{BTreeSet, VecDeque};

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use super::invariants::MetadataInvariantError;
use super::{EdgeKind, EnforcementPolicy, Graph, NodeId, NodeKind};

/// A set of edge kinds, stored as the selection bitmask
/// (runtime=1, type=2, dynamic=4).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeKindSet(u8);

impl EdgeKindSet {
    const ALL_BITS: u8 = 0b111;

    pub fn empty() -> Self {
        Self(0)
    }

    /// All three kinds.
    pub fn all() -> Self {
        Self(Self::ALL_BITS)
    }

    pub fn insert(&mut self, kind: EdgeKind) {
        self.0 |= kind.mask_bit() as u8;
    }

    pub fn contains(self, kind: EdgeKind) -> bool {
        self.0 & kind.mask_bit() as u8 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Build from a numeric bitmask; the second value reports whether any
    /// unknown bits were dropped.
    pub fn from_mask(mask: u64) -> (Self, bool) {
        let known = (mask as u8) & Self::ALL_BITS;
        let dropped = mask & !u64::from(Self::ALL_BITS) != 0;
        (Self(known), dropped)
    }
}

impl FromIterator<EdgeKind> for EdgeKindSet {
    fn from_iter<I: IntoIterator<Item = EdgeKind>>(iter: I) -> Self {
        let mut set = Self::empty();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

/// The third element of a selection entry: either a list of kind names or a
/// numeric bitmask (runtime=1, type=2, dynamic=4).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EdgeKindSpec {
    Mask(u64),
    Names(Vec<String>),
}

/// One include/exclude entry.
///
/// Accepted JSON forms: a bare node id (depth 0, default kinds),
/// `[nodeId, depth]`, or `[nodeId, depth, edgeKinds]` where `edgeKinds` is
/// a name list or bitmask.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectionEntry {
    Id(String),
    WithDepth(String, f64),
    WithKinds(String, f64, EdgeKindSpec),
}

impl SelectionEntry {
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    pub fn with_depth(id: impl Into<String>, depth: u32) -> Self {
        Self::WithDepth(id.into(), f64::from(depth))
    }

    pub fn with_kinds(id: impl Into<String>, depth: u32, kinds: &[EdgeKind]) -> Self {
        Self::WithKinds(
            id.into(),
            f64::from(depth),
            EdgeKindSpec::Names(kinds.iter().map(|k| k.name().to_string()).collect()),
        )
    }
}

/// Options for [`summarize_selection`].
#[derive(Debug, Clone)]
pub struct SelectionOptions {
    /// Edge kinds used by entries that do not name their own.
    pub default_edge_kinds: EdgeKindSet,
    /// Node kinds removed from the selection after subtraction.
    pub drop_node_kinds: Vec<NodeKind>,
    /// Length of the `largest` list; 0 disables it.
    pub max_top: usize,
    /// Hash-implies-size policy applied to the selected nodes.
    pub hash_size_enforcement: EnforcementPolicy,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            default_edge_kinds: EdgeKindSet::all(),
            drop_node_kinds: vec![NodeKind::Builtin, NodeKind::Missing],
            max_top: 10,
            hash_size_enforcement: EnforcementPolicy::Warn,
        }
    }
}

/// A `largest` list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LargestEntry {
    pub id: String,
    pub bytes: u64,
}

/// Deterministic selection summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSummary {
    /// Selected node ids, ascending.
    pub selected_node_ids: Vec<String>,
    pub selected_count: usize,
    /// Sum of `metadata.size` over selected nodes; absent sizes contribute 0.
    pub total_bytes: u64,
    /// Top nodes by size, descending, ties broken by id ascending.
    pub largest: Vec<LargestEntry>,
    /// Unique warnings, ascending.
    pub warnings: Vec<String>,
}

struct NormalizedEntry {
    id: String,
    depth: u32,
    kinds: EdgeKindSet,
}

fn normalize_entries(
    entries: &[SelectionEntry],
    list: &str,
    defaults: EdgeKindSet,
    warnings: &mut Vec<String>,
) -> Vec<NormalizedEntry> {
    let mut normalized = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let (id, raw_depth, spec) = match entry {
            SelectionEntry::Id(id) => (id, 0.0, None),
            SelectionEntry::WithDepth(id, depth) => (id, *depth, None),
            SelectionEntry::WithKinds(id, depth, spec) => (id, *depth, Some(spec)),
        };
        if id.is_empty() {
            warnings.push(format!("invalid nodeId at {list}[{index}]: entry dropped"));
            continue;
        }
        let depth = if raw_depth.is_finite() && raw_depth >= 0.0 && raw_depth.fract() == 0.0 {
            raw_depth as u32
        } else {
            warnings.push(format!("invalid depth at {list}[{index}]: clamped to 0"));
            0
        };
        let kinds = match spec {
            None => defaults,
            Some(EdgeKindSpec::Mask(mask)) => {
                let (set, dropped) = EdgeKindSet::from_mask(*mask);
                if dropped {
                    warnings.push(format!(
                        "invalid edge kind bits at {list}[{index}]: {mask}"
                    ));
                }
                if set.is_empty() {
                    warnings.push(format!("no valid edgeKinds at {list}[{index}]"));
                }
                set
            }
            Some(EdgeKindSpec::Names(names)) => {
                let mut set = EdgeKindSet::empty();
                for name in names {
                    match EdgeKind::from_name(name) {
                        Some(kind) => set.insert(kind),
                        None => warnings.push(format!(
                            "invalid edge kind at {list}[{index}]: {name}"
                        )),
                    }
                }
                if set.is_empty() {
                    warnings.push(format!("no valid edgeKinds at {list}[{index}]"));
                }
                set
            }
        };
        normalized.push(NormalizedEntry {
            id: id.clone(),
            depth,
            kinds,
        });
    }
    normalized
}

/// Expand entries through outgoing edges.
///
/// A FIFO queue of `(id, remaining, kinds)` drives the traversal. The
/// best-remaining-depth map allows a node to be re-expanded when it is
/// reached again with a strictly larger depth budget, which both guarantees
/// termination and makes entry order irrelevant to the result.
fn expand(graph: &Graph, entries: &[NormalizedEntry]) -> FxHashSet<String> {
    let mut selected: FxHashSet<String> = FxHashSet::default();
    let mut best_remaining: FxHashMap<String, u32> = FxHashMap::default();
    let mut queue: VecDeque<(String, u32, EdgeKindSet)> = VecDeque::new();

    for entry in entries {
        selected.insert(entry.id.clone());
        let best = best_remaining.entry(entry.id.clone()).or_insert(entry.depth);
        if entry.depth > *best {
            *best = entry.depth;
        }
        queue.push_back((entry.id.clone(), entry.depth, entry.kinds));
    }

    while let Some((id, remaining, kinds)) = queue.pop_front() {
        if remaining == 0 || kinds.is_empty() {
            continue;
        }
        let Some(edges) = graph.edges.get(id.as_str()) else {
            continue;
        };
        for edge in edges {
            if !kinds.contains(edge.kind) {
                continue;
            }
            let target = edge.target.as_str();
            selected.insert(target.to_string());
            let next = remaining - 1;
            let better = match best_remaining.get(target) {
                Some(best) => next > *best,
                None => true,
            };
            if better {
                best_remaining.insert(target.to_string(), next);
                queue.push_back((target.to_string(), next, kinds));
            }
        }
    }

    selected
}

/// Summarize a selection over a finalized graph.
///
/// Expansion runs independently for the include and exclude entry lists and
/// the exclude closure is subtracted from the include closure, so an exclude
/// entry removes exactly the nodes its own closure reaches. Fails only under
/// [`EnforcementPolicy::Error`] with hashed-without-size offenders among the
/// selected nodes.
pub fn summarize_selection(
    graph: &Graph,
    include: &[SelectionEntry],
    exclude: Option<&[SelectionEntry]>,
    options: &SelectionOptions,
) -> Result<SelectionSummary, MetadataInvariantError> {
    let mut warnings: Vec<String> = Vec::new();
    let defaults = options.default_edge_kinds;

    let include_entries = normalize_entries(include, "include", defaults, &mut warnings);
    let exclude_entries =
        normalize_entries(exclude.unwrap_or(&[]), "exclude", defaults, &mut warnings);

    let selected = expand(graph, &include_entries);
    let excluded = expand(graph, &exclude_entries);

    // Excludes always win.
    let mut remaining: BTreeSet<String> = selected
        .into_iter()
        .filter(|id| !excluded.contains(id))
        .collect();

    // Drop configured node kinds; unknown ids (no node) are kept.
    let dropped: Vec<(String, NodeKind)> = remaining
        .iter()
        .filter_map(|id| {
            graph
                .nodes
                .get(id.as_str())
                .map(|node| node.kind)
                .filter(|kind| options.drop_node_kinds.contains(kind))
                .map(|kind| (id.clone(), kind))
        })
        .collect();
    for (id, kind) in &dropped {
        remaining.remove(id);
        warnings.push(format!("Dropped {} node from selection: {id}", kind.name()));
    }

    let mut total_bytes: u64 = 0;
    let mut sizes: Vec<LargestEntry> = Vec::with_capacity(remaining.len());
    let mut hashed_without_size: Vec<NodeId> = Vec::new();

    for id in &remaining {
        let Some(node) = graph.nodes.get(id.as_str()) else {
            warnings.push(format!("Selected nodeId not present in graph.nodes: {id}"));
            sizes.push(LargestEntry {
                id: id.clone(),
                bytes: 0,
            });
            continue;
        };
        let metadata = node.metadata.as_ref();
        let size = metadata.and_then(|m| m.size);
        let bytes = size.unwrap_or(0);
        total_bytes += bytes;
        sizes.push(LargestEntry {
            id: id.clone(),
            bytes,
        });

        if options.hash_size_enforcement != EnforcementPolicy::Ignore
            && node.kind.is_file()
            && size.is_none()
        {
            if metadata.is_some_and(|m| m.hash.is_some()) {
                hashed_without_size.push(node.id.clone());
            } else {
                warnings.push(format!("metadata.size missing for file node: {id}"));
            }
        }
    }

    match options.hash_size_enforcement {
        EnforcementPolicy::Error if !hashed_without_size.is_empty() => {
            return Err(MetadataInvariantError::from_offenders(&hashed_without_size));
        }
        EnforcementPolicy::Warn => {
            for id in &hashed_without_size {
                warnings.push(format!("metadata.size missing for hashed node: {id}"));
            }
        }
        _ => {}
    }

    let largest = if options.max_top == 0 {
        Vec::new()
    } else {
        sizes.sort_by(|a, b| b.bytes.cmp(&a.bytes).then_with(|| a.id.cmp(&b.id)));
        sizes.truncate(options.max_top);
        sizes
    };

    let warnings: Vec<String> = warnings
        .into_iter()
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect();

    let selected_node_ids: Vec<String> = remaining.into_iter().collect();
    Ok(SelectionSummary {
        selected_count: selected_node_ids.len(),
        selected_node_ids,
        total_bytes,
        largest,
        warnings,
    })
}
