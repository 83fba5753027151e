//! Result types produced by [`super::Scanner::scan`] (spec.md §3
//! "ScanResult").

use crate::automaton::UnitType;
use crate::graph::NodeKey;

/// One metrical unit matched during a scan (spec.md §3 "UnitMatch").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitMatch {
    pub unit_type: UnitType,
    /// The production the long/short parser emitted for this unit.
    pub rule_found: String,
    /// Original transcription-parser input characters/tokens this unit
    /// was matched from.
    pub orig_tokens: Vec<String>,
}

/// The verbose variant of [`UnitMatch`] returned when `graph_details` is
/// set (spec.md §3 "NodeMatch").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeMatch {
    pub unit_type: UnitType,
    pub matched_tokens: Vec<String>,
    pub node_key: NodeKey,
    pub parent_key: NodeKey,
    pub orig_tokens: Vec<String>,
    pub rule_found: String,
    pub token_i: usize,
}

/// Per-unit matches of a [`ScanResult`], in either form depending on
/// whether the scan was requested with `graph_details`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matches {
    Units(Vec<UnitMatch>),
    Nodes(Vec<NodeMatch>),
}

/// One complete decomposition of a scanned line into a matched meter
/// (spec.md §3 "ScanResult").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    /// Symbol string over `{=, -, _}`, optionally with `/` foot
    /// separators when `show_feet` was requested.
    pub scan: String,
    pub matches: Matches,
    pub meter_key: usize,
}
