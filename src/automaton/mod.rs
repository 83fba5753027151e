//! The Meter Automaton Builder (spec.md §4.3): turns one meter regex into
//! a minimised graph, then folds every meter's minimised graph into a
//! single shared translation graph.

mod merge;
mod nfa;
pub(crate) mod regex;

use crate::error::{Error, RegexError, Result};
use crate::graph::{DirectedGraph, NodeKey};
use crate::util::Log;

/// One metrical unit a meter regex can name (spec.md §3 "Translation
/// graph node").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitType {
    /// `=` — a heavy/long syllable.
    Long,
    /// `-` — a light/short syllable.
    Short,
    /// `_` — an optional, uncounted short preceding a word boundary.
    OptionalShort,
}

impl UnitType {
    pub fn symbol(self) -> char {
        match self {
            UnitType::Long => '=',
            UnitType::Short => '-',
            UnitType::OptionalShort => '_',
        }
    }

    pub(crate) fn from_symbol(c: char) -> Option<Self> {
        match c {
            '=' => Some(UnitType::Long),
            '-' => Some(UnitType::Short),
            '_' => Some(UnitType::OptionalShort),
            _ => None,
        }
    }
}

impl std::fmt::Display for UnitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Node kind of a single meter's minimised graph (spec.md §3 "NFA node
/// types", after `Split` nodes are removed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MinNodeKind {
    /// The sentinel `0` node prepended before each meter's regex.
    Sentinel,
    Unit(UnitType),
    Accepting,
}

/// Node kind of the merged translation graph (spec.md §3 "Translation
/// graph node").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransNodeKind {
    /// The single shared root, type `0`.
    Start,
    Unit(UnitType),
    /// Carries the index of this node's meter into the scanner's
    /// `meters_list` (spec.md calls this `meter_key`).
    Accepting { meter_key: usize },
}

/// Build one meter's minimised graph (spec.md §4.3 "Per-meter graph"):
/// prepend the sentinel root, convert to postfix, Thompson-construct an
/// NFA, then remove `Split` nodes.
pub(crate) fn build_meter_graph(
    pattern: &str,
) -> std::result::Result<(DirectedGraph<MinNodeKind, ()>, NodeKey), RegexError> {
    regex::validate_alphabet(pattern)?;
    let wrapped = format!("0({})", pattern);
    let postfix = regex::to_postfix(&wrapped)?;
    let (graph, start) = nfa::build(&postfix)?;
    Ok(nfa::minimize(&graph, start))
}

/// Build the shared translation graph for an ordered list of meter
/// regexes (spec.md §4.3 "Merging into translation graph"). `patterns[i]`
/// is merged in carrying `meter_key = i`.
pub fn build_translation_graph(
    patterns: &[String],
) -> Result<DirectedGraph<TransNodeKind, ()>> {
    build_translation_graph_with_debug(patterns, Log::None)
}

/// As [`build_translation_graph`], but traces each meter's merge through
/// `debug` (only prints in debug builds — see [`crate::util::Log`]).
pub fn build_translation_graph_with_debug(
    patterns: &[String],
    debug: Log<&'static str>,
) -> Result<DirectedGraph<TransNodeKind, ()>> {
    let mut graph: DirectedGraph<TransNodeKind, ()> = DirectedGraph::new();
    graph.add_node(TransNodeKind::Start);

    for (meter_key, pattern) in patterns.iter().enumerate() {
        let (per_meter, per_meter_root) =
            build_meter_graph(pattern).map_err(Error::from)?;
        merge::merge_meter_into(&mut graph, &per_meter, per_meter_root, meter_key);
        debug.trace(format_args!(
            "merged meter {} of {} (\"{}\") into translation graph",
            meter_key + 1,
            patterns.len(),
            pattern
        ));
    }

    debug.trace(format_args!(
        "built translation graph with {} nodes for {} meters",
        graph.len(),
        patterns.len()
    ));
    Ok(graph)
}
