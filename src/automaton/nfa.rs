//! Postfix regex -> Thompson NFA -> minimised graph (spec.md §4.3 "Postfix
//! -> NFA", "NFA -> minimised graph"). Also translated from Russ Cox's
//! `dfa0.c` fragment-stack construction.

use std::collections::{HashSet, VecDeque};

use crate::error::RegexError;
use crate::graph::{DirectedGraph, NodeKey};

use super::{MinNodeKind, UnitType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NfaNodeKind {
    Split,
    Literal(char),
    Accepting,
}

struct Frag {
    start: NodeKey,
    /// Nodes with one outgoing edge slot still unpatched.
    out: Vec<NodeKey>,
}

fn patch(graph: &mut DirectedGraph<NfaNodeKind, ()>, out: &[NodeKey], target: NodeKey) {
    for &node in out {
        graph.add_edge(node, target, ());
    }
}

/// Thompson construction over a postfix token stream. Returns the NFA
/// graph and its start node; the unique `Accepting` node is always the
/// last node added.
pub(crate) fn build(postfix: &[char]) -> Result<(DirectedGraph<NfaNodeKind, ()>, NodeKey), RegexError> {
    let mut graph: DirectedGraph<NfaNodeKind, ()> = DirectedGraph::new();
    let mut stack: Vec<Frag> = Vec::new();
    let postfix_str: String = postfix.iter().collect();

    let malformed = || {
        RegexError::new(
            &postfix_str,
            "malformed postfix expression (internal invariant violated)",
        )
    };

    for &c in postfix {
        match c {
            '.' => {
                let e2 = stack.pop().ok_or_else(malformed)?;
                let e1 = stack.pop().ok_or_else(malformed)?;
                patch(&mut graph, &e1.out, e2.start);
                stack.push(Frag {
                    start: e1.start,
                    out: e2.out,
                });
            }
            '|' => {
                let e2 = stack.pop().ok_or_else(malformed)?;
                let e1 = stack.pop().ok_or_else(malformed)?;
                let s = graph.add_node(NfaNodeKind::Split);
                graph.add_edge(s, e1.start, ());
                graph.add_edge(s, e2.start, ());
                let mut out = e1.out;
                out.extend(e2.out);
                stack.push(Frag { start: s, out });
            }
            '?' => {
                let e = stack.pop().ok_or_else(malformed)?;
                let s = graph.add_node(NfaNodeKind::Split);
                graph.add_edge(s, e.start, ());
                let mut out = e.out;
                out.push(s);
                stack.push(Frag { start: s, out });
            }
            '*' => {
                let e = stack.pop().ok_or_else(malformed)?;
                let s = graph.add_node(NfaNodeKind::Split);
                graph.add_edge(s, e.start, ());
                patch(&mut graph, &e.out, s);
                stack.push(Frag {
                    start: s,
                    out: vec![s],
                });
            }
            '+' => {
                let e = stack.pop().ok_or_else(malformed)?;
                let s = graph.add_node(NfaNodeKind::Split);
                graph.add_edge(s, e.start, ());
                patch(&mut graph, &e.out, s);
                stack.push(Frag {
                    start: e.start,
                    out: vec![s],
                });
            }
            lit => {
                let n = graph.add_node(NfaNodeKind::Literal(lit));
                stack.push(Frag {
                    start: n,
                    out: vec![n],
                });
            }
        }
    }

    let e = stack.pop().ok_or_else(malformed)?;
    if !stack.is_empty() {
        return Err(malformed());
    }

    let accepting = graph.add_node(NfaNodeKind::Accepting);
    patch(&mut graph, &e.out, accepting);

    Ok((graph, e.start))
}

fn to_min_kind(kind: NfaNodeKind) -> MinNodeKind {
    match kind {
        NfaNodeKind::Literal('0') => MinNodeKind::Sentinel,
        NfaNodeKind::Literal('=') => MinNodeKind::Unit(UnitType::Long),
        NfaNodeKind::Literal('-') => MinNodeKind::Unit(UnitType::Short),
        NfaNodeKind::Literal('_') => MinNodeKind::Unit(UnitType::OptionalShort),
        NfaNodeKind::Accepting => MinNodeKind::Accepting,
        NfaNodeKind::Literal(other) => {
            unreachable!("unexpected literal '{}' in meter NFA", other)
        }
        NfaNodeKind::Split => unreachable!("split nodes are removed before this point"),
    }
}

/// Remove `Split` nodes from an NFA (spec.md §4.3 "NFA -> minimised
/// graph"): build a new graph of only non-`Split` nodes, then for every
/// non-`Split` source, walk split-only chains (in edge-insertion order,
/// never revisiting the same split within one source's walk) to find the
/// non-`Split` nodes it reaches, emitting one edge per unique pair.
pub(crate) fn minimize(
    nfa: &DirectedGraph<NfaNodeKind, ()>,
    start: NodeKey,
) -> (DirectedGraph<MinNodeKind, ()>, NodeKey) {
    let mut min_graph: DirectedGraph<MinNodeKind, ()> = DirectedGraph::new();
    let mut mapping: std::collections::HashMap<NodeKey, NodeKey> = std::collections::HashMap::new();

    for i in 0..nfa.len() {
        let old_key = NodeKey(i);
        let kind = *nfa.node(old_key);
        if matches!(kind, NfaNodeKind::Split) {
            continue;
        }
        let new_key = min_graph.add_node(to_min_kind(kind));
        mapping.insert(old_key, new_key);
    }

    for i in 0..nfa.len() {
        let old_key = NodeKey(i);
        if matches!(nfa.node(old_key), NfaNodeKind::Split) {
            continue;
        }
        let new_src = mapping[&old_key];
        let mut visited_splits: HashSet<NodeKey> = HashSet::new();
        let mut queue: VecDeque<NodeKey> =
            nfa.edges_from(old_key).iter().map(|(k, _)| *k).collect();

        while let Some(child) = queue.pop_front() {
            if matches!(nfa.node(child), NfaNodeKind::Split) {
                if visited_splits.insert(child) {
                    for (grandchild, _) in nfa.edges_from(child).iter().rev() {
                        queue.push_front(*grandchild);
                    }
                }
            } else {
                let new_dst = mapping[&child];
                if !min_graph.has_edge(new_src, new_dst) {
                    min_graph.add_edge(new_src, new_dst, ());
                }
            }
        }
    }

    (min_graph, mapping[&start])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::regex::to_postfix;

    fn minimized(regex: &str) -> (DirectedGraph<MinNodeKind, ()>, NodeKey) {
        let postfix = to_postfix(regex).unwrap();
        let (nfa, start) = build(&postfix).unwrap();
        minimize(&nfa, start)
    }

    #[test]
    fn six_node_chain_for_three_heavies_then_optional_light() {
        // "===(-)" prefixed with the sentinel, matching spec.md §8 scenario 4.
        let (graph, start) = minimized("0(===(-))");
        // 0 -> = -> = -> = -> - -> Accepting, six nodes, no Split nodes.
        assert_eq!(graph.len(), 6);
        assert!(matches!(graph.node(start), MinNodeKind::Sentinel));

        let mut cur = start;
        let expected = [
            MinNodeKind::Unit(UnitType::Long),
            MinNodeKind::Unit(UnitType::Long),
            MinNodeKind::Unit(UnitType::Long),
            MinNodeKind::Unit(UnitType::Short),
            MinNodeKind::Accepting,
        ];
        for kind in expected {
            let edges = graph.edges_from(cur);
            assert_eq!(edges.len(), 1);
            cur = edges[0].0;
            assert_eq!(*graph.node(cur), kind);
        }
    }

    #[test]
    fn star_produces_self_loop_on_unit_node() {
        let (graph, start) = minimized("0(=*)");
        // sentinel -> = , and = has edges back to itself and to Accepting.
        let first = graph.edges_from(start)[0].0;
        assert!(matches!(graph.node(first), MinNodeKind::Unit(UnitType::Long)));
        assert!(graph.has_edge(first, first));
        let has_accepting_edge = graph
            .edges_from(first)
            .iter()
            .any(|(k, _)| matches!(graph.node(*k), MinNodeKind::Accepting));
        assert!(has_accepting_edge);
    }
}
