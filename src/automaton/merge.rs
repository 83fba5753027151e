//! Folding each meter's minimised graph into one shared translation graph
//! (spec.md §4.3 "Merging into translation graph"): common prefixes are
//! shared, cyclical subexpressions stay meter-local, and every meter
//! contributes exactly one `Accepting` node.

use std::collections::{HashMap, VecDeque};

use crate::graph::{DirectedGraph, NodeKey};

use super::{MinNodeKind, TransNodeKind};

fn levels_of(graph: &DirectedGraph<MinNodeKind, ()>, root: NodeKey) -> HashMap<NodeKey, usize> {
    let mut level = HashMap::new();
    level.insert(root, 0);
    let mut queue = VecDeque::new();
    queue.push_back(root);
    while let Some(node) = queue.pop_front() {
        let lvl = level[&node];
        for (child, _) in graph.edges_from(node) {
            if !level.contains_key(child) {
                level.insert(*child, lvl + 1);
                queue.push_back(*child);
            }
        }
    }
    level
}

fn parents_of_min(graph: &DirectedGraph<MinNodeKind, ()>, node: NodeKey) -> Vec<NodeKey> {
    graph
        .all_edges()
        .iter()
        .filter(|(_, dst)| *dst == node)
        .map(|(src, _)| *src)
        .collect()
}

fn parents_of_trans(graph: &DirectedGraph<TransNodeKind, ()>, node: NodeKey) -> Vec<NodeKey> {
    graph
        .all_edges()
        .iter()
        .filter(|(_, dst)| *dst == node)
        .map(|(src, _)| *src)
        .collect()
}

/// A node "contains a cycle" iff it has an incoming edge from a node at
/// the same or greater BFS level (spec.md §4.3 step 2).
fn contains_cycle(
    parents: Vec<NodeKey>,
    node: NodeKey,
    level: &HashMap<NodeKey, usize>,
) -> bool {
    let node_level = level.get(&node).copied().unwrap_or(0);
    parents
        .into_iter()
        .any(|p| level.get(&p).copied().unwrap_or(0) >= node_level)
}

fn unit_kind_matches(trans: &TransNodeKind, min: &MinNodeKind) -> bool {
    matches!(
        (trans, min),
        (TransNodeKind::Unit(a), MinNodeKind::Unit(b)) if a == b
    )
}

/// Find a non-cyclic child of `parent` in the merged graph whose type
/// matches `min_kind` (`=`, `-`, or `_` only — accepting nodes are never
/// shared this way, per spec.md §4.3 step 3).
fn child_of_type_noncyclic(
    graph: &DirectedGraph<TransNodeKind, ()>,
    parent: NodeKey,
    min_kind: &MinNodeKind,
) -> Option<NodeKey> {
    if matches!(min_kind, MinNodeKind::Accepting) {
        return None;
    }
    let level = levels_of_trans(graph);
    for &(child, _) in graph.edges_from(parent) {
        if unit_kind_matches(graph.node(child), min_kind) {
            let parents = parents_of_trans(graph, child);
            if !contains_cycle(parents, child, &level) {
                return Some(child);
            }
        }
    }
    None
}

fn levels_of_trans(graph: &DirectedGraph<TransNodeKind, ()>) -> HashMap<NodeKey, usize> {
    let root = graph.root();
    let mut level = HashMap::new();
    level.insert(root, 0);
    let mut queue = VecDeque::new();
    queue.push_back(root);
    while let Some(node) = queue.pop_front() {
        let lvl = level[&node];
        for (child, _) in graph.edges_from(node) {
            if !level.contains_key(child) {
                level.insert(*child, lvl + 1);
                queue.push_back(*child);
            }
        }
    }
    level
}

/// Fold `per_meter` (rooted at `per_meter_root`, a minimised meter graph)
/// into `graph`, whose root is the single shared `Start` node.
pub(crate) fn merge_meter_into(
    graph: &mut DirectedGraph<TransNodeKind, ()>,
    per_meter: &DirectedGraph<MinNodeKind, ()>,
    per_meter_root: NodeKey,
    meter_key: usize,
) {
    let level = levels_of(per_meter, per_meter_root);
    let mut node_mappings: HashMap<NodeKey, NodeKey> = HashMap::new();
    node_mappings.insert(per_meter_root, graph.root());

    let mut accepting_node_key: Option<NodeKey> = None;
    let mut queue: VecDeque<(NodeKey, NodeKey)> = VecDeque::new();
    queue.push_back((per_meter_root, graph.root()));

    while let Some((src_node, dst_node)) = queue.pop_front() {
        let children: Vec<NodeKey> = per_meter
            .edges_from(src_node)
            .iter()
            .map(|(k, _)| *k)
            .collect();

        for child_key in children {
            let child_kind = *per_meter.node(child_key);
            let child_is_cyclic = contains_cycle(parents_of_min(per_meter, child_key), child_key, &level);

            let mut matching_child_key: Option<NodeKey> = None;
            if child_is_cyclic {
                if let Some(&equivalent) = node_mappings.get(&child_key) {
                    if !graph.has_edge(dst_node, equivalent) {
                        graph.add_edge(dst_node, equivalent, ());
                    }
                    continue;
                }
            } else {
                matching_child_key = node_mappings.get(&child_key).copied();
                if matching_child_key.is_none() {
                    matching_child_key = child_of_type_noncyclic(graph, dst_node, &child_kind);
                }
            }

            let final_child_key = match matching_child_key {
                Some(key) => key,
                None => {
                    if matches!(child_kind, MinNodeKind::Accepting) && accepting_node_key.is_some() {
                        accepting_node_key.unwrap()
                    } else {
                        let new_kind = match child_kind {
                            MinNodeKind::Sentinel => TransNodeKind::Start,
                            MinNodeKind::Unit(u) => TransNodeKind::Unit(u),
                            MinNodeKind::Accepting => TransNodeKind::Accepting { meter_key },
                        };
                        let key = graph.add_node(new_kind);
                        if matches!(child_kind, MinNodeKind::Accepting) {
                            accepting_node_key = Some(key);
                        }
                        node_mappings.insert(child_key, key);
                        key
                    }
                }
            };

            if !graph.has_edge(dst_node, final_child_key) {
                graph.add_edge(dst_node, final_child_key, ());
            }
            queue.push_back((child_key, final_child_key));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::build_meter_graph;

    #[test]
    fn two_meters_share_a_common_prefix() {
        let mut graph: DirectedGraph<TransNodeKind, ()> = DirectedGraph::new();
        graph.add_node(TransNodeKind::Start);

        let (g1, r1) = build_meter_graph("==").unwrap();
        merge_meter_into(&mut graph, &g1, r1, 0);
        let (g2, r2) = build_meter_graph("==-").unwrap();
        merge_meter_into(&mut graph, &g2, r2, 1);

        // Both meters start "==", so the root's only child should be shared.
        let root_children = graph.edges_from(graph.root());
        assert_eq!(root_children.len(), 1);

        let mut accepting_keys = std::collections::HashSet::new();
        for i in 0..graph.len() {
            let key = NodeKey(i);
            if let TransNodeKind::Accepting { meter_key } = graph.node(key) {
                accepting_keys.insert(*meter_key);
            }
        }
        assert_eq!(accepting_keys, [0, 1].into_iter().collect());
    }

    #[test]
    fn cyclic_meter_keeps_a_self_loop() {
        let mut graph: DirectedGraph<TransNodeKind, ()> = DirectedGraph::new();
        graph.add_node(TransNodeKind::Start);
        let (g, r) = build_meter_graph("=*-").unwrap();
        merge_meter_into(&mut graph, &g, r, 0);

        let has_self_loop = (0..graph.len()).any(|i| {
            let key = NodeKey(i);
            graph.has_edge(key, key)
        });
        assert!(has_self_loop);
    }
}
