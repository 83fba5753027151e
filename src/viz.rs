//! Optional, debug-only pretty-printing of a translation graph
//! ([`crate::automaton`]), built on `ptree` the way the teacher's own
//! `ASTNode` renders parse trees. The translation graph can contain cycles
//! (from `*`/`+` meters); a view refuses to descend into a node already on
//! its current path, printing it as a leaf instead of looping forever.

use std::borrow::Cow;
use std::collections::HashSet;

use ptree::{Style, TreeItem};

use crate::automaton::TransNodeKind;
use crate::graph::{DirectedGraph, NodeKey};

/// A cycle-safe snapshot of one translation-graph node and its already
/// expanded children, suitable for [`ptree::print_tree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationGraphView {
    label: String,
    children: Vec<TranslationGraphView>,
}

impl TranslationGraphView {
    /// Snapshot `graph` depth-first from `root`.
    pub fn new(graph: &DirectedGraph<TransNodeKind, ()>, root: NodeKey) -> Self {
        let mut on_path = HashSet::new();
        Self::build(graph, root, &mut on_path)
    }

    fn build(
        graph: &DirectedGraph<TransNodeKind, ()>,
        node_key: NodeKey,
        on_path: &mut HashSet<NodeKey>,
    ) -> Self {
        let label = label_of(graph.node(node_key), node_key);
        if !on_path.insert(node_key) {
            return Self {
                label: format!("{} (back-edge)", label),
                children: Vec::new(),
            };
        }
        let children = graph
            .edges_from(node_key)
            .iter()
            .map(|&(child, _)| Self::build(graph, child, on_path))
            .collect();
        on_path.remove(&node_key);
        Self { label, children }
    }
}

fn label_of(kind: &TransNodeKind, key: NodeKey) -> String {
    match kind {
        TransNodeKind::Start => format!("Start#{}", key.index()),
        TransNodeKind::Unit(u) => format!("{}#{}", u.symbol(), key.index()),
        TransNodeKind::Accepting { meter_key } => {
            format!("Accepting#{} (meter {})", key.index(), meter_key)
        }
    }
}

impl TreeItem for TranslationGraphView {
    type Child = Self;

    fn write_self<W: std::io::Write>(&self, f: &mut W, _: &Style) -> std::io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> Cow<[Self::Child]> {
        Cow::from(&self.children)
    }
}

/// Print `graph` to stdout, rooted at its own `root()`.
pub fn print_translation_graph(graph: &DirectedGraph<TransNodeKind, ()>) -> std::io::Result<()> {
    ptree::print_tree(&TranslationGraphView::new(graph, graph.root()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::build_translation_graph;

    #[test]
    fn shared_prefix_collapses_to_one_child() {
        let patterns = vec!["==".to_string(), "==-".to_string()];
        let graph = build_translation_graph(&patterns).unwrap();
        let view = TranslationGraphView::new(&graph, graph.root());
        assert_eq!(view.children.len(), 1);
    }

    #[test]
    fn cycle_terminates_as_a_back_edge_leaf() {
        let patterns = vec!["=*-".to_string()];
        let graph = build_translation_graph(&patterns).unwrap();
        let view = TranslationGraphView::new(&graph, graph.root());
        let rendered = format!("{:?}", view);
        assert!(rendered.contains("back-edge"));
    }
}
