//! The parser graph: a rooted trie over rule tokens, with rule leaves as
//! accepting nodes (spec.md §3 "Parser graph", §4.2 "Building the parser
//! graph" / "Matching at a position").

use std::collections::HashMap;

use crate::error::ParseError;
use crate::graph::{DirectedGraph, NodeKey};

use super::rule::ParserRule;

#[derive(Debug, Clone)]
pub(crate) enum TrieNodeKind {
    Root,
    Token,
    /// Leaf, accepting. Carries the index into the parser's cost-sorted
    /// rule list.
    Rule(usize),
}

#[derive(Debug, Clone)]
pub(crate) struct TrieNode {
    pub kind: TrieNodeKind,
    /// `token -> child node` seen while building, used only during
    /// construction to dedupe same-token edges from one parent.
    token_children: HashMap<String, NodeKey>,
    rule_children: Vec<NodeKey>,
    /// Finalized lookup used by [`match_at`]: concrete token -> ordered
    /// (lowest cost first) candidate children, plus the `__rules__`
    /// fallback used when no token-specific entry exists.
    pub ordered_children: HashMap<String, Vec<NodeKey>>,
    pub rules_fallback: Vec<NodeKey>,
}

impl TrieNode {
    fn new(kind: TrieNodeKind) -> Self {
        Self {
            kind,
            token_children: HashMap::new(),
            rule_children: Vec::new(),
            ordered_children: HashMap::new(),
            rules_fallback: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum TrieEdgeKind {
    Token(String),
    Rule,
}

#[derive(Debug, Clone)]
pub(crate) struct TrieEdge {
    pub kind: TrieEdgeKind,
    pub cost: i32,
}

/// Build the parser graph from a rule list already sorted by cost. Rule
/// leaves are keyed by their index in `rules`.
pub(crate) fn build_trie(rules: &[ParserRule]) -> DirectedGraph<TrieNode, TrieEdge> {
    let mut graph = DirectedGraph::new();
    graph.add_node(TrieNode::new(TrieNodeKind::Root));

    for (rule_key, rule) in rules.iter().enumerate() {
        let mut parent = graph.root();
        for token in &rule.tokens {
            let existing = graph.node(parent).token_children.get(token).copied();
            let child = match existing {
                Some(child) => child,
                None => {
                    let child = graph.add_node(TrieNode::new(TrieNodeKind::Token));
                    graph.add_edge(
                        parent,
                        child,
                        TrieEdge {
                            kind: TrieEdgeKind::Token(token.clone()),
                            cost: rule.cost,
                        },
                    );
                    graph.node_mut(parent).token_children.insert(token.clone(), child);
                    child
                }
            };
            if let Some(edge) = graph.edge_mut(parent, child) {
                if rule.cost < edge.cost {
                    edge.cost = rule.cost;
                }
            }
            parent = child;
        }

        let rule_node = graph.add_node(TrieNode::new(TrieNodeKind::Rule(rule_key)));
        graph.add_edge(
            parent,
            rule_node,
            TrieEdge {
                kind: TrieEdgeKind::Rule,
                cost: rule.cost,
            },
        );
        graph.node_mut(parent).rule_children.push(rule_node);
    }

    finalize_ordered_children(&mut graph);
    graph
}

fn finalize_ordered_children(graph: &mut DirectedGraph<TrieNode, TrieEdge>) {
    let node_keys: Vec<NodeKey> = (0..graph.len()).map(NodeKey).collect();
    for node_key in node_keys {
        let mut rule_children = graph.node(node_key).rule_children.clone();
        rule_children.sort_by_key(|&child| graph.edge(node_key, child).unwrap().cost);

        let token_children: Vec<(String, NodeKey)> = graph
            .node(node_key)
            .token_children
            .iter()
            .map(|(t, &k)| (t.clone(), k))
            .collect();

        let mut ordered_children: HashMap<String, Vec<NodeKey>> = HashMap::new();
        for (token, child) in token_children {
            let mut entries = vec![child];
            entries.extend(rule_children.iter().copied());
            entries.sort_by_key(|&k| graph.edge(node_key, k).unwrap().cost);
            ordered_children.insert(token, entries);
        }

        let node = graph.node_mut(node_key);
        node.ordered_children = ordered_children;
        node.rules_fallback = rule_children;
    }
}

/// Context-window starts (spec.md §4.2 table), relative to `token_i` (the
/// token index immediately after a rule's central tokens have been
/// consumed). `None` means the window falls before token 0.
fn checked_sub(token_i: usize, amount: usize) -> Option<usize> {
    token_i.checked_sub(amount)
}

fn prev_tokens_start(token_i: usize, prev_tokens_len: usize) -> Option<usize> {
    checked_sub(token_i, 1 + prev_tokens_len)
}

fn prev_classes_start(token_i: usize, prev_tokens_len: usize, prev_classes_len: usize) -> Option<usize> {
    checked_sub(token_i, 1 + prev_tokens_len + prev_classes_len)
}

fn next_tokens_start(token_i: usize) -> Option<usize> {
    Some(token_i)
}

fn next_classes_start(token_i: usize, next_tokens_len: usize) -> Option<usize> {
    Some(token_i + next_tokens_len)
}

/// Check whether `tokens[start..start+values.len()]` equals `values`
/// (`by_class == false`) or each position's token class-set contains the
/// corresponding entry of `values` (`by_class == true`). Out-of-bounds
/// windows fail.
pub(crate) fn match_window(
    tokens: &[String],
    start: Option<usize>,
    values: &[String],
    by_class: bool,
    classes_of: &HashMap<String, std::collections::HashSet<String>>,
) -> bool {
    if values.is_empty() {
        return true;
    }
    let Some(start) = start else { return false };
    if start + values.len() > tokens.len() {
        return false;
    }
    for (offset, expected) in values.iter().enumerate() {
        let tok = &tokens[start + offset];
        if by_class {
            if !classes_of
                .get(tok)
                .map(|classes| classes.contains(expected))
                .unwrap_or(false)
            {
                return false;
            }
        } else if tok != expected {
            return false;
        }
    }
    true
}

/// Whether `rule`'s context constraints are satisfied with the central
/// tokens having just been consumed up to `token_i`.
pub(crate) fn rule_constraints_match(
    rule: &ParserRule,
    token_i: usize,
    tokens: &[String],
    classes_of: &HashMap<String, std::collections::HashSet<String>>,
) -> bool {
    let p_tok_start = prev_tokens_start(token_i, rule.prev_tokens.len());
    if !match_window(tokens, p_tok_start, &rule.prev_tokens, false, classes_of) {
        return false;
    }

    let p_cls_start = prev_classes_start(token_i, rule.prev_tokens.len(), rule.prev_classes.len());
    if !match_window(tokens, p_cls_start, &rule.prev_classes, true, classes_of) {
        return false;
    }

    let n_tok_start = next_tokens_start(token_i);
    if !match_window(tokens, n_tok_start, &rule.next_tokens, false, classes_of) {
        return false;
    }

    let n_cls_start = next_classes_start(token_i, rule.next_tokens.len());
    match_window(tokens, n_cls_start, &rule.next_classes, true, classes_of)
}

/// Depth-first, cost-ordered search for the best matching rule at
/// `start_token_i` (spec.md §4.2). Returns the matching rule's index into
/// the parser's cost-sorted rule list.
pub(crate) fn match_at(
    graph: &DirectedGraph<TrieNode, TrieEdge>,
    rules: &[ParserRule],
    tokens: &[String],
    start_token_i: usize,
    classes_of: &HashMap<String, std::collections::HashSet<String>>,
) -> Result<usize, ParseError> {
    let mut stack: Vec<(NodeKey, usize)> = vec![(graph.root(), start_token_i)];

    while let Some((node_key, token_i)) = stack.pop() {
        let node = graph.node(node_key);
        debug_assert!(!matches!(node.kind, TrieNodeKind::Rule(_)));

        let target_token = tokens.get(token_i);
        let candidates = target_token
            .and_then(|t| node.ordered_children.get(t))
            .unwrap_or(&node.rules_fallback);

        let mut pushed = None;
        for &dest_key in candidates {
            let dest = graph.node(dest_key);
            match &dest.kind {
                TrieNodeKind::Rule(rule_key) => {
                    let rule = &rules[*rule_key];
                    if rule_constraints_match(rule, token_i, tokens, classes_of) {
                        return Ok(*rule_key);
                    }
                }
                TrieNodeKind::Token => {
                    pushed = Some((dest_key, token_i + 1));
                }
                TrieNodeKind::Root => unreachable!("root is never a child"),
            }
        }
        if let Some(next) = pushed {
            stack.push(next);
        }
    }

    Err(ParseError::new(
        start_token_i,
        format!(
            "no rule matched at token {} ({:?})",
            start_token_i,
            tokens.get(start_token_i)
        ),
    ))
}

/// Collect every rule matching at `start_token_i`, best (lowest cost)
/// first — used by the scanner (spec.md §4.5), which must branch on all
/// productions that fit, not merely the single most specific one `parse`
/// uses. Walks the same cost-ordered `ordered_children` lists as
/// [`match_at`], but instead of stopping at the first satisfied leaf,
/// continues past it (and down matching token edges) to gather every
/// other leaf reachable while following the actual input tokens.
pub(crate) fn match_all_at(
    graph: &DirectedGraph<TrieNode, TrieEdge>,
    rules: &[ParserRule],
    tokens: &[String],
    start_token_i: usize,
    classes_of: &HashMap<String, std::collections::HashSet<String>>,
) -> Vec<usize> {
    let mut out = Vec::new();
    collect_all(graph, rules, tokens, graph.root(), start_token_i, classes_of, &mut out);
    out
}

fn collect_all(
    graph: &DirectedGraph<TrieNode, TrieEdge>,
    rules: &[ParserRule],
    tokens: &[String],
    node_key: NodeKey,
    token_i: usize,
    classes_of: &HashMap<String, std::collections::HashSet<String>>,
    out: &mut Vec<usize>,
) {
    let node = graph.node(node_key);
    let target_token = tokens.get(token_i);
    let candidates = target_token
        .and_then(|t| node.ordered_children.get(t))
        .unwrap_or(&node.rules_fallback);

    for &dest_key in candidates {
        let dest = graph.node(dest_key);
        match &dest.kind {
            TrieNodeKind::Rule(rule_key) => {
                let rule = &rules[*rule_key];
                if rule_constraints_match(rule, token_i, tokens, classes_of) {
                    out.push(*rule_key);
                }
            }
            TrieNodeKind::Token => {
                collect_all(graph, rules, tokens, dest_key, token_i + 1, classes_of, out);
            }
            TrieNodeKind::Root => unreachable!("root is never a child"),
        }
    }
}
