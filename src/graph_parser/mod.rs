//! [`GraphParser`]: a longest-pattern/lowest-cost token rewriter driven by
//! context-sensitive rules (spec.md §4.2). Three instances make up THE CORE
//! (spec.md §1): transcription (text -> phonetic tokens), long-unit
//! (phonetic tokens -> `=...`), and short-unit (phonetic tokens -> `-...` /
//! `_...`).

mod onmatch;
mod rule;
mod tokenizer;
mod trie;

use std::collections::{HashMap, HashSet};

use regex::bytes::Regex;

use crate::config::{OnMatchRulesConfig, RulesConfig, TokensConfig, WhitespaceConfig};
use crate::error::{Error, ReferenceError, Result, SchemaError};
use crate::graph::DirectedGraph;
use crate::util::Log;

pub use onmatch::OnMatchRule;
pub use rule::ParserRule;
use trie::{TrieEdge, TrieNode};

/// A graph-based parser: converts an input string into an output string by
/// repeatedly finding the lowest-cost [`ParserRule`] matching at the
/// current position, honoring any surrounding context constraints.
pub struct GraphParser {
    tokens: HashMap<String, HashSet<String>>,
    token_classes: HashSet<String>,
    /// Sorted ascending by [`ParserRule::cost`] — most specific first.
    rules: Vec<ParserRule>,
    onmatch_rules: Vec<OnMatchRule>,
    onmatch_lookup: HashMap<(String, String), Vec<usize>>,
    whitespace: WhitespaceConfig,
    tokenizer_regex: Regex,
    trie: DirectedGraph<TrieNode, TrieEdge>,
    debug: Log<&'static str>,
}

impl GraphParser {
    /// Construct and validate a parser from its configuration (spec.md
    /// §4.2 "Construction"). Fails with [`Error::Schema`] or
    /// [`Error::Reference`] on any of the violations spec.md names.
    pub fn new(
        tokens: TokensConfig,
        rules: RulesConfig,
        onmatch_rules: OnMatchRulesConfig,
        whitespace: WhitespaceConfig,
    ) -> Result<Self> {
        Self::with_debug(tokens, rules, onmatch_rules, whitespace, Log::None)
    }

    /// As [`GraphParser::new`], but tracing construction steps through
    /// `debug` (only prints in debug builds — see [`crate::util::Log`]).
    pub fn with_debug(
        tokens: TokensConfig,
        rules: RulesConfig,
        onmatch_rules: OnMatchRulesConfig,
        whitespace: WhitespaceConfig,
        debug: Log<&'static str>,
    ) -> Result<Self> {
        let tokens_map: HashMap<String, HashSet<String>> = tokens
            .0
            .into_iter()
            .map(|(token, classes)| (token, classes.into_iter().collect()))
            .collect();
        let token_classes: HashSet<String> =
            tokens_map.values().flat_map(|c| c.iter().cloned()).collect();

        if !tokens_map.contains_key(&whitespace.default) {
            return Err(Error::from(SchemaError::new(format!(
                "whitespace default \"{}\" is not among the declared tokens",
                whitespace.default
            ))));
        }
        if !token_classes.contains(&whitespace.token_class) {
            return Err(Error::from(SchemaError::new(format!(
                "whitespace token_class \"{}\" is not a recognised class",
                whitespace.token_class
            ))));
        }

        let mut parsed_rules = Vec::with_capacity(rules.0.len());
        for (rule_str, production) in &rules.0 {
            let mut rule = rule::parse_rule_string(rule_str)?;
            rule.production = production.clone();
            validate_rule_references(&rule, &tokens_map, &token_classes)?;
            parsed_rules.push(rule);
        }
        parsed_rules.sort_by_key(|r| r.cost);
        debug.trace(format_args!(
            "built {} rules for graph parser",
            parsed_rules.len()
        ));

        let mut parsed_onmatch = Vec::with_capacity(onmatch_rules.0.len());
        for (onmatch_str, production) in &onmatch_rules.0 {
            let (prev_classes, next_classes) = onmatch::parse_onmatch_string(onmatch_str)?;
            for c in prev_classes.iter().chain(next_classes.iter()) {
                if !token_classes.contains(c) {
                    return Err(Error::from(ReferenceError::new(
                        c.clone(),
                        "onmatch rule references an undefined class",
                    )));
                }
            }
            parsed_onmatch.push(OnMatchRule {
                prev_classes,
                next_classes,
                production: production.clone(),
            });
        }
        let onmatch_lookup = onmatch::build_onmatch_lookup(&tokens_map, &parsed_onmatch);

        let token_list: Vec<String> = tokens_map.keys().cloned().collect();
        let tokenizer_regex = tokenizer::build_tokenizer_regex(&token_list);
        let trie = trie::build_trie(&parsed_rules);

        Ok(Self {
            tokens: tokens_map,
            token_classes,
            rules: parsed_rules,
            onmatch_rules: parsed_onmatch,
            onmatch_lookup,
            whitespace,
            tokenizer_regex,
            trie,
            debug,
        })
    }

    /// `token -> classes` map this parser was built with.
    pub fn tokens(&self) -> &HashMap<String, HashSet<String>> {
        &self.tokens
    }

    /// Rules, sorted ascending by cost (most specific first).
    pub fn rules(&self) -> &[ParserRule] {
        &self.rules
    }

    pub fn onmatch_rules(&self) -> &[OnMatchRule] {
        &self.onmatch_rules
    }

    pub fn whitespace(&self) -> &WhitespaceConfig {
        &self.whitespace
    }

    /// Non-empty productions this parser's rules can emit, e.g. the set a
    /// [`crate::scanner::Scanner`] checks the transcription parser's
    /// productions against the long parser's tokens (spec.md §4.5).
    pub fn productions(&self) -> HashSet<&str> {
        self.rules
            .iter()
            .map(|r| r.production.as_str())
            .filter(|p| !p.is_empty())
            .collect()
    }

    fn is_whitespace(&self, token: &str) -> bool {
        self.tokens
            .get(token)
            .map(|classes| classes.contains(&self.whitespace.token_class))
            .unwrap_or(false)
    }

    /// Tokenize `input` (spec.md §4.2 "Tokenisation"): leftmost,
    /// longest-first matching, whitespace sentinel on both ends,
    /// consolidated if configured.
    pub fn tokenize(&self, input: &str) -> Result<Vec<String>> {
        tokenizer::tokenize(input, &self.tokenizer_regex, &self.whitespace, |t| {
            self.is_whitespace(t)
        })
        .map_err(Error::from)
    }

    /// Best rule matching at `token_i` of an already-tokenized stream
    /// (spec.md §4.2 "Matching at a position").
    fn match_at(&self, tokens: &[String], token_i: usize) -> Result<usize> {
        trie::match_at(&self.trie, &self.rules, tokens, token_i, &self.tokens).map_err(Error::from)
    }

    /// Every rule matching at `token_i`, best first (spec.md §4.5: the
    /// scanner must branch on every production that fits, not only the
    /// single most specific one `parse` would choose). Indices into
    /// [`GraphParser::rules`]. Empty when nothing matches — that is not
    /// an error for the scanner, which simply abandons the branch.
    pub(crate) fn match_all_at(&self, tokens: &[String], token_i: usize) -> Vec<usize> {
        trie::match_all_at(&self.trie, &self.rules, tokens, token_i, &self.tokens)
    }

    /// Parse `input` into its output string (spec.md §4.2 "Parsing").
    pub fn parse(&self, input: &str) -> Result<String> {
        let tokens = self.tokenize(input)?;
        let mut output = String::new();
        let mut token_i = 1;
        while token_i < tokens.len() - 1 {
            let rule_key = self.match_at(&tokens, token_i)?;
            let rule = &self.rules[rule_key];

            if !self.onmatch_rules.is_empty() {
                let prev_t = &tokens[token_i - 1];
                let curr_t = &tokens[token_i];
                if let Some(candidates) = self
                    .onmatch_lookup
                    .get(&(curr_t.clone(), prev_t.clone()))
                {
                    for &idx in candidates {
                        let onmatch = &self.onmatch_rules[idx];
                        let prev_start = token_i.checked_sub(onmatch.prev_classes.len());
                        let prev_ok = trie::match_window(
                            &tokens,
                            prev_start,
                            &onmatch.prev_classes,
                            true,
                            &self.tokens,
                        );
                        let next_ok = trie::match_window(
                            &tokens,
                            Some(token_i),
                            &onmatch.next_classes,
                            true,
                            &self.tokens,
                        );
                        if prev_ok && next_ok {
                            output.push_str(&onmatch.production);
                            break;
                        }
                    }
                }
            }

            output.push_str(&rule.production);
            token_i += rule.tokens.len();
        }
        Ok(output)
    }

    /// As [`GraphParser::parse`], but returns each non-empty production
    /// emitted (on-match insertions included) paired with the original
    /// input tokens the matching rule consumed (spec.md §4.5 step 1:
    /// "preserving for each produced output token the original characters
    /// that produced it"). On-match insertions consume no input tokens of
    /// their own, so they pair with an empty list.
    ///
    /// A [`crate::scanner::Scanner`] aligns this sequence 1:1 against the
    /// long parser's content tokens, which holds because construction
    /// requires every non-empty production here to be one of those tokens.
    pub(crate) fn parse_with_spans(&self, input: &str) -> Result<Vec<(String, Vec<String>)>> {
        let tokens = self.tokenize(input)?;
        let mut spans = Vec::new();
        let mut token_i = 1;
        while token_i < tokens.len() - 1 {
            let rule_key = self.match_at(&tokens, token_i)?;
            let rule = &self.rules[rule_key];

            if !self.onmatch_rules.is_empty() {
                let prev_t = &tokens[token_i - 1];
                let curr_t = &tokens[token_i];
                if let Some(candidates) =
                    self.onmatch_lookup.get(&(curr_t.clone(), prev_t.clone()))
                {
                    for &idx in candidates {
                        let onmatch = &self.onmatch_rules[idx];
                        let prev_start = token_i.checked_sub(onmatch.prev_classes.len());
                        let prev_ok = trie::match_window(
                            &tokens,
                            prev_start,
                            &onmatch.prev_classes,
                            true,
                            &self.tokens,
                        );
                        let next_ok = trie::match_window(
                            &tokens,
                            Some(token_i),
                            &onmatch.next_classes,
                            true,
                            &self.tokens,
                        );
                        if prev_ok && next_ok {
                            if !onmatch.production.is_empty() {
                                spans.push((onmatch.production.clone(), Vec::new()));
                            }
                            break;
                        }
                    }
                }
            }

            if !rule.production.is_empty() {
                let consumed = tokens[token_i..token_i + rule.tokens.len()].to_vec();
                spans.push((rule.production.clone(), consumed));
            }
            token_i += rule.tokens.len();
        }
        Ok(spans)
    }

    /// A pruned copy of this parser keeping only rules whose production is
    /// not in `forbidden` (spec.md §4.4 "Constrained Parsers").
    pub(crate) fn pruned_of(&self, forbidden: &HashSet<String>) -> GraphParser {
        let rules: Vec<ParserRule> = self
            .rules
            .iter()
            .filter(|r| !forbidden.contains(&r.production))
            .cloned()
            .collect();
        let trie = trie::build_trie(&rules);
        GraphParser {
            tokens: self.tokens.clone(),
            token_classes: self.token_classes.clone(),
            rules,
            onmatch_rules: self.onmatch_rules.clone(),
            onmatch_lookup: self.onmatch_lookup.clone(),
            whitespace: self.whitespace.clone(),
            tokenizer_regex: self.tokenizer_regex.clone(),
            trie,
            debug: self.debug,
        }
    }
}

fn validate_rule_references(
    rule: &ParserRule,
    tokens_map: &HashMap<String, HashSet<String>>,
    token_classes: &HashSet<String>,
) -> Result<()> {
    for token in rule
        .prev_tokens
        .iter()
        .chain(rule.tokens.iter())
        .chain(rule.next_tokens.iter())
    {
        if !tokens_map.contains_key(token) {
            return Err(Error::from(ReferenceError::new(
                token.clone(),
                "rule references an undefined token",
            )));
        }
    }
    for class in rule.prev_classes.iter().chain(rule.next_classes.iter()) {
        if !token_classes.contains(class) {
            return Err(Error::from(ReferenceError::new(
                class.clone(),
                "rule references an undefined class",
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_parser() -> GraphParser {
        let tokens = TokensConfig(vec![
            ("a".into(), vec!["c1".into(), "token".into()]),
            ("b".into(), vec!["c2".into(), "token".into()]),
            ("u".into(), vec!["token".into()]),
            (" ".into(), vec!["wb".into()]),
        ]);
        let rules = RulesConfig(vec![
            ("a".into(), "A".into()),
            ("b".into(), "B".into()),
            ("<wb> u".into(), "U".into()),
        ]);
        let onmatch = OnMatchRulesConfig(vec![
            ("<c1> + <c2>".into(), ",".into()),
            ("<c1> + <token>".into(), "V".into()),
        ]);
        let whitespace = WhitespaceConfig {
            default: " ".into(),
            token_class: "wb".into(),
            consolidate: true,
        };
        GraphParser::new(tokens, rules, onmatch, whitespace).unwrap()
    }

    #[test]
    fn parses_plain_rules() {
        let gp = simple_parser();
        assert_eq!(gp.parse("ab").unwrap(), "A,B");
    }

    #[test]
    fn onmatch_rule_fires_between_matches() {
        let gp = simple_parser();
        assert_eq!(gp.parse("aba").unwrap(), "A,BVA");
    }

    #[test]
    fn whitespace_class_rule_matches_u() {
        let gp = simple_parser();
        assert_eq!(gp.parse("u").unwrap(), "U");
    }

    #[test]
    fn unknown_token_reference_is_reference_error() {
        let tokens = TokensConfig(vec![("a".into(), vec![]), (" ".into(), vec!["wb".into()])]);
        let rules = RulesConfig(vec![("b".into(), "B".into())]);
        let whitespace = WhitespaceConfig {
            default: " ".into(),
            token_class: "wb".into(),
            consolidate: true,
        };
        let err = GraphParser::new(tokens, rules, OnMatchRulesConfig::default(), whitespace)
            .unwrap_err();
        assert!(matches!(err, Error::Reference(_)));
    }

    #[test]
    fn empty_regex_whitespace_default_is_schema_error() {
        let tokens = TokensConfig(vec![("a".into(), vec!["wb".into()])]);
        let rules = RulesConfig(vec![("a".into(), "A".into())]);
        let whitespace = WhitespaceConfig {
            default: " ".into(),
            token_class: "wb".into(),
            consolidate: true,
        };
        let err = GraphParser::new(tokens, rules, OnMatchRulesConfig::default(), whitespace)
            .unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn repeated_parse_is_deterministic() {
        let gp = simple_parser();
        let first = gp.parse("aba").unwrap();
        let second = gp.parse("aba").unwrap();
        assert_eq!(first, second);
    }
}
