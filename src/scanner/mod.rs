//! [`Scanner`]: drives the merged translation graph in best-first order,
//! invoking the long/short (or constrained) parser at each metrical-unit
//! node until an accepting node is reached with input exhausted (spec.md
//! §4.5). THE CORE's third and outermost subsystem.

pub(crate) mod constrained;
pub mod feet;
pub mod filter;
pub mod types;

use std::collections::{HashSet, VecDeque};

use crate::automaton::{self, TransNodeKind, UnitType};
use crate::config::{ConstraintsConfig, MeterConfig, CONSTRAINT_WILDCARD};
use crate::error::{Error, Result, SchemaError};
use crate::graph::{DirectedGraph, NodeKey};
use crate::graph_parser::GraphParser;
use crate::util::Log;

use constrained::ConstrainedParsers;
use feet::FootPattern;
use types::{Matches, NodeMatch, ScanResult, UnitMatch};

#[derive(Clone)]
enum MatchEntry {
    Unit(UnitMatch),
    Node(NodeMatch),
}

impl MatchEntry {
    fn rule_found(&self) -> &str {
        match self {
            MatchEntry::Unit(u) => &u.rule_found,
            MatchEntry::Node(n) => &n.rule_found,
        }
    }
}

struct ScanIteration {
    node_key: NodeKey,
    parent_key: NodeKey,
    token_i: usize,
    matches: Vec<MatchEntry>,
    scan: String,
}

/// Drives a scan of transliterated verse against a registered list of
/// meters (spec.md §1 "Scanner"). Built once from three [`GraphParser`]s,
/// a constraints map, and a meters list; thereafter read-only.
pub struct Scanner {
    transcription_parser: GraphParser,
    long_parser: GraphParser,
    short_parser: GraphParser,
    meters_list: Vec<MeterConfig>,
    translation_graph: DirectedGraph<TransNodeKind, ()>,
    constrained_parsers: ConstrainedParsers,
    foot_patterns: FootPattern,
    use_post_scan_filter: bool,
    debug: Log<&'static str>,
}

impl Scanner {
    /// Construct a scanner with the default post-scan filter enabled
    /// ([`filter::default_post_scan_filter`]).
    pub fn new(
        transcription_parser: GraphParser,
        long_parser: GraphParser,
        short_parser: GraphParser,
        constraints: ConstraintsConfig,
        meters_list: Vec<MeterConfig>,
    ) -> Result<Self> {
        Self::with_options(
            transcription_parser,
            long_parser,
            short_parser,
            constraints,
            meters_list,
            true,
        )
    }

    /// As [`Scanner::new`], but lets a caller disable the default
    /// post-scan filter (e.g. to inspect every candidate scan per meter).
    pub fn with_options(
        transcription_parser: GraphParser,
        long_parser: GraphParser,
        short_parser: GraphParser,
        constraints: ConstraintsConfig,
        meters_list: Vec<MeterConfig>,
        use_post_scan_filter: bool,
    ) -> Result<Self> {
        Self::with_debug(
            transcription_parser,
            long_parser,
            short_parser,
            constraints,
            meters_list,
            use_post_scan_filter,
            Log::None,
        )
    }

    /// As [`Scanner::with_options`], but traces construction steps through
    /// `debug` (only prints in debug builds — see [`crate::util::Log`]).
    pub fn with_debug(
        transcription_parser: GraphParser,
        long_parser: GraphParser,
        short_parser: GraphParser,
        constraints: ConstraintsConfig,
        meters_list: Vec<MeterConfig>,
        use_post_scan_filter: bool,
        debug: Log<&'static str>,
    ) -> Result<Self> {
        let long_tokens: HashSet<&str> = long_parser.tokens().keys().map(String::as_str).collect();
        let short_tokens: HashSet<&str> =
            short_parser.tokens().keys().map(String::as_str).collect();
        if long_tokens != short_tokens {
            return Err(Error::from(SchemaError::new(
                "long and short parsers do not share a token alphabet",
            )));
        }

        let transcription_productions = transcription_parser.productions();
        if transcription_productions != long_tokens {
            return Err(Error::from(SchemaError::new(
                "transcription parser's non-empty productions are not exactly the long parser's tokens",
            )));
        }

        for meter in &meters_list {
            if meter.regex_pattern.is_empty() {
                return Err(Error::from(SchemaError::new(format!(
                    "meter \"{}\" has no regex_pattern",
                    meter.id
                ))));
            }
        }

        let long_productions = long_parser.productions();
        let short_productions = short_parser.productions();
        let constrained_parsers = constrained::build_constrained_parsers(
            &constraints,
            &long_parser,
            &short_parser,
            &long_productions,
            &short_productions,
        )?;
        debug.trace(format_args!(
            "built {} constrained parser(s)",
            constrained_parsers.len()
        ));

        let patterns: Vec<String> = meters_list.iter().map(|m| m.regex_pattern.clone()).collect();
        let translation_graph =
            automaton::build_translation_graph_with_debug(&patterns, debug)?;
        let foot_patterns = FootPattern::from_meters(&meters_list);
        debug.trace(format_args!(
            "built scanner for {} registered meter(s)",
            meters_list.len()
        ));

        Ok(Self {
            transcription_parser,
            long_parser,
            short_parser,
            meters_list,
            translation_graph,
            constrained_parsers,
            foot_patterns,
            use_post_scan_filter,
            debug,
        })
    }

    /// Transcribe `input` into phonetic tokens (spec.md §6 "Public
    /// operations").
    pub fn transcribe(&self, input: &str) -> Result<String> {
        self.transcription_parser.parse(input)
    }

    pub fn meters_list(&self) -> &[MeterConfig] {
        &self.meters_list
    }

    pub fn translation_graph(&self) -> &DirectedGraph<TransNodeKind, ()> {
        &self.translation_graph
    }

    /// Find every meter `input` could realise (spec.md §4.5 "Scanning
    /// algorithm"). An empty result means no meter matched; that is not
    /// an error.
    pub fn scan(
        &self,
        input: &str,
        first_only: bool,
        graph_details: bool,
        show_feet: bool,
    ) -> Result<Vec<ScanResult>> {
        let spans = self.transcription_parser.parse_with_spans(input)?;
        let parse_str: String = spans.iter().map(|(p, _)| p.as_str()).collect();
        let tokens = self.long_parser.tokenize(&parse_str)?;

        let mut transcription_tokens: Vec<Vec<String>> = Vec::with_capacity(spans.len() + 2);
        transcription_tokens.push(Vec::new());
        transcription_tokens.extend(spans.into_iter().map(|(_, orig)| orig));
        transcription_tokens.push(Vec::new());

        let orig_tokens_for = |token_i: usize, len: usize| -> Vec<String> {
            (token_i..token_i + len)
                .flat_map(|i| transcription_tokens.get(i).cloned().unwrap_or_default())
                .collect()
        };

        // Token index 0 is always the leading whitespace sentinel (see
        // `GraphParser::tokenize`); matching starts at the first content
        // token, same convention `GraphParser::parse` uses.
        let root = self.translation_graph.root();
        let mut stack: VecDeque<ScanIteration> = VecDeque::new();
        for &(child_key, _) in self.translation_graph.edges_from(root) {
            stack.push_front(ScanIteration {
                node_key: child_key,
                parent_key: root,
                token_i: 1,
                matches: Vec::new(),
                scan: String::new(),
            });
        }

        let mut completed: Vec<ScanResult> = Vec::new();
        'walk: while let Some(iteration) = stack.pop_front() {
            let node_kind = *self.translation_graph.node(iteration.node_key);

            if let TransNodeKind::Accepting { meter_key } = node_kind {
                if iteration.token_i == tokens.len() - 1 {
                    let mut scan_str = iteration.scan.clone();
                    if show_feet {
                        scan_str = self
                            .foot_patterns
                            .find_feet(&scan_str)
                            .map(str::to_string)
                            .unwrap_or(scan_str);
                    }
                    let matches = to_matches(iteration.matches, graph_details);
                    completed.push(ScanResult {
                        scan: scan_str,
                        matches,
                        meter_key,
                    });
                    if first_only {
                        break 'walk;
                    }
                }
                continue;
            }

            let unit_type = match node_kind {
                TransNodeKind::Unit(u) => u,
                _ => continue,
            };

            let parser = self.select_parser(iteration.parent_key, unit_type, &iteration.matches);
            let rules_matched = parser.match_all_at(&tokens, iteration.token_i);
            if rules_matched.is_empty() {
                continue;
            }

            let children = self.translation_graph.edges_from(iteration.node_key);
            for &rule_key in rules_matched.iter().rev() {
                let rule = &parser.rules()[rule_key];
                for &(child_key, _) in children {
                    let orig_tokens = orig_tokens_for(iteration.token_i, rule.tokens.len());

                    let match_entry = if graph_details {
                        MatchEntry::Node(NodeMatch {
                            unit_type,
                            matched_tokens: rule.tokens.clone(),
                            node_key: iteration.node_key,
                            parent_key: iteration.parent_key,
                            orig_tokens,
                            rule_found: rule.production.clone(),
                            token_i: iteration.token_i,
                        })
                    } else {
                        MatchEntry::Unit(UnitMatch {
                            unit_type,
                            rule_found: rule.production.clone(),
                            orig_tokens,
                        })
                    };

                    let mut matches = iteration.matches.clone();
                    matches.push(match_entry);
                    let mut scan = iteration.scan.clone();
                    scan.push(unit_type.symbol());

                    stack.push_front(ScanIteration {
                        node_key: child_key,
                        parent_key: iteration.node_key,
                        token_i: iteration.token_i + rule.tokens.len(),
                        matches,
                        scan,
                    });
                }
            }
        }

        if !completed.is_empty() && self.use_post_scan_filter {
            completed = filter::default_post_scan_filter(completed);
        }
        Ok(completed)
    }

    /// The constrained parser that applies at this step, if any, else the
    /// parser `node_type` naturally selects (spec.md §4.5: "If `matches`
    /// is empty ... no constrained parser applies").
    fn select_parser(
        &self,
        parent_key: NodeKey,
        node_type: UnitType,
        matches: &[MatchEntry],
    ) -> &GraphParser {
        let natural = match node_type {
            UnitType::Long => &self.long_parser,
            UnitType::Short | UnitType::OptionalShort => &self.short_parser,
        };

        let Some(last) = matches.last() else {
            return natural;
        };
        let parent_char = match self.translation_graph.node(parent_key) {
            TransNodeKind::Unit(u) => u.symbol(),
            TransNodeKind::Start | TransNodeKind::Accepting { .. } => return natural,
        };
        let node_char = node_type.symbol();

        let key = if parent_char == '_' && node_char == '=' {
            (parent_char, node_char, CONSTRAINT_WILDCARD.to_string())
        } else {
            (parent_char, node_char, last.rule_found().to_string())
        };

        self.constrained_parsers.get(&key).unwrap_or(natural)
    }
}

fn to_matches(entries: Vec<MatchEntry>, graph_details: bool) -> Matches {
    if graph_details {
        Matches::Nodes(
            entries
                .into_iter()
                .map(|e| match e {
                    MatchEntry::Node(n) => n,
                    MatchEntry::Unit(_) => unreachable!("graph_details was requested throughout"),
                })
                .collect(),
        )
    } else {
        Matches::Units(
            entries
                .into_iter()
                .map(|e| match e {
                    MatchEntry::Unit(u) => u,
                    MatchEntry::Node(_) => unreachable!("graph_details was not requested"),
                })
                .collect(),
        )
    }
}
