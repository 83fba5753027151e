//! End-to-end scans through [`meter_scan::Scanner`], wiring together a
//! transcription parser, long/short parsers, constraints, and a meter
//! list the way a host application would.

use std::collections::HashMap;

use meter_scan::config::{
    ConstraintsConfig, MeterConfig, OnMatchRulesConfig, RulesConfig, TokensConfig,
    WhitespaceConfig, CONSTRAINT_WILDCARD,
};
use meter_scan::error::Error;
use meter_scan::graph_parser::GraphParser;
use meter_scan::scanner::types::Matches;
use meter_scan::Scanner;

fn whitespace() -> WhitespaceConfig {
    WhitespaceConfig {
        default: " ".into(),
        token_class: "wb".into(),
        consolidate: true,
    }
}

/// `a` is a short syllable, `b` a long one; the transcription parser is
/// the identity, so the long/short parsers read the input's own
/// characters directly.
fn make_parsers() -> (GraphParser, GraphParser, GraphParser) {
    let tokens = TokensConfig(vec![
        ("a".into(), vec!["short".into()]),
        ("b".into(), vec!["long".into()]),
        (" ".into(), vec!["wb".into()]),
    ]);

    let transcription = GraphParser::new(
        tokens.clone(),
        RulesConfig(vec![
            ("a".into(), "a".into()),
            ("b".into(), "b".into()),
            (" ".into(), " ".into()),
        ]),
        OnMatchRulesConfig::default(),
        whitespace(),
    )
    .unwrap();

    let long = GraphParser::new(
        tokens.clone(),
        RulesConfig(vec![("b".into(), "l<b>".into())]),
        OnMatchRulesConfig::default(),
        whitespace(),
    )
    .unwrap();

    let short = GraphParser::new(
        tokens,
        RulesConfig(vec![("a".into(), "s<a>".into())]),
        OnMatchRulesConfig::default(),
        whitespace(),
    )
    .unwrap();

    (transcription, long, short)
}

fn meter(id: &str, regex_pattern: &str) -> MeterConfig {
    MeterConfig {
        id: id.to_string(),
        name: format!("meter-{}", id),
        regex_pattern: regex_pattern.to_string(),
        fp7pattern: None,
        notes: None,
        genre: None,
    }
}

#[test]
fn matches_a_registered_meter_and_reports_unit_matches() {
    let (transcription, long, short) = make_parsers();
    let scanner = Scanner::new(
        transcription,
        long,
        short,
        ConstraintsConfig::new(),
        vec![meter("heavy-heavy", "==")],
    )
    .unwrap();

    let results = scanner.scan("bb", false, false, false).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].scan, "==");
    assert_eq!(results[0].meter_key, 0);

    match &results[0].matches {
        Matches::Units(units) => {
            assert_eq!(units.len(), 2);
            assert!(units.iter().all(|u| u.rule_found == "l<b>"));
            assert!(units.iter().all(|u| u.orig_tokens == vec!["b".to_string()]));
        }
        Matches::Nodes(_) => panic!("graph_details was not requested"),
    }
}

#[test]
fn no_registered_meter_fits_returns_empty_not_error() {
    let (transcription, long, short) = make_parsers();
    let scanner = Scanner::new(
        transcription,
        long,
        short,
        ConstraintsConfig::new(),
        vec![meter("heavy-heavy", "==")],
    )
    .unwrap();

    // Three long units can never satisfy a two-unit meter: the
    // translation graph reaches its accepting node with input left over,
    // which is a discarded (not completed) branch, not an error.
    let results = scanner.scan("bbb", false, false, false).unwrap();
    assert!(results.is_empty());
}

/// spec.md §4.2 "Tokenisation": a call that would emit only the sentinel
/// whitespaces fails with a position-bearing error, for both the empty
/// string and a whitespace-only line.
#[test]
fn empty_and_whitespace_only_input_is_a_tokenisation_error() {
    let (transcription, long, short) = make_parsers();
    let scanner = Scanner::new(
        transcription,
        long,
        short,
        ConstraintsConfig::new(),
        vec![meter("heavy-heavy", "==")],
    )
    .unwrap();

    assert!(matches!(
        scanner.scan("", false, false, false),
        Err(Error::Tokenisation(_))
    ));
    assert!(matches!(
        scanner.scan(" ", false, false, false),
        Err(Error::Tokenisation(_))
    ));
}

#[test]
fn wildcard_constraint_key_is_accepted_at_construction() {
    let (transcription, long, short) = make_parsers();

    // (`_`, `=`) constraints always key on the wildcard previous
    // production; this one never applies in a two-long-unit meter (no
    // `_` node exists in its translation graph) but must still validate.
    let mut constraints = ConstraintsConfig::new();
    let mut next_types = HashMap::new();
    let mut prev_productions = HashMap::new();
    prev_productions.insert(CONSTRAINT_WILDCARD.to_string(), vec!["l<b>".to_string()]);
    next_types.insert("=".to_string(), prev_productions);
    constraints.insert("_".to_string(), next_types);

    let scanner = Scanner::new(
        transcription,
        long,
        short,
        constraints,
        vec![meter("heavy-heavy", "==")],
    )
    .unwrap();

    let results = scanner.scan("bb", false, false, false).unwrap();
    assert_eq!(results.len(), 1);
}

#[test]
fn show_feet_inserts_separators_when_a_foot_pattern_is_registered() {
    let (transcription, long, short) = make_parsers();
    let scanner = Scanner::new(
        transcription,
        long,
        short,
        ConstraintsConfig::new(),
        vec![MeterConfig {
            id: "heavy-heavy".into(),
            name: "heavy-heavy".into(),
            regex_pattern: "==".into(),
            fp7pattern: Some("=/=".into()),
            notes: None,
            genre: None,
        }],
    )
    .unwrap();

    let results = scanner.scan("bb", false, false, true).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].scan, "=/=");
}

/// spec.md §8 scenario 6: a line whose every syllable can be read as
/// either heavy or light is ambiguous between two meters until a
/// constraint rules one of them out.
fn ambiguous_parsers() -> (GraphParser, GraphParser, GraphParser) {
    let tokens = TokensConfig(vec![
        ("a".into(), vec!["any".into()]),
        (" ".into(), vec!["wb".into()]),
    ]);
    let transcription = GraphParser::new(
        tokens.clone(),
        RulesConfig(vec![("a".into(), "a".into()), (" ".into(), " ".into())]),
        OnMatchRulesConfig::default(),
        whitespace(),
    )
    .unwrap();
    let long = GraphParser::new(
        tokens.clone(),
        RulesConfig(vec![("a".into(), "l<a>".into())]),
        OnMatchRulesConfig::default(),
        whitespace(),
    )
    .unwrap();
    let short = GraphParser::new(
        tokens,
        RulesConfig(vec![("a".into(), "s<a>".into())]),
        OnMatchRulesConfig::default(),
        whitespace(),
    )
    .unwrap();
    (transcription, long, short)
}

#[test]
fn constraint_rules_out_a_candidate_meter() {
    // Without a constraint, "aa" is ambiguous between "==" (both `a`s
    // read long) and "--" (both read short).
    let (transcription, long, short) = ambiguous_parsers();
    let unconstrained = Scanner::new(
        transcription,
        long,
        short,
        ConstraintsConfig::new(),
        vec![meter("heavy-heavy", "=="), meter("light-light", "--")],
    )
    .unwrap();
    let mut scans: Vec<&str> = unconstrained
        .scan("aa", false, false, false)
        .unwrap()
        .iter()
        .map(|r| r.scan.as_str())
        .collect();
    scans.sort();
    assert_eq!(scans, vec!["--", "=="]);

    // Forbid a second `s<a>` right after a first one: "--" can never be
    // completed, leaving only "==".
    let mut constraints = ConstraintsConfig::new();
    let mut next_types = HashMap::new();
    let mut prev_productions = HashMap::new();
    prev_productions.insert("s<a>".to_string(), vec!["s<a>".to_string()]);
    next_types.insert("-".to_string(), prev_productions);
    constraints.insert("-".to_string(), next_types);

    let (transcription, long, short) = ambiguous_parsers();
    let constrained = Scanner::new(
        transcription,
        long,
        short,
        constraints,
        vec![meter("heavy-heavy", "=="), meter("light-light", "--")],
    )
    .unwrap();
    let results = constrained.scan("aa", false, false, false).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].scan, "==");
    assert_eq!(results[0].meter_key, 0);
}

#[test]
fn transcribe_exposes_the_raw_transcription_parser_output() {
    let (transcription, long, short) = make_parsers();
    let scanner = Scanner::new(
        transcription,
        long,
        short,
        ConstraintsConfig::new(),
        vec![meter("heavy-heavy", "==")],
    )
    .unwrap();

    assert_eq!(scanner.transcribe("bb").unwrap(), "bb");
}

#[test]
fn meters_list_is_exposed_in_registration_order() {
    let (transcription, long, short) = make_parsers();
    let scanner = Scanner::new(
        transcription,
        long,
        short,
        ConstraintsConfig::new(),
        vec![meter("first", "=="), meter("second", "--")],
    )
    .unwrap();

    let ids: Vec<&str> = scanner.meters_list().iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["first", "second"]);
}
