//! A scanner for transliterated Urdu/Hindi verse meter.
//!
//! Given a line of transliterated text, the scanner reports every
//! registered meter the line could realise. A meter is a regular
//! expression over three metrical-unit symbols: `=` (heavy/long
//! syllable), `-` (light/short syllable), and `_` (an optional,
//! uncounted short preceding a word boundary). A *scan* is a
//! decomposition of the line into a sequence of those symbols that
//! matches some meter's regex end-to-end.
//!
//! # Overview
//!
//! Three subsystems work together:
//!
//! 1. [`graph_parser::GraphParser`] — a longest-pattern / lowest-cost
//!    token rewriter driven by context-sensitive rules. Three instances
//!    are used: a transcription parser (input text → phonetic tokens),
//!    a long-unit parser (phonetic tokens → `=…` productions), and a
//!    short-unit parser (phonetic tokens → `-…` / `_…` productions).
//! 2. [`automaton`] — converts each meter's regex into a minimised
//!    directed graph (via Thompson-NFA construction), then merges all
//!    meters' graphs into one translation graph sharing prefixes and a
//!    single accepting node per meter.
//! 3. [`scanner::Scanner`] — walks the translation graph in best-first
//!    order; at each node it invokes the long or short parser (or a
//!    pruned variant selected by [`scanner::constrained`] constraints on
//!    neighbouring node types and prior productions) to match the next
//!    slice of the transcribed input.
//!
//! Loading token/rule/constraint/meter data from YAML, JSON, or any
//! other host format is outside this crate: [`config`] only defines the
//! plain-data shapes construction expects.
//!
//! # Example
//!
//! ```
//! use meter_scan::config::{
//!     OnMatchRulesConfig, RulesConfig, TokensConfig, WhitespaceConfig,
//! };
//! use meter_scan::graph_parser::GraphParser;
//!
//! let tokens = TokensConfig(vec![
//!     ("a".into(), vec!["short".into()]),
//!     ("aa".into(), vec!["long".into()]),
//!     (" ".into(), vec!["wb".into()]),
//! ]);
//! let rules = RulesConfig(vec![
//!     ("a".into(), "-".into()),
//!     ("aa".into(), "=".into()),
//! ]);
//! let whitespace = WhitespaceConfig {
//!     default: " ".into(),
//!     token_class: "wb".into(),
//!     consolidate: true,
//! };
//!
//! let parser = GraphParser::new(tokens, rules, OnMatchRulesConfig::default(), whitespace).unwrap();
//! assert_eq!(parser.parse("aaa").unwrap(), "=-");
//! ```
//!
//! Building a full [`scanner::Scanner`] additionally requires a
//! translation graph of registered meters; see [`automaton::build_translation_graph`]
//! and [`scanner::Scanner::new`].

pub mod automaton;
pub mod config;
pub mod error;
pub mod graph;
pub mod graph_parser;
pub mod scanner;
pub mod util;
pub mod viz;

pub use error::{Error, Result};
pub use graph_parser::GraphParser;
pub use scanner::Scanner;
