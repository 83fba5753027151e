//! Plain-data configuration structures a host hands to [`crate::graph_parser::GraphParser`]
//! and [`crate::scanner::Scanner`]. Loading these from YAML/JSON/CLI flags is a
//! host concern; this crate only defines the shapes.

use std::collections::HashMap;

/// `token -> classes` mapping. Order is not semantically meaningful.
#[derive(Debug, Clone, Default)]
pub struct TokensConfig(pub Vec<(String, Vec<String>)>);

/// Ordered `rule-string -> production` pairs. Order determines cost ties and
/// on-match precomputation, and is preserved verbatim.
#[derive(Debug, Clone, Default)]
pub struct RulesConfig(pub Vec<(String, String)>);

/// Ordered `onmatch-rule-string -> production` pairs, e.g.
/// `"<c1> + <c2>" -> ","`. Order decides which rule fires when more than one
/// could apply at a boundary ("first in input order" wins).
#[derive(Debug, Clone, Default)]
pub struct OnMatchRulesConfig(pub Vec<(String, String)>);

#[derive(Debug, Clone)]
pub struct WhitespaceConfig {
    pub default: String,
    pub token_class: String,
    pub consolidate: bool,
}

/// Nested `prev_type -> next_type -> prev_production -> forbidden productions`.
/// Legal `(prev_type, next_type)` pairs are `(_,=), (-,-), (-,=), (=,_), (=,-),
/// (=,=)`; `(_,=)` uses the wildcard previous-production key `"*"`.
pub type ConstraintsConfig = HashMap<String, HashMap<String, HashMap<String, Vec<String>>>>;

pub const CONSTRAINT_WILDCARD: &str = "*";

#[derive(Debug, Clone)]
pub struct MeterConfig {
    pub id: String,
    pub name: String,
    pub regex_pattern: String,
    /// Foot-pattern template, e.g. `"==//=-="`, used by [`crate::scanner::feet`].
    pub fp7pattern: Option<String>,
    pub notes: Option<String>,
    pub genre: Option<String>,
}
