//! Constrained parser construction (spec.md §4.4): for every
//! `(prev_type, next_type, prev_production)` triple named by a
//! [`ConstraintsConfig`], a pruned copy of whichever parser `next_type`
//! naturally selects (long for `=`, short for `-`/`_`), forbidding the
//! listed productions. All constrained parsers are built once at scanner
//! construction and cached.

use std::collections::{HashMap, HashSet};

use crate::config::{ConstraintsConfig, CONSTRAINT_WILDCARD};
use crate::error::{Error, Result, SchemaError};
use crate::graph_parser::GraphParser;

/// Legal `(prev_type, next_type)` pairs named in spec.md §3 "Constraints
/// map": `(_,=), (-,-), (-,=), (=,_), (=,-), (=,=)`.
fn is_legal_pair(prev: char, next: char) -> bool {
    matches!(
        (prev, next),
        ('_', '=') | ('-', '-') | ('-', '=') | ('=', '_') | ('=', '-') | ('=', '=')
    )
}

/// `(prev_type, next_type, prev_production) -> pruned parser`. Keyed by
/// the raw type chars (`'='`, `'-'`, `'_'`) and, per spec.md §3, the
/// wildcard previous-production key [`CONSTRAINT_WILDCARD`] for the
/// `(_, =)` pair.
pub(crate) type ConstrainedParsers = HashMap<(char, char, String), GraphParser>;

pub(crate) fn build_constrained_parsers(
    constraints: &ConstraintsConfig,
    long_parser: &GraphParser,
    short_parser: &GraphParser,
    long_productions: &HashSet<&str>,
    short_productions: &HashSet<&str>,
) -> Result<ConstrainedParsers> {
    let mut out = HashMap::new();

    for (prev_key, next_map) in constraints {
        let prev_char = single_char(prev_key)?;
        for (next_key, prev_prod_map) in next_map {
            let next_char = single_char(next_key)?;
            if !is_legal_pair(prev_char, next_char) {
                return Err(Error::from(SchemaError::new(format!(
                    "illegal constraint pair ({}, {})",
                    prev_key, next_key
                ))));
            }

            let base_productions = if next_char == '=' {
                long_productions
            } else {
                short_productions
            };

            for (prev_production, forbidden) in prev_prod_map {
                if prev_production != CONSTRAINT_WILDCARD
                    && !base_productions.contains(prev_production.as_str())
                {
                    return Err(Error::from(SchemaError::new(format!(
                        "constraint references unknown previous production \"{}\"",
                        prev_production
                    ))));
                }
                let forbidden_set: HashSet<String> = forbidden.iter().cloned().collect();
                for production in &forbidden_set {
                    if !base_productions.contains(production.as_str()) {
                        return Err(Error::from(SchemaError::new(format!(
                            "constraint forbids unknown production \"{}\"",
                            production
                        ))));
                    }
                }

                let base_parser = if next_char == '=' {
                    long_parser
                } else {
                    short_parser
                };
                let pruned = base_parser.pruned_of(&forbidden_set);
                out.insert((prev_char, next_char, prev_production.clone()), pruned);
            }
        }
    }

    Ok(out)
}

fn single_char(s: &str) -> Result<char> {
    let mut chars = s.chars();
    let c = chars.next().ok_or_else(|| {
        Error::from(SchemaError::new("constraint node type key is empty"))
    })?;
    if chars.next().is_some() {
        return Err(Error::from(SchemaError::new(format!(
            "constraint node type key \"{}\" is not a single character",
            s
        ))));
    }
    Ok(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OnMatchRulesConfig, RulesConfig, TokensConfig, WhitespaceConfig};

    fn tiny_parser(rules: &[(&str, &str)]) -> GraphParser {
        let tokens = TokensConfig(vec![
            ("a".into(), vec!["tok".into()]),
            ("b".into(), vec!["tok".into()]),
            (" ".into(), vec!["wb".into()]),
        ]);
        let rules = RulesConfig(
            rules
                .iter()
                .map(|(r, p)| (r.to_string(), p.to_string()))
                .collect(),
        );
        let whitespace = WhitespaceConfig {
            default: " ".into(),
            token_class: "wb".into(),
            consolidate: true,
        };
        GraphParser::new(tokens, rules, OnMatchRulesConfig::default(), whitespace).unwrap()
    }

    #[test]
    fn unknown_production_in_constraint_is_schema_error() {
        let long = tiny_parser(&[("a", "s<a>")]);
        let short = tiny_parser(&[("a", "s<a>")]);
        let mut constraints = ConstraintsConfig::new();
        let mut next_map = HashMap::new();
        let mut prev_map = HashMap::new();
        prev_map.insert("s<a>".to_string(), vec!["s<nonexistent>".to_string()]);
        next_map.insert("-".to_string(), prev_map);
        constraints.insert("-".to_string(), next_map);

        let long_productions = long.productions();
        let short_productions = short.productions();
        let err = build_constrained_parsers(
            &constraints,
            &long,
            &short,
            &long_productions,
            &short_productions,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn illegal_pair_is_schema_error() {
        let long = tiny_parser(&[("a", "s<a>")]);
        let short = tiny_parser(&[("a", "s<a>")]);
        let mut constraints = ConstraintsConfig::new();
        let mut next_map = HashMap::new();
        next_map.insert("_".to_string(), HashMap::new());
        constraints.insert("_".to_string(), next_map);

        let long_productions = long.productions();
        let short_productions = short.productions();
        let err = build_constrained_parsers(
            &constraints,
            &long,
            &short,
            &long_productions,
            &short_productions,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }
}
