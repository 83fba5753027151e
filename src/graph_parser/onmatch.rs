//! [`OnMatchRule`] and the precomputed `(current token, previous token) ->
//! candidate rules` lookup table (spec.md §4.2 "On-match lookup").

use std::collections::HashMap;

use crate::error::SchemaError;

/// A production emitted between two adjacent [`super::rule::ParserRule`]
/// matches, when the boundary's classes line up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnMatchRule {
    pub prev_classes: Vec<String>,
    pub next_classes: Vec<String>,
    pub production: String,
}

/// Parse `"<cls_a> <cls_b> + <cls_c>"` into prev/next class lists. The `+`
/// term (spec.md §6) separates previous classes from next classes; both
/// sides must be non-empty, bare `<class>` terms.
pub fn parse_onmatch_string(s: &str) -> Result<(Vec<String>, Vec<String>), SchemaError> {
    let terms = super::rule::split_terms(s)?;
    let plus_pos = terms.iter().position(|t| *t == "+").ok_or_else(|| {
        SchemaError::new(format!(
            "onmatch rule \"{}\" is missing the \"+\" separator",
            s
        ))
    })?;

    let parse_classes = |slice: &[&str]| -> Result<Vec<String>, SchemaError> {
        if slice.is_empty() {
            return Err(SchemaError::new(format!(
                "onmatch rule \"{}\" has an empty class list",
                s
            )));
        }
        slice
            .iter()
            .map(|t| match t.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
                Some(name) => Ok(name.to_string()),
                None => Err(SchemaError::new(format!(
                    "onmatch rule \"{}\" expects only <class> terms, found \"{}\"",
                    s, t
                ))),
            })
            .collect()
    };

    let prev_classes = parse_classes(&terms[..plus_pos])?;
    let next_classes = parse_classes(&terms[plus_pos + 1..])?;
    Ok((prev_classes, next_classes))
}

/// `onmatch_lookup[(current_token, previous_token)]` -> indices into the
/// crate's onmatch rule list, in original (input) order, restricted to
/// rules whose `next_classes[0]`/`prev_classes[-1]` could possibly apply at
/// this token pair. Full class-window matching is re-checked at parse time
/// (`GraphParser::parse`) since classes beyond the boundary token can't be
/// precomputed pairwise.
pub fn build_onmatch_lookup(
    tokens: &HashMap<String, std::collections::HashSet<String>>,
    onmatch_rules: &[OnMatchRule],
) -> HashMap<(String, String), Vec<usize>> {
    let mut lookup: HashMap<(String, String), Vec<usize>> = HashMap::new();
    for token_key in tokens.keys() {
        for prev_token_key in tokens.keys() {
            lookup.insert((token_key.clone(), prev_token_key.clone()), Vec::new());
        }
    }

    for (rule_i, rule) in onmatch_rules.iter().enumerate() {
        let Some(first_next) = rule.next_classes.first() else {
            continue;
        };
        let Some(last_prev) = rule.prev_classes.last() else {
            continue;
        };
        for (token_key, token_classes) in tokens {
            if !token_classes.contains(first_next) {
                continue;
            }
            for (prev_token_key, prev_token_classes) in tokens {
                if prev_token_classes.contains(last_prev) {
                    lookup
                        .entry((token_key.clone(), prev_token_key.clone()))
                        .or_default()
                        .push(rule_i);
                }
            }
        }
    }
    lookup
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prev_and_next_classes() {
        let (prev, next) = parse_onmatch_string("<class1> + <class2>").unwrap();
        assert_eq!(prev, vec!["class1"]);
        assert_eq!(next, vec!["class2"]);
    }

    #[test]
    fn parses_multi_class_sides() {
        let (prev, next) = parse_onmatch_string("<a> <b> + <c> <d>").unwrap();
        assert_eq!(prev, vec!["a", "b"]);
        assert_eq!(next, vec!["c", "d"]);
    }

    #[test]
    fn missing_separator_is_schema_error() {
        assert!(parse_onmatch_string("<a> <b>").is_err());
    }
}
