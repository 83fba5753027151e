//! [`ParserRule`] and the surface syntax (spec.md §6) used to write one as a
//! plain string: central tokens, `(...)`-wrapped context groups, and
//! `<class>` class constraints.

use crate::error::SchemaError;

/// One rule of a [`super::GraphParser`]: a production plus the tokens (and
/// optional surrounding context) it must match.
///
/// `cost` is always negative; more exact/specific rules sort first. See
/// [`cost_of`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserRule {
    pub production: String,
    pub prev_classes: Vec<String>,
    pub prev_tokens: Vec<String>,
    pub tokens: Vec<String>,
    pub next_tokens: Vec<String>,
    pub next_classes: Vec<String>,
    pub cost: i32,
}

const COST_OF_EXACT_TOKEN: i32 = -100;
const COST_OF_TOKEN_CLASS: i32 = -101;

/// Cost of a rule, computed from its constraint counts (spec.md §3): each
/// exact token contributes `-100`, each class constraint `-101`. Rules with
/// more, or more specific, constraints are more negative and sort first.
pub fn cost_of(
    prev_classes: &[String],
    prev_tokens: &[String],
    tokens: &[String],
    next_tokens: &[String],
    next_classes: &[String],
) -> i32 {
    COST_OF_TOKEN_CLASS * prev_classes.len() as i32
        + COST_OF_EXACT_TOKEN * prev_tokens.len() as i32
        + COST_OF_EXACT_TOKEN * tokens.len() as i32
        + COST_OF_EXACT_TOKEN * next_tokens.len() as i32
        + COST_OF_TOKEN_CLASS * next_classes.len() as i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Term<'a> {
    Group(&'a str),
    Class(&'a str),
    Bare(&'a str),
}

/// Split a rule (or onmatch rule) string on whitespace, keeping `(...)`
/// groups intact as a single term.
pub(crate) fn split_terms(s: &str) -> Result<Vec<&str>, SchemaError> {
    let bytes = s.as_bytes();
    let mut i = 0usize;
    let mut terms = Vec::new();
    while i < bytes.len() {
        while i < bytes.len() && bytes[i] == b' ' {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }
        let start = i;
        if bytes[i] == b'(' {
            let mut depth = 0i32;
            while i < bytes.len() {
                match bytes[i] {
                    b'(' => depth += 1,
                    b')' => {
                        depth -= 1;
                        if depth == 0 {
                            i += 1;
                            break;
                        }
                    }
                    _ => {}
                }
                i += 1;
            }
            if depth != 0 {
                return Err(SchemaError::new(format!(
                    "unbalanced parentheses in rule \"{}\"",
                    s
                )));
            }
        } else {
            while i < bytes.len() && bytes[i] != b' ' {
                i += 1;
            }
        }
        terms.push(&s[start..i]);
    }
    Ok(terms)
}

fn classify<'a>(term: &'a str) -> Term<'a> {
    if term.starts_with('(') && term.ends_with(')') {
        Term::Group(&term[1..term.len() - 1])
    } else if term.starts_with('<') && term.ends_with('>') {
        Term::Class(&term[1..term.len() - 1])
    } else {
        Term::Bare(term)
    }
}

/// Split a group's interior into its bare tokens and class names, in
/// left-to-right order (nearest the central match is last).
fn split_group(inner: &str) -> Result<(Vec<String>, Vec<String>), SchemaError> {
    let mut tokens = Vec::new();
    let mut classes = Vec::new();
    for term in split_terms(inner)? {
        match classify(term) {
            Term::Class(name) => classes.push(name.to_string()),
            Term::Bare(tok) => tokens.push(tok.to_string()),
            Term::Group(_) => {
                return Err(SchemaError::new(format!(
                    "nested groups are not supported: \"({})\"",
                    inner
                )))
            }
        }
    }
    Ok((tokens, classes))
}

/// Parse a rule's surface string (spec.md §6) into the fields of a
/// [`ParserRule`], excluding `cost`.
///
/// ```text
/// a b            -> tokens = [a, b]
/// (a) b          -> prev_tokens = [a], tokens = [b]
/// a (b)          -> tokens = [a], next_tokens = [b]
/// <wb> u         -> prev_classes = [wb], tokens = [u]
/// (a <cls>) a    -> prev_tokens = [a], prev_classes = [cls], tokens = [a]
/// ```
pub fn parse_rule_string(rule_str: &str) -> Result<ParserRule, SchemaError> {
    let terms = split_terms(rule_str)?;
    let classified: Vec<Term> = terms.iter().map(|t| classify(t)).collect();

    let center_start = classified
        .iter()
        .position(|t| matches!(t, Term::Bare(_)))
        .ok_or_else(|| {
            SchemaError::new(format!(
                "rule \"{}\" has no central (unparenthesized, unclassed) token",
                rule_str
            ))
        })?;
    let mut center_end = center_start;
    while center_end + 1 < classified.len() && matches!(classified[center_end + 1], Term::Bare(_))
    {
        center_end += 1;
    }

    let mut prev_tokens = Vec::new();
    let mut prev_classes = Vec::new();
    for term in &classified[..center_start] {
        match term {
            Term::Group(inner) => {
                let (t, c) = split_group(inner)?;
                prev_tokens.extend(t);
                prev_classes.extend(c);
            }
            Term::Class(name) => prev_classes.push(name.to_string()),
            Term::Bare(tok) => {
                return Err(SchemaError::new(format!(
                    "rule \"{}\" has more than one central token run (unexpected \"{}\" before the match)",
                    rule_str, tok
                )))
            }
        }
    }

    let tokens: Vec<String> = classified[center_start..=center_end]
        .iter()
        .map(|t| match t {
            Term::Bare(tok) => tok.to_string(),
            _ => unreachable!("center run only contains bare terms"),
        })
        .collect();

    let mut next_tokens = Vec::new();
    let mut next_classes = Vec::new();
    for term in &classified[center_end + 1..] {
        match term {
            Term::Group(inner) => {
                let (t, c) = split_group(inner)?;
                next_tokens.extend(t);
                next_classes.extend(c);
            }
            Term::Class(name) => next_classes.push(name.to_string()),
            Term::Bare(tok) => {
                return Err(SchemaError::new(format!(
                    "rule \"{}\" has more than one central token run (unexpected \"{}\" after the match)",
                    rule_str, tok
                )))
            }
        }
    }

    let cost = cost_of(
        &prev_classes,
        &prev_tokens,
        &tokens,
        &next_tokens,
        &next_classes,
    );

    Ok(ParserRule {
        production: String::new(),
        prev_classes,
        prev_tokens,
        tokens,
        next_tokens,
        next_classes,
        cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_central_tokens() {
        let r = parse_rule_string("a b").unwrap();
        assert_eq!(r.tokens, vec!["a", "b"]);
        assert!(r.prev_tokens.is_empty());
        assert!(r.next_tokens.is_empty());
    }

    #[test]
    fn prev_group_is_prev_tokens() {
        let r = parse_rule_string("(a) b").unwrap();
        assert_eq!(r.prev_tokens, vec!["a"]);
        assert_eq!(r.tokens, vec!["b"]);
    }

    #[test]
    fn next_group_is_next_tokens() {
        let r = parse_rule_string("a (b)").unwrap();
        assert_eq!(r.tokens, vec!["a"]);
        assert_eq!(r.next_tokens, vec!["b"]);
    }

    #[test]
    fn bare_class_before_center() {
        let r = parse_rule_string("<wb> u").unwrap();
        assert_eq!(r.prev_classes, vec!["wb"]);
        assert_eq!(r.tokens, vec!["u"]);
    }

    #[test]
    fn group_mixes_token_and_class() {
        let r = parse_rule_string("(a <class_a>) a").unwrap();
        assert_eq!(r.prev_tokens, vec!["a"]);
        assert_eq!(r.prev_classes, vec!["class_a"]);
        assert_eq!(r.tokens, vec!["a"]);
    }

    #[test]
    fn costs_are_negative_and_more_specific_sorts_lower() {
        let plain = parse_rule_string("a").unwrap();
        let with_class = parse_rule_string("<wb> a").unwrap();
        let with_token = parse_rule_string("(b) a").unwrap();
        assert!(plain.cost < 0);
        assert!(with_class.cost < plain.cost);
        assert!(with_token.cost < with_class.cost);
    }

    #[test]
    fn unbalanced_parens_is_schema_error() {
        assert!(parse_rule_string("(a b").is_err());
    }

    #[test]
    fn empty_central_run_is_schema_error() {
        assert!(parse_rule_string("<cls>").is_err());
    }
}
