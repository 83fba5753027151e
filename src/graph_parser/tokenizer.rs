//! Token-stream tokenisation (spec.md §4.2 "Tokenisation"): leftmost,
//! longest-first matching against a parser's token set, with the
//! whitespace sentinel prepended/appended and optionally consolidated.

use regex::bytes::Regex;

use crate::config::WhitespaceConfig;
use crate::error::TokenisationError;
use crate::util::{Code, Position};

/// Build a single alternation regex over `tokens`, longest-first so the
/// engine's leftmost-alternative preference acts as longest-match
/// preference — mirrors `_tokenizer_from` in the Python original.
pub(crate) fn build_tokenizer_regex(tokens: &[String]) -> Regex {
    let mut sorted: Vec<&String> = tokens.iter().collect();
    sorted.sort_by_key(|t| std::cmp::Reverse(t.len()));
    let pattern = sorted
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("({})", pattern)).expect("token alternation is always a valid regex")
}

/// Tokenize `input`, prepending/appending the whitespace default and
/// consolidating runs of whitespace when `whitespace.consolidate` is set.
pub(crate) fn tokenize(
    input: &str,
    tokenizer: &Regex,
    whitespace: &WhitespaceConfig,
    is_whitespace: impl Fn(&str) -> bool,
) -> Result<Vec<String>, TokenisationError> {
    let code = Code::from(input);
    let mut tokens = vec![whitespace.default.clone()];
    let mut prev_whitespace = true;
    let bytes = input.as_bytes();
    let mut pos = 0usize;

    if !bytes.is_empty() {
        loop {
            let m = tokenizer.find(&bytes[pos..]).filter(|m| m.start() == 0);
            let Some(m) = m else {
                return Err(TokenisationError::new(
                    code.obtain_position(pos),
                    format!(
                        "unrecognizable input at byte {}: {:?}",
                        pos,
                        &input[pos..]
                    ),
                ));
            };
            let matched = std::str::from_utf8(&bytes[pos..pos + m.end()])
                .expect("token regex only matches on char boundaries")
                .to_string();
            let is_ws = is_whitespace(&matched);
            if is_ws && prev_whitespace && whitespace.consolidate {
                // collapse into the preceding whitespace run; nothing pushed
            } else {
                tokens.push(matched);
            }
            prev_whitespace = is_ws;
            pos += m.end();
            if pos >= bytes.len() {
                break;
            }
        }
    }

    if whitespace.consolidate {
        while tokens.len() > 1 && is_whitespace(tokens.last().unwrap()) {
            tokens.pop();
        }
    }
    tokens.push(whitespace.default.clone());

    if tokens.len() == 2 {
        return Err(TokenisationError::new(
            Position::new(1, 1),
            format!("unrecognizable (empty) input: {:?}", input),
        ));
    }

    Ok(tokens)
}
