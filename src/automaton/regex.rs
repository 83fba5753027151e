//! Meter regex surface syntax (spec.md §4.3 "Regex -> postfix"): a
//! shunting-yard variant translated from Russ Cox's `dfa0.c` (MIT
//! licensed, via the `0(R)`-wrapped NDFA construction of the original
//! `urdubiometer` package) that turns the infix alphabet `{=, -, _, (, ),
//! |, *, +, ?}` into postfix with implicit concatenation (`.`).

use crate::error::RegexError;

const ALPHABET: &[char] = &['=', '-', '_', '(', ')', '|', '*', '+', '?'];

/// Validate that `regex` only uses the meter-regex alphabet (spec.md §3
/// "Meter regex").
pub(crate) fn validate_alphabet(regex: &str) -> Result<(), RegexError> {
    if regex.is_empty() {
        return Err(RegexError::new(regex, "regex is empty"));
    }
    for c in regex.chars() {
        if !ALPHABET.contains(&c) {
            return Err(RegexError::new(
                regex,
                format!("character '{}' is not in the meter regex alphabet", c),
            ));
        }
    }
    Ok(())
}

/// Convert an infix regex (already alphabet-validated, possibly wrapped
/// with a leading sentinel e.g. `"0(...)"`) to postfix with implicit `.`
/// concatenation.
pub(crate) fn to_postfix(regex: &str) -> Result<Vec<char>, RegexError> {
    if regex.is_empty() {
        return Err(RegexError::new(regex, "regex is empty"));
    }

    let mut nalt = 0i32;
    let mut natom = 0i32;
    let mut dst: Vec<char> = Vec::new();
    let mut paren: Vec<(i32, i32)> = Vec::new();

    for c in regex.chars() {
        match c {
            '(' => {
                if natom > 1 {
                    natom -= 1;
                    dst.push('.');
                }
                paren.push((nalt, natom));
                nalt = 0;
                natom = 0;
            }
            '|' => {
                if natom == 0 {
                    return Err(RegexError::new(
                        regex,
                        "'|' requires an expression to its left",
                    ));
                }
                natom -= 1;
                while natom > 0 {
                    dst.push('.');
                    natom -= 1;
                }
                nalt += 1;
            }
            ')' => {
                let Some((prev_nalt, prev_natom)) = paren.pop() else {
                    return Err(RegexError::new(regex, "unbalanced parentheses"));
                };
                if natom == 0 {
                    return Err(RegexError::new(regex, "empty parenthesized group"));
                }
                natom -= 1;
                while natom > 0 {
                    dst.push('.');
                    natom -= 1;
                }
                while nalt > 0 {
                    dst.push('|');
                    nalt -= 1;
                }
                nalt = prev_nalt;
                natom = prev_natom;
                natom += 1;
            }
            '*' | '+' | '?' => {
                if natom == 0 {
                    return Err(RegexError::new(
                        regex,
                        format!("'{}' requires a preceding expression", c),
                    ));
                }
                dst.push(c);
            }
            _ => {
                if natom > 1 {
                    natom -= 1;
                    dst.push('.');
                }
                dst.push(c);
                natom += 1;
            }
        }
    }

    if !paren.is_empty() {
        return Err(RegexError::new(regex, "unbalanced parentheses"));
    }

    natom -= 1;
    while natom > 0 {
        dst.push('.');
        natom -= 1;
    }
    while nalt > 0 {
        dst.push('|');
        nalt -= 1;
    }

    Ok(dst)
}
