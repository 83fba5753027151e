//! Error kinds surfaced by the graph parser, automaton builder and scanner.
//!
//! Each kind is its own struct so callers can match on specifics; [`Error`]
//! is the umbrella type every fallible public operation returns.

use std::fmt::{self, Display, Formatter};

use crate::util::Position;

#[derive(Debug, Clone, PartialEq, Eq)]
/// An input document (tokens, rules, constraints, meters list) violates the
/// shape a construction step expects.
pub struct SchemaError {
    pub message: String,
}

impl SchemaError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "SchemaError: {}", self.message)
    }
}

impl std::error::Error for SchemaError {}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A rule, constraint or onmatch rule names a token, class or production
/// that is not declared anywhere.
pub struct ReferenceError {
    pub name: String,
    pub message: String,
}

impl ReferenceError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl Display for ReferenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ReferenceError: {} (\"{}\")", self.message, self.name)
    }
}

impl std::error::Error for ReferenceError {}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A meter regex is unbalanced, empty, or applies an operator with no
/// preceding atom.
pub struct RegexError {
    pub pattern: String,
    pub message: String,
}

impl RegexError {
    pub fn new(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}

impl Display for RegexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "RegexError: {} (in \"{}\")", self.message, self.pattern)
    }
}

impl std::error::Error for RegexError {}

#[derive(Debug, Clone, PartialEq, Eq)]
/// An input character could not be consumed by a parser's token set.
pub struct TokenisationError {
    pub position: Position,
    pub message: String,
}

impl TokenisationError {
    pub fn new(position: Position, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

impl Display for TokenisationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "TokenisationError: {} at {}", self.message, self.position)
    }
}

impl std::error::Error for TokenisationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
/// No rule applied at a token position after tokenisation.
pub struct ParseError {
    pub token_index: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(token_index: usize, message: impl Into<String>) -> Self {
        Self {
            token_index,
            message: message.into(),
        }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ParseError: {} at token {}",
            self.message, self.token_index
        )
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, PartialEq, Eq)]
/// An internal invariant was violated; should not occur in released builds.
pub struct ScanError {
    pub message: String,
}

impl ScanError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for ScanError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ScanError: {}", self.message)
    }
}

impl std::error::Error for ScanError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Schema(SchemaError),
    Reference(ReferenceError),
    Regex(RegexError),
    Tokenisation(TokenisationError),
    Parse(ParseError),
    Scan(ScanError),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::Schema(e) => e.fmt(f),
            Error::Reference(e) => e.fmt(f),
            Error::Regex(e) => e.fmt(f),
            Error::Tokenisation(e) => e.fmt(f),
            Error::Parse(e) => e.fmt(f),
            Error::Scan(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for Error {}

impl From<SchemaError> for Error {
    fn from(e: SchemaError) -> Self {
        Error::Schema(e)
    }
}
impl From<ReferenceError> for Error {
    fn from(e: ReferenceError) -> Self {
        Error::Reference(e)
    }
}
impl From<RegexError> for Error {
    fn from(e: RegexError) -> Self {
        Error::Regex(e)
    }
}
impl From<TokenisationError> for Error {
    fn from(e: TokenisationError) -> Self {
        Error::Tokenisation(e)
    }
}
impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}
impl From<ScanError> for Error {
    fn from(e: ScanError) -> Self {
        Error::Scan(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_are_prefixed_by_kind() {
        assert!(Error::from(SchemaError::new("x"))
            .to_string()
            .starts_with("SchemaError"));
        assert!(Error::from(ReferenceError::new("y", "x"))
            .to_string()
            .starts_with("ReferenceError"));
        assert!(Error::from(RegexError::new("", "empty regex"))
            .to_string()
            .starts_with("RegexError"));
    }
}
