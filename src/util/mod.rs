mod code;
mod log;
mod position;
use once_cell::unsync::OnceCell;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
/// Line/column position of a byte offset into a [`Code`] value.
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// A wrapper around an input byte string that lazily computes line breaks,
/// used to translate byte offsets into [`Position`]s for error messages.
pub struct Code<'c> {
    pub value: &'c [u8],
    line_breaks: OnceCell<Vec<usize>>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// Ordered debug-trace levels for [`crate::graph_parser::GraphParser`] and
/// [`crate::scanner::Scanner`]. Tracing only ever prints in debug builds.
pub enum Log<T> {
    None,
    Default(T),
    Success(T),
    Result(T),
    Verbose(T),
}
