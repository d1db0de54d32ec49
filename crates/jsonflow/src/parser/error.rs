use thiserror::Error;

/// Fatal parser failures.
///
/// Validation failures are never fatal; they accumulate on the
/// [`ParseResult`](crate::ParseResult) instead. In lenient mode syntax
/// errors are downgraded to accumulated errors as well, so `feed` only
/// returns one of these for strict-mode syntax errors, depth violations
/// (fatal in both modes), or premature `result()` calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParserError {
    #[error("syntax error at position {position}: {message}")]
    Syntax { message: String, position: usize },
    #[error("maximum container depth {0} exceeded")]
    DepthExceeded(usize),
    #[error("parse is not complete")]
    Incomplete,
}
