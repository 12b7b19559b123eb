//! Parse diagnostic types.
//!
//! A parse attempt produces at most one [`JsError`]: the first violated
//! contract anywhere in the descent wins and parsing halts. There is no
//! warning level and no multi-error aggregation.

use crate::SourcePosition;
use thiserror::Error;

/// The class of a parse diagnostic.
///
/// All three classes propagate identically; the kind records which layer of
/// the parser detected the violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Tokenization failure (unterminated literal, malformed number, ...)
    Lexical,
    /// Grammar violation (unexpected token, malformed cover-grammar form)
    Syntax,
    /// Early error (duplicate binding, illegal `super`, private-field
    /// resolution failure, export inconsistency, strict-mode violation)
    StaticSemantic,
}

/// A single positioned parse diagnostic.
///
/// Displays as `"<message> at (<line>:<column>)"` with a 1-based line and a
/// 0-based column.
///
/// # Examples
///
/// ```
/// use core_types::{ErrorKind, JsError, SourcePosition};
///
/// let error = JsError {
///     kind: ErrorKind::Syntax,
///     message: "Unexpected token `)`".to_string(),
///     position: SourcePosition { line: 1, column: 4, offset: 4 },
/// };
///
/// assert_eq!(format!("{}", error), "Unexpected token `)` at (1:4)");
/// ```
#[derive(Debug, Clone, Error)]
#[error("{message} at {position}")]
pub struct JsError {
    /// Which layer detected the violation
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Where the violation was detected
    pub position: SourcePosition,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_format() {
        let err = JsError {
            kind: ErrorKind::StaticSemantic,
            message: "Duplicate export `a`".to_string(),
            position: SourcePosition {
                line: 3,
                column: 9,
                offset: 41,
            },
        };
        assert_eq!(err.to_string(), "Duplicate export `a` at (3:9)");
    }

    #[test]
    fn test_error_kind_is_copy() {
        let kind = ErrorKind::Lexical;
        let copy = kind;
        assert_eq!(kind, copy);
    }
}
