//! Diagnostic constructors.
//!
//! Every violated contract in the lexer, the grammar or the scope tracker
//! funnels through one of these helpers into a single positioned
//! [`JsError`]. The first error raised anywhere aborts the parse.

use core_types::{ErrorKind, JsError, SourceBuffer, SourcePosition};

use crate::lexer::Token;

/// Create a lexical error at a character offset.
pub fn lexical_error(source: &SourceBuffer, offset: usize, message: impl Into<String>) -> JsError {
    error_at(source, offset, ErrorKind::Lexical, message)
}

/// Create a grammar error at a character offset.
pub fn syntax_error(source: &SourceBuffer, offset: usize, message: impl Into<String>) -> JsError {
    error_at(source, offset, ErrorKind::Syntax, message)
}

/// Create an early (static-semantic) error at a character offset.
pub fn semantic_error(source: &SourceBuffer, offset: usize, message: impl Into<String>) -> JsError {
    error_at(source, offset, ErrorKind::StaticSemantic, message)
}

/// Create an unexpected-token error at the token's start, embedding the
/// token's printable form. EOF gets its own wording.
pub fn unexpected_token(source: &SourceBuffer, token: &Token) -> JsError {
    let message = if token.is_eof() {
        "Unexpected end of input".to_string()
    } else {
        format!("Unexpected token `{}`", token.printable())
    };
    error_at(source, token.span.start, ErrorKind::Syntax, message)
}

fn error_at(
    source: &SourceBuffer,
    offset: usize,
    kind: ErrorKind,
    message: impl Into<String>,
) -> JsError {
    let SourcePosition { line, column, .. } = source.position_at(offset);
    JsError {
        kind,
        message: message.into(),
        position: SourcePosition {
            line,
            column,
            offset,
        },
    }
}
