//! Contract compliance tests for core_types
//!
//! These tests verify that the implementation matches the contract the
//! parser components rely on: immutable source buffers with positional
//! queries and a single positioned diagnostic type.

use core_types::{ErrorKind, JsError, SourceBuffer, SourcePosition, Span};

#[cfg(test)]
mod source_buffer_contract_tests {
    use super::*;

    /// Contract: the buffer is created from a name and the full text
    #[test]
    fn test_buffer_construction() {
        let _: SourceBuffer = SourceBuffer::new("main.js", "let x = 1;");
    }

    /// Contract: positional queries return (1-based line, 0-based column)
    #[test]
    fn test_position_query_types() {
        let buf = SourceBuffer::new("main.js", "a\nb");
        let pos: SourcePosition = buf.position_at(2);

        let _: u32 = pos.line;
        let _: u32 = pos.column;
        let _: usize = pos.offset;
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 0);
    }

    /// Contract: the buffer is read-only; queries take &self
    #[test]
    fn test_queries_through_shared_reference() {
        let buf = SourceBuffer::new("main.js", "abc");
        let shared = &buf;

        assert_eq!(shared.len(), 3);
        assert_eq!(shared.char_at(1), Some('b'));
        assert_eq!(shared.slice(Span::new(0, 2)), "ab");
        assert_eq!(shared.text(), "abc");
        assert_eq!(shared.name(), "main.js");
    }

    /// Contract: all line terminator forms count for line numbering
    #[test]
    fn test_all_terminator_forms_count() {
        for source in ["a\nb", "a\rb", "a\u{2028}b", "a\u{2029}b"] {
            let buf = SourceBuffer::new("t.js", source);
            assert_eq!(buf.position_at(2).line, 2, "source {:?}", source);
        }
        let crlf = SourceBuffer::new("t.js", "a\r\nb");
        assert_eq!(crlf.position_at(3).line, 2);
    }
}

#[cfg(test)]
mod span_contract_tests {
    use super::*;

    /// Contract: spans are half-open with start <= end
    #[test]
    fn test_span_shape() {
        let span = Span::new(2, 5);

        let _: usize = span.start;
        let _: usize = span.end;
        assert!(span.start <= span.end);
        assert_eq!(span.len(), 3);
    }

    /// Contract: containment supports the nesting property checks
    #[test]
    fn test_span_containment() {
        let parent = Span::new(0, 20);
        let child = Span::new(4, 9);

        assert!(parent.contains(child));
        assert!(!child.contains(parent));
    }
}

#[cfg(test)]
mod error_contract_tests {
    use super::*;

    /// Contract: ErrorKind covers the three diagnostic classes
    #[test]
    fn test_error_kind_variants() {
        let _: ErrorKind = ErrorKind::Lexical;
        let _: ErrorKind = ErrorKind::Syntax;
        let _: ErrorKind = ErrorKind::StaticSemantic;
    }

    /// Contract: a diagnostic is message + kind + position
    #[test]
    fn test_error_shape() {
        let err = JsError {
            kind: ErrorKind::StaticSemantic,
            message: "Duplicate export `a`".to_string(),
            position: SourcePosition {
                line: 4,
                column: 9,
                offset: 51,
            },
        };

        let _: &str = &err.message;
        let _: SourcePosition = err.position;
        assert!(matches!(err.kind, ErrorKind::StaticSemantic));
    }

    /// Contract: Display is "<message> at (<line>:<column>)"
    #[test]
    fn test_error_display_contract() {
        let err = JsError {
            kind: ErrorKind::Syntax,
            message: "Unexpected token `}`".to_string(),
            position: SourcePosition {
                line: 12,
                column: 0,
                offset: 240,
            },
        };

        assert_eq!(err.to_string(), "Unexpected token `}` at (12:0)");
    }

    /// Contract: JsError implements std::error::Error
    #[test]
    fn test_error_trait_object() {
        let err = JsError {
            kind: ErrorKind::Lexical,
            message: "Unterminated template literal".to_string(),
            position: SourcePosition {
                line: 1,
                column: 3,
                offset: 3,
            },
        };
        let boxed: Box<dyn std::error::Error> = Box::new(err);

        assert!(boxed.to_string().ends_with("at (1:3)"));
    }
}
