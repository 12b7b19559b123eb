//! Unit tests for JsError and ErrorKind

use core_types::{ErrorKind, JsError, SourcePosition};

#[cfg(test)]
mod error_kind_tests {
    use super::*;

    #[test]
    fn test_error_kind_lexical() {
        let kind = ErrorKind::Lexical;
        assert!(matches!(kind, ErrorKind::Lexical));
    }

    #[test]
    fn test_error_kind_syntax() {
        let kind = ErrorKind::Syntax;
        assert!(matches!(kind, ErrorKind::Syntax));
    }

    #[test]
    fn test_error_kind_static_semantic() {
        let kind = ErrorKind::StaticSemantic;
        assert!(matches!(kind, ErrorKind::StaticSemantic));
    }

    #[test]
    fn test_error_kind_copy_and_equality() {
        let kind1 = ErrorKind::Syntax;
        let kind2 = kind1;

        assert_eq!(kind1, kind2);
        assert_ne!(kind1, ErrorKind::Lexical);
    }
}

#[cfg(test)]
mod js_error_tests {
    use super::*;

    fn sample_error() -> JsError {
        JsError {
            kind: ErrorKind::Syntax,
            message: "Unexpected token `)`".to_string(),
            position: SourcePosition {
                line: 2,
                column: 7,
                offset: 19,
            },
        }
    }

    #[test]
    fn test_error_carries_message_and_position() {
        let err = sample_error();

        assert_eq!(err.message, "Unexpected token `)`");
        assert_eq!(err.position.line, 2);
        assert_eq!(err.position.column, 7);
        assert_eq!(err.position.offset, 19);
    }

    #[test]
    fn test_error_display_format() {
        let err = sample_error();

        assert_eq!(format!("{}", err), "Unexpected token `)` at (2:7)");
    }

    #[test]
    fn test_error_is_std_error() {
        let err = sample_error();
        let as_std: &dyn std::error::Error = &err;

        assert_eq!(as_std.to_string(), "Unexpected token `)` at (2:7)");
    }

    #[test]
    fn test_error_clone() {
        let err1 = sample_error();
        let err2 = err1.clone();

        assert_eq!(err1.message, err2.message);
        assert_eq!(err1.position, err2.position);
    }

    #[test]
    fn test_first_line_positions() {
        let err = JsError {
            kind: ErrorKind::Lexical,
            message: "Unterminated string constant".to_string(),
            position: SourcePosition {
                line: 1,
                column: 0,
                offset: 0,
            },
        };

        assert_eq!(err.to_string(), "Unterminated string constant at (1:0)");
    }
}
