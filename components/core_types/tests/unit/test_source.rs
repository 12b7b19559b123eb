//! Unit tests for SourceBuffer, SourcePosition and Span

use core_types::{
    is_id_continue, is_id_start, is_line_terminator, is_whitespace, SourceBuffer, SourcePosition,
    Span,
};

#[cfg(test)]
mod source_position_tests {
    use super::*;

    #[test]
    fn test_source_position_creation() {
        let pos = SourcePosition {
            line: 10,
            column: 5,
            offset: 150,
        };

        assert_eq!(pos.line, 10);
        assert_eq!(pos.column, 5);
        assert_eq!(pos.offset, 150);
    }

    #[test]
    fn test_source_position_display() {
        let pos = SourcePosition {
            line: 3,
            column: 14,
            offset: 42,
        };

        assert_eq!(format!("{}", pos), "(3:14)");
    }

    #[test]
    fn test_source_position_clone() {
        let pos1 = SourcePosition {
            line: 42,
            column: 7,
            offset: 1000,
        };
        let pos2 = pos1;

        assert_eq!(pos1, pos2);
    }

    #[test]
    fn test_source_position_equality() {
        let pos1 = SourcePosition {
            line: 10,
            column: 20,
            offset: 100,
        };
        let pos2 = SourcePosition {
            line: 10,
            column: 20,
            offset: 100,
        };
        let pos3 = SourcePosition {
            line: 11,
            column: 20,
            offset: 100,
        };

        assert_eq!(pos1, pos2);
        assert_ne!(pos1, pos3);
    }
}

#[cfg(test)]
mod span_tests {
    use super::*;

    #[test]
    fn test_span_creation() {
        let span = Span::new(3, 9);

        assert_eq!(span.start, 3);
        assert_eq!(span.end, 9);
        assert_eq!(span.len(), 6);
        assert!(!span.is_empty());
    }

    #[test]
    fn test_span_at_single_offset() {
        let span = Span::at(7);

        assert_eq!(span.start, 7);
        assert_eq!(span.end, 7);
        assert!(span.is_empty());
    }

    #[test]
    fn test_span_contains() {
        let outer = Span::new(0, 10);
        let inner = Span::new(2, 8);

        assert!(outer.contains(inner));
        assert!(outer.contains(outer));
        assert!(!inner.contains(outer));
    }

    #[test]
    fn test_span_to_covers_both() {
        let a = Span::new(2, 4);
        let b = Span::new(8, 12);

        assert_eq!(a.to(b), Span::new(2, 12));
        assert_eq!(b.to(a), Span::new(2, 12));
    }
}

#[cfg(test)]
mod source_buffer_tests {
    use super::*;

    #[test]
    fn test_buffer_owns_name_and_text() {
        let buf = SourceBuffer::new("script.js", "let x = 1;");

        assert_eq!(buf.name(), "script.js");
        assert_eq!(buf.text(), "let x = 1;");
        assert_eq!(buf.len(), 10);
        assert!(!buf.is_empty());
    }

    #[test]
    fn test_empty_buffer() {
        let buf = SourceBuffer::new("empty.js", "");

        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
        assert_eq!(buf.position_at(0).line, 1);
    }

    #[test]
    fn test_char_at_offsets() {
        let buf = SourceBuffer::new("t.js", "ab");

        assert_eq!(buf.char_at(0), Some('a'));
        assert_eq!(buf.char_at(1), Some('b'));
        assert_eq!(buf.char_at(2), None);
    }

    #[test]
    fn test_char_offsets_not_byte_offsets() {
        let buf = SourceBuffer::new("t.js", "\u{00E9}x");

        assert_eq!(buf.len(), 2);
        assert_eq!(buf.char_at(1), Some('x'));
    }

    #[test]
    fn test_slice_by_span() {
        let buf = SourceBuffer::new("t.js", "let abc = 1;");

        assert_eq!(buf.slice(Span::new(4, 7)), "abc");
        assert_eq!(buf.slice(Span::new(0, 3)), "let");
    }

    #[test]
    fn test_position_at_first_line() {
        let buf = SourceBuffer::new("t.js", "let x = 1;");
        let pos = buf.position_at(6);

        assert_eq!(pos.line, 1);
        assert_eq!(pos.column, 6);
        assert_eq!(pos.offset, 6);
    }

    #[test]
    fn test_position_at_counts_lf() {
        let buf = SourceBuffer::new("t.js", "a\nbb\nccc");

        assert_eq!(buf.position_at(2).line, 2);
        assert_eq!(buf.position_at(2).column, 0);
        assert_eq!(buf.position_at(7).line, 3);
        assert_eq!(buf.position_at(7).column, 2);
    }

    #[test]
    fn test_position_at_crlf_counts_once() {
        let buf = SourceBuffer::new("t.js", "a\r\nb\rc");

        assert_eq!(buf.position_at(3).line, 2);
        assert_eq!(buf.position_at(3).column, 0);
        assert_eq!(buf.position_at(5).line, 3);
    }

    #[test]
    fn test_position_at_unicode_line_separators() {
        let buf = SourceBuffer::new("t.js", "a\u{2028}b\u{2029}c");

        assert_eq!(buf.position_at(2).line, 2);
        assert_eq!(buf.position_at(4).line, 3);
        assert_eq!(buf.position_at(4).column, 0);
    }

    #[test]
    fn test_position_at_clamps_past_end() {
        let buf = SourceBuffer::new("t.js", "ab");
        let pos = buf.position_at(99);

        assert_eq!(pos.offset, 2);
        assert_eq!(pos.column, 2);
    }
}

#[cfg(test)]
mod classification_tests {
    use super::*;

    #[test]
    fn test_line_terminators() {
        assert!(is_line_terminator('\n'));
        assert!(is_line_terminator('\r'));
        assert!(is_line_terminator('\u{2028}'));
        assert!(is_line_terminator('\u{2029}'));
        assert!(!is_line_terminator(' '));
    }

    #[test]
    fn test_whitespace_excludes_terminators() {
        assert!(is_whitespace(' '));
        assert!(is_whitespace('\t'));
        assert!(is_whitespace('\u{000B}'));
        assert!(is_whitespace('\u{00A0}'));
        assert!(is_whitespace('\u{FEFF}'));
        assert!(!is_whitespace('\n'));
        assert!(!is_whitespace('\u{2028}'));
    }

    #[test]
    fn test_identifier_start() {
        assert!(is_id_start('a'));
        assert!(is_id_start('Z'));
        assert!(is_id_start('$'));
        assert!(is_id_start('_'));
        assert!(is_id_start('\u{00E9}'));
        assert!(!is_id_start('1'));
        assert!(!is_id_start('#'));
    }

    #[test]
    fn test_identifier_continue() {
        assert!(is_id_continue('a'));
        assert!(is_id_continue('9'));
        assert!(is_id_continue('$'));
        assert!(is_id_continue('\u{200C}'));
        assert!(is_id_continue('\u{200D}'));
        assert!(!is_id_continue('-'));
    }
}
