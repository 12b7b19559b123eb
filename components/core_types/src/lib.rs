//! Core source-buffer and diagnostic types.
//!
//! This crate provides the foundational types shared by the lexer, parser
//! and scope tracker: the immutable source buffer with positional queries,
//! span/position values, and the single-error diagnostic type.
//!
//! # Overview
//!
//! - [`SourceBuffer`] - Immutable source text with line/column queries
//! - [`SourcePosition`] / [`Span`] - Locations carried by tokens, tree
//!   nodes and diagnostics
//! - [`JsError`] / [`ErrorKind`] - The one diagnostic a failed parse yields
//!
//! # Examples
//!
//! ```
//! use core_types::{SourceBuffer, Span};
//!
//! let buf = SourceBuffer::new("example.js", "let x = 1;\nlet y = 2;");
//! let pos = buf.position_at(11);
//! assert_eq!((pos.line, pos.column), (2, 0));
//! assert_eq!(buf.slice(Span::new(4, 5)), "x");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod source;

pub use error::{ErrorKind, JsError};
pub use source::{
    is_id_continue, is_id_start, is_line_terminator, is_whitespace, SourceBuffer, SourcePosition,
    Span,
};
