//! ECMAScript parser component.
//!
//! Provides the lexer, feature registry, recursive descent parser and
//! scope/binding tracker for one source unit. A parse yields either a
//! complete syntax tree or exactly one positioned diagnostic.
//!
//! # Overview
//!
//! - [`Lexer`] - On-demand tokenizer with lookahead and re-lex entry points
//! - [`Token`] - Token values including identifiers, literals, keywords
//! - [`Features`] - Immutable optional-syntax feature registry
//! - [`Parser`] - Recursive descent parser producing the AST
//! - [`ast`] - Syntax tree node types with span accessors
//! - [`ScopeTracker`] - Declaration, private-name and export validation
//!
//! # Example
//!
//! ```
//! use parser::{parse_source, Features};
//!
//! let program = parse_source("example.js", "let x = 42;", Features::default()).unwrap();
//! assert_eq!(program.body.len(), 1);
//!
//! let error = parse_source("example.js", "let x; let x;", Features::default()).unwrap_err();
//! assert_eq!(
//!     error.to_string(),
//!     "Identifier `x` has already been declared at (1:11)"
//! );
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod error;
pub mod features;
pub mod lexer;
pub mod parser;
pub mod scope;

pub use ast::{Expression, Program, Statement};
pub use features::Features;
pub use lexer::{Keyword, Lexer, Punctuator, Token, TokenValue};
pub use parser::{parse_source, Parser};
pub use scope::{ScopeKind, ScopeTracker};
