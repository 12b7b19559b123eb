//! Recursive descent parser.
//!
//! The grammar is parsed by recursive descent with explicit precedence
//! climbing for binary operators. Context that changes how a token may be
//! read (function kind, strict mode, `in` legality, label sets) lives as
//! plain fields on [`Parser`] and is saved and restored around the
//! constructs that scope it. Ambiguous punctuation is resolved by asking
//! the lexer to re-lex under the appropriate grammar, and the
//! parenthesized-or-arrow cover grammar is resolved by reinterpreting the
//! parsed expression once the `=>` token is (or is not) seen.
//!
//! Any violated contract raises one positioned [`JsError`] and parsing
//! halts; there is no recovery mode.

use core_types::{JsError, SourceBuffer, Span};

use crate::ast::*;
use crate::error::{semantic_error, syntax_error, unexpected_token};
use crate::features::Features;
use crate::lexer::{Keyword, Lexer, Punctuator, Token, TokenValue};
use crate::scope::{FunctionKind, PrivateMemberKind, ScopeKind, ScopeTracker};

/// Parse one source unit under the given feature set.
///
/// Convenience wrapper owning the source buffer for the duration of the
/// parse; `name` only shows up in tooling, never in diagnostics.
pub fn parse_source(name: &str, text: &str, features: Features) -> Result<Program, JsError> {
    let buffer = SourceBuffer::new(name, text);
    Parser::with_features(&buffer, features).parse()
}

/// Identifiers reserved in strict mode code.
const STRICT_RESERVED: &[&str] = &[
    "implements",
    "interface",
    "package",
    "private",
    "protected",
    "public",
];

/// Where a statement is being parsed; declarations are not legal
/// everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatementContext {
    /// Program top level (module declarations legal)
    Top,
    /// Inside a block, function body or switch case
    Block,
    /// The single-statement body of `if`, a loop or a label
    Embedded,
}

/// Saved parser context captured when entering a function-like construct.
struct FunctionContext {
    strict: bool,
    in_generator: bool,
    in_async: bool,
    in_parameters: bool,
    in_constructor: bool,
    in_method: bool,
    in_static_block: bool,
    has_class_heritage: bool,
    no_in: bool,
    function_depth: usize,
    loop_depth: usize,
    switch_depth: usize,
    labels: Vec<(String, bool)>,
}

/// One item of the parenthesized-or-arrow cover grammar.
enum CoverItem {
    /// Ordinary expression; may later become a parameter pattern
    Expression(Expression),
    /// `...expr`; a rest parameter or a spread argument
    Rest(Expression, Span),
}

/// Parsed formal parameter list.
struct ParamList {
    params: Vec<Pattern>,
    /// Every parameter is a plain identifier
    simple: bool,
    /// Bound names in declaration order
    names: Vec<(String, Span)>,
}

/// The grammar parser.
///
/// Pulls tokens from the lexer on demand, consults the feature registry
/// for optional-syntax gating and the scope tracker for declaration and
/// private-name legality, and builds the syntax tree bottom-up.
pub struct Parser<'a> {
    source: &'a SourceBuffer,
    lexer: Lexer<'a>,
    features: Features,
    scopes: ScopeTracker,
    /// Current strict-mode state, mirrored into the lexer
    strict: bool,
    in_generator: bool,
    in_async: bool,
    /// Parsing a formal parameter list (default values included)
    in_parameters: bool,
    in_constructor: bool,
    /// Inside a method body or a class field initializer (`super.x` legal)
    in_method: bool,
    in_static_block: bool,
    has_class_heritage: bool,
    /// Parsing the items of a parenthesized cover; defers the shorthand
    /// initializer check to the cover's resolution
    in_cover_params: bool,
    /// `in` is not a relational operator here (for-statement heads)
    no_in: bool,
    function_depth: usize,
    loop_depth: usize,
    switch_depth: usize,
    /// Active labels, innermost last; the flag marks iteration labels
    labels: Vec<(String, bool)>,
    /// Offset of a `{ x = 1 }` shorthand initializer awaiting a
    /// destructuring context
    cover_initializer: Option<usize>,
    last_yield_span: Option<Span>,
    last_await_span: Option<Span>,
    /// End offset of the most recently consumed token
    last_end: usize,
}

impl<'a> Parser<'a> {
    /// Create a parser over a source buffer with default features.
    pub fn new(source: &'a SourceBuffer) -> Self {
        Self::with_features(source, Features::default())
    }

    /// Create a parser over a source buffer with an explicit feature set.
    pub fn with_features(source: &'a SourceBuffer, features: Features) -> Self {
        Self {
            source,
            lexer: Lexer::new(source, features),
            features,
            scopes: ScopeTracker::new(),
            strict: features.contains(Features::STRICT),
            in_generator: false,
            in_async: false,
            in_parameters: false,
            in_constructor: false,
            in_method: false,
            in_static_block: false,
            has_class_heritage: false,
            in_cover_params: false,
            no_in: false,
            function_depth: 0,
            loop_depth: 0,
            switch_depth: 0,
            labels: Vec::new(),
            cover_initializer: None,
            last_yield_span: None,
            last_await_span: None,
            last_end: 0,
        }
    }

    /// Parse the whole source unit into a program tree.
    ///
    /// Returns either a complete tree covering the full input or the
    /// first diagnostic encountered, never both.
    pub fn parse(&mut self) -> Result<Program, JsError> {
        let mut body = Vec::new();
        self.parse_directive_prologue(&mut body)?;
        while !self.at_end()? {
            body.push(self.parse_statement(StatementContext::Top)?);
        }
        self.scopes.finish(self.source)?;
        Ok(Program {
            source_name: self.source.name().to_string(),
            body,
            span: Span::new(0, self.source.len()),
        })
    }

    // ----- directive prologue -----------------------------------------

    /// Parse the run of leading string-literal expression statements.
    /// Returns the span of a `"use strict"` directive if one was seen;
    /// strict mode is flipped as soon as the directive is recognized.
    fn parse_directive_prologue(
        &mut self,
        body: &mut Vec<Statement>,
    ) -> Result<Option<Span>, JsError> {
        let mut use_strict = None;
        loop {
            if !matches!(self.peek()?.value, TokenValue::String { .. }) {
                break;
            }
            let start = self.peek()?.span.start;
            let expr = self.parse_expression()?;
            let directive_raw = match &expr {
                Expression::Literal {
                    value: Literal::String { raw, .. },
                    ..
                } => Some(raw.clone()),
                _ => None,
            };
            self.consume_semicolon()?;
            let span = self.finish_span(start);
            body.push(Statement::ExpressionStatement {
                expression: expr,
                span,
            });
            match directive_raw {
                Some(raw) => {
                    // The directive compares raw text, so escaped forms
                    // like "use\x20strict" do not count
                    if raw.len() >= 2 && &raw[1..raw.len() - 1] == "use strict" {
                        if use_strict.is_none() {
                            use_strict = Some(span);
                        }
                        self.set_strict(true);
                        self.lexer.rescan_lookahead();
                    }
                }
                None => break,
            }
        }
        Ok(use_strict)
    }

    // ----- statements -------------------------------------------------

    fn parse_statement(&mut self, context: StatementContext) -> Result<Statement, JsError> {
        let token = self.peek()?.clone();
        match token.value {
            TokenValue::Keyword(Keyword::Let) => {
                if self.strict || self.is_let_declaration()? {
                    self.require_declaration_context(context, &token)?;
                    self.parse_variable_statement()
                } else if self.starts_labeled_statement()? {
                    self.parse_labeled_statement()
                } else {
                    self.parse_expression_statement()
                }
            }
            TokenValue::Keyword(Keyword::Const) => {
                self.require_declaration_context(context, &token)?;
                self.parse_variable_statement()
            }
            TokenValue::Keyword(Keyword::Var) => self.parse_variable_statement(),
            TokenValue::Keyword(Keyword::Function) => {
                if context == StatementContext::Embedded && self.strict {
                    return Err(syntax_error(
                        self.source,
                        token.span.start,
                        "In strict mode code, functions can only be declared at top level or inside a block",
                    ));
                }
                self.parse_function_declaration(false, token.span.start, false)
            }
            TokenValue::Keyword(Keyword::Async) => {
                let state = self.lexer.snapshot();
                self.lexer.next_token()?;
                let follows_function = self.lexer.peek_token()?.is_keyword(Keyword::Function)
                    && !self.lexer.peek_token()?.newline_before;
                self.lexer.restore(state);
                if follows_function {
                    if context == StatementContext::Embedded && self.strict {
                        return Err(syntax_error(
                            self.source,
                            token.span.start,
                            "In strict mode code, functions can only be declared at top level or inside a block",
                        ));
                    }
                    self.next()?; // async
                    self.parse_function_declaration(true, token.span.start, false)
                } else if self.starts_labeled_statement()? {
                    self.parse_labeled_statement()
                } else {
                    self.parse_expression_statement()
                }
            }
            TokenValue::Keyword(Keyword::Class) => {
                self.require_declaration_context(context, &token)?;
                let class = self.parse_class(token.span.start, true, false)?;
                Ok(Statement::ClassDeclaration(class))
            }
            TokenValue::Keyword(Keyword::If) => self.parse_if_statement(),
            TokenValue::Keyword(Keyword::While) => self.parse_while_statement(),
            TokenValue::Keyword(Keyword::Do) => self.parse_do_while_statement(),
            TokenValue::Keyword(Keyword::For) => self.parse_for_statement(),
            TokenValue::Keyword(Keyword::Switch) => self.parse_switch_statement(),
            TokenValue::Keyword(Keyword::Return) => self.parse_return_statement(),
            TokenValue::Keyword(Keyword::Break) => self.parse_break_statement(),
            TokenValue::Keyword(Keyword::Continue) => self.parse_continue_statement(),
            TokenValue::Keyword(Keyword::Throw) => self.parse_throw_statement(),
            TokenValue::Keyword(Keyword::Try) => self.parse_try_statement(),
            TokenValue::Keyword(Keyword::With) => self.parse_with_statement(),
            TokenValue::Keyword(Keyword::Debugger) => {
                self.next()?;
                self.consume_semicolon()?;
                Ok(Statement::Debugger {
                    span: self.finish_span(token.span.start),
                })
            }
            TokenValue::Keyword(Keyword::Import) => {
                let state = self.lexer.snapshot();
                self.lexer.next_token()?;
                let is_expression = self.lexer.peek_token()?.is_punctuator(Punctuator::LParen)
                    || self.lexer.peek_token()?.is_punctuator(Punctuator::Dot);
                self.lexer.restore(state);
                if is_expression {
                    self.parse_expression_statement()
                } else if context == StatementContext::Top {
                    self.parse_import_declaration()
                } else {
                    Err(syntax_error(
                        self.source,
                        token.span.start,
                        "`import` and `export` may only appear at the top level",
                    ))
                }
            }
            TokenValue::Keyword(Keyword::Export) => {
                if context == StatementContext::Top {
                    self.parse_export_declaration()
                } else {
                    Err(syntax_error(
                        self.source,
                        token.span.start,
                        "`import` and `export` may only appear at the top level",
                    ))
                }
            }
            TokenValue::Punctuator(Punctuator::LBrace) => self.parse_block_statement(),
            TokenValue::Punctuator(Punctuator::Semicolon) => {
                self.next()?;
                Ok(Statement::Empty { span: token.span })
            }
            TokenValue::Identifier { .. }
            | TokenValue::Keyword(Keyword::Static)
            | TokenValue::Keyword(Keyword::Yield)
            | TokenValue::Keyword(Keyword::Await) => {
                if self.starts_labeled_statement()? {
                    self.parse_labeled_statement()
                } else {
                    self.parse_expression_statement()
                }
            }
            _ => self.parse_expression_statement(),
        }
    }

    /// Reject declarations in single-statement positions.
    fn require_declaration_context(
        &self,
        context: StatementContext,
        token: &Token,
    ) -> Result<(), JsError> {
        if context == StatementContext::Embedded {
            return Err(syntax_error(
                self.source,
                token.span.start,
                "Lexical declaration cannot appear in a single-statement context",
            ));
        }
        Ok(())
    }

    /// In sloppy mode `let` only starts a declaration when followed by an
    /// identifier, `[` or `{`.
    fn is_let_declaration(&mut self) -> Result<bool, JsError> {
        let state = self.lexer.snapshot();
        self.lexer.next_token()?;
        let next = self.lexer.peek_token()?;
        let is_declaration = match &next.value {
            TokenValue::Identifier { .. } => true,
            TokenValue::Punctuator(Punctuator::LBracket)
            | TokenValue::Punctuator(Punctuator::LBrace) => true,
            TokenValue::Keyword(k) => matches!(
                k,
                Keyword::Let | Keyword::Static | Keyword::Async | Keyword::Yield | Keyword::Await
            ),
            _ => false,
        };
        self.lexer.restore(state);
        Ok(is_declaration)
    }

    /// An identifier token directly followed by `:` starts a labeled
    /// statement.
    fn starts_labeled_statement(&mut self) -> Result<bool, JsError> {
        let token = self.peek()?.clone();
        if self.identifier_like_name(&token).is_none() {
            return Ok(false);
        }
        let state = self.lexer.snapshot();
        self.lexer.next_token()?;
        let labeled = self.lexer.peek_token()?.is_punctuator(Punctuator::Colon);
        self.lexer.restore(state);
        Ok(labeled)
    }

    fn parse_labeled_statement(&mut self) -> Result<Statement, JsError> {
        let mut batch: Vec<Identifier> = Vec::new();
        // Collect the whole `a: b: ...` label chain up front so that
        // `continue a` works for a multi-labeled loop
        loop {
            if !self.starts_labeled_statement()? {
                break;
            }
            let token = self.next()?;
            let name = match self.identifier_like_name(&token) {
                Some(name) => name,
                None => return Err(unexpected_token(self.source, &token)),
            };
            if self.labels.iter().any(|(n, _)| *n == name)
                || batch.iter().any(|id| id.name == name)
            {
                return Err(semantic_error(
                    self.source,
                    token.span.start,
                    format!("Label `{}` has already been declared", name),
                ));
            }
            batch.push(Identifier::new(name, token.span));
            self.expect_punctuator(Punctuator::Colon)?;
        }
        let is_iteration = matches!(
            self.peek()?.value,
            TokenValue::Keyword(Keyword::For)
                | TokenValue::Keyword(Keyword::While)
                | TokenValue::Keyword(Keyword::Do)
        );
        for label in &batch {
            self.labels.push((label.name.clone(), is_iteration));
        }
        let body = self.parse_statement(StatementContext::Embedded);
        self.labels.truncate(self.labels.len() - batch.len());
        // Innermost label carries the body; outer labels nest around it
        let mut statement = body?;
        for label in batch.into_iter().rev() {
            let span = Span::new(label.span.start, statement.span().end);
            statement = Statement::Labeled {
                label,
                body: Box::new(statement),
                span,
            };
        }
        Ok(statement)
    }

    fn parse_block_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.start_offset()?;
        self.expect_punctuator(Punctuator::LBrace)?;
        self.scopes.enter(ScopeKind::Block);
        let body = self.parse_statement_list_until_brace();
        self.scopes.exit(self.source)?;
        let body = body?;
        self.expect_punctuator(Punctuator::RBrace)?;
        Ok(Statement::Block {
            body,
            span: self.finish_span(start),
        })
    }

    fn parse_statement_list_until_brace(&mut self) -> Result<Vec<Statement>, JsError> {
        let mut body = Vec::new();
        while !self.check_punctuator(Punctuator::RBrace)? {
            if self.at_end()? {
                return self.fail();
            }
            body.push(self.parse_statement(StatementContext::Block)?);
        }
        Ok(body)
    }

    fn parse_variable_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.start_offset()?;
        let (kind, declarations) = self.parse_variable_declaration_list()?;
        self.consume_semicolon()?;
        Ok(Statement::VariableDeclaration {
            kind,
            declarations,
            span: self.finish_span(start),
        })
    }

    /// Parse `var`/`let`/`const` declarators up to but excluding the
    /// statement terminator, declaring every bound name.
    fn parse_variable_declaration_list(
        &mut self,
    ) -> Result<(VariableKind, Vec<VariableDeclarator>), JsError> {
        let kind_token = self.next()?;
        let kind = match kind_token.value {
            TokenValue::Keyword(Keyword::Var) => VariableKind::Var,
            TokenValue::Keyword(Keyword::Let) => VariableKind::Let,
            TokenValue::Keyword(Keyword::Const) => VariableKind::Const,
            _ => return Err(unexpected_token(self.source, &kind_token)),
        };
        let mut declarations = Vec::new();
        loop {
            let declarator = self.parse_variable_declarator(kind, false)?;
            declarations.push(declarator);
            if !self.eat_punctuator(Punctuator::Comma)? {
                break;
            }
        }
        Ok((kind, declarations))
    }

    /// One declarator. `in_for_head` suppresses the missing-initializer
    /// checks, which do not apply to for-in/for-of targets.
    fn parse_variable_declarator(
        &mut self,
        kind: VariableKind,
        in_for_head: bool,
    ) -> Result<VariableDeclarator, JsError> {
        let start = self.start_offset()?;
        let binding_kind = match kind {
            VariableKind::Var => BindingKind::Var,
            VariableKind::Let => BindingKind::Let,
            VariableKind::Const => BindingKind::Const,
        };
        let mut pattern = self.parse_binding_pattern(binding_kind)?;
        self.declare_pattern(&pattern, binding_kind, kind != VariableKind::Var)?;
        if self.features.contains(Features::TYPE_ANNOTATIONS)
            && matches!(pattern, Pattern::Identifier { .. })
            && self.eat_punctuator(Punctuator::Colon)?
        {
            let annotation = self.parse_type_annotation()?;
            if let Pattern::Identifier {
                annotation: slot,
                span,
                ..
            } = &mut pattern
            {
                span.end = annotation.span.end;
                *slot = Some(annotation);
            }
        }
        let init = if self.eat_punctuator(Punctuator::Assign)? {
            Some(self.parse_assignment()?)
        } else {
            None
        };
        if init.is_none() && !in_for_head {
            if kind == VariableKind::Const {
                return Err(syntax_error(
                    self.source,
                    start,
                    "Missing initializer in const declaration",
                ));
            }
            if !matches!(pattern, Pattern::Identifier { .. }) {
                return Err(syntax_error(
                    self.source,
                    start,
                    "Missing initializer in destructuring declaration",
                ));
            }
        }
        Ok(VariableDeclarator {
            id: pattern,
            init,
            span: self.finish_span(start),
        })
    }

    /// Declare every name bound by `pattern`. `lexical` additionally
    /// rejects `let` as a bound name.
    fn declare_pattern(
        &mut self,
        pattern: &Pattern,
        kind: BindingKind,
        lexical: bool,
    ) -> Result<(), JsError> {
        let mut names = Vec::new();
        collect_pattern_names(pattern, &mut names);
        for (name, span) in names {
            if lexical && name == "let" {
                return Err(semantic_error(
                    self.source,
                    span.start,
                    "`let` is disallowed as a lexically bound name",
                ));
            }
            self.scopes
                .declare(self.source, &name, kind, span, self.strict)?;
        }
        Ok(())
    }

    fn parse_if_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.start_offset()?;
        self.expect_keyword(Keyword::If)?;
        self.expect_punctuator(Punctuator::LParen)?;
        let test = self.parse_expression()?;
        self.expect_punctuator(Punctuator::RParen)?;
        let consequent = Box::new(self.parse_statement(StatementContext::Embedded)?);
        let alternate = if self.eat_keyword(Keyword::Else)? {
            Some(Box::new(self.parse_statement(StatementContext::Embedded)?))
        } else {
            None
        };
        Ok(Statement::If {
            test,
            consequent,
            alternate,
            span: self.finish_span(start),
        })
    }

    fn parse_while_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.start_offset()?;
        self.expect_keyword(Keyword::While)?;
        self.expect_punctuator(Punctuator::LParen)?;
        let test = self.parse_expression()?;
        self.expect_punctuator(Punctuator::RParen)?;
        self.loop_depth += 1;
        let body = self.parse_statement(StatementContext::Embedded);
        self.loop_depth -= 1;
        Ok(Statement::While {
            test,
            body: Box::new(body?),
            span: self.finish_span(start),
        })
    }

    fn parse_do_while_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.start_offset()?;
        self.expect_keyword(Keyword::Do)?;
        self.loop_depth += 1;
        let body = self.parse_statement(StatementContext::Embedded);
        self.loop_depth -= 1;
        let body = body?;
        self.expect_keyword(Keyword::While)?;
        self.expect_punctuator(Punctuator::LParen)?;
        let test = self.parse_expression()?;
        self.expect_punctuator(Punctuator::RParen)?;
        // A semicolon is always inserted after `do ... while (...)`
        self.eat_punctuator(Punctuator::Semicolon)?;
        Ok(Statement::DoWhile {
            body: Box::new(body),
            test,
            span: self.finish_span(start),
        })
    }

    fn parse_with_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.start_offset()?;
        let with_token = self.expect_keyword(Keyword::With)?;
        if self.strict {
            return Err(semantic_error(
                self.source,
                with_token.span.start,
                "`with` statements are not allowed in strict mode",
            ));
        }
        self.expect_punctuator(Punctuator::LParen)?;
        let object = self.parse_expression()?;
        self.expect_punctuator(Punctuator::RParen)?;
        self.scopes.enter(ScopeKind::With);
        let body = self.parse_statement(StatementContext::Embedded);
        self.scopes.exit(self.source)?;
        Ok(Statement::With {
            object,
            body: Box::new(body?),
            span: self.finish_span(start),
        })
    }

    fn parse_return_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.start_offset()?;
        let return_token = self.expect_keyword(Keyword::Return)?;
        if self.function_depth == 0 {
            return Err(syntax_error(
                self.source,
                return_token.span.start,
                "Illegal return statement",
            ));
        }
        let argument = if self.statement_argument_follows()? {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.consume_semicolon()?;
        Ok(Statement::Return {
            argument,
            span: self.finish_span(start),
        })
    }

    fn parse_throw_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.start_offset()?;
        self.expect_keyword(Keyword::Throw)?;
        if self.peek()?.newline_before {
            let offset = self.peek()?.span.start;
            return Err(syntax_error(self.source, offset, "Illegal newline after throw"));
        }
        let argument = self.parse_expression()?;
        self.consume_semicolon()?;
        Ok(Statement::Throw {
            argument,
            span: self.finish_span(start),
        })
    }

    /// True when a restricted production may still take an argument: the
    /// next token is on the same line and is not a terminator.
    fn statement_argument_follows(&mut self) -> Result<bool, JsError> {
        let token = self.peek()?;
        Ok(!token.newline_before
            && !token.is_eof()
            && !token.is_punctuator(Punctuator::Semicolon)
            && !token.is_punctuator(Punctuator::RBrace))
    }

    fn parse_break_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.start_offset()?;
        let break_token = self.expect_keyword(Keyword::Break)?;
        let label = self.parse_jump_label()?;
        match &label {
            Some(id) => {
                if !self.labels.iter().any(|(n, _)| *n == id.name) {
                    return Err(semantic_error(
                        self.source,
                        id.span.start,
                        format!("Undefined label `{}`", id.name),
                    ));
                }
            }
            None => {
                if self.loop_depth == 0 && self.switch_depth == 0 {
                    return Err(syntax_error(
                        self.source,
                        break_token.span.start,
                        "Illegal break statement",
                    ));
                }
            }
        }
        self.consume_semicolon()?;
        Ok(Statement::Break {
            label,
            span: self.finish_span(start),
        })
    }

    fn parse_continue_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.start_offset()?;
        let continue_token = self.expect_keyword(Keyword::Continue)?;
        let label = self.parse_jump_label()?;
        match &label {
            Some(id) => match self.labels.iter().find(|(n, _)| *n == id.name) {
                Some((_, true)) => {}
                Some((_, false)) => {
                    return Err(semantic_error(
                        self.source,
                        id.span.start,
                        format!("Invalid continue label `{}`", id.name),
                    ));
                }
                None => {
                    return Err(semantic_error(
                        self.source,
                        id.span.start,
                        format!("Undefined label `{}`", id.name),
                    ));
                }
            },
            None => {
                if self.loop_depth == 0 {
                    return Err(syntax_error(
                        self.source,
                        continue_token.span.start,
                        "Illegal continue statement",
                    ));
                }
            }
        }
        self.consume_semicolon()?;
        Ok(Statement::Continue {
            label,
            span: self.finish_span(start),
        })
    }

    /// `break`/`continue` take a label only when it sits on the same line.
    fn parse_jump_label(&mut self) -> Result<Option<Identifier>, JsError> {
        let token = self.peek()?.clone();
        if token.newline_before {
            return Ok(None);
        }
        match self.identifier_like_name(&token) {
            Some(name) => {
                self.next()?;
                Ok(Some(Identifier::new(name, token.span)))
            }
            None => Ok(None),
        }
    }

    fn parse_try_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.start_offset()?;
        self.expect_keyword(Keyword::Try)?;
        let block = self.parse_brace_block()?;
        let handler = if self.check_keyword(Keyword::Catch)? {
            Some(self.parse_catch_clause()?)
        } else {
            None
        };
        let finalizer = if self.eat_keyword(Keyword::Finally)? {
            Some(self.parse_brace_block()?)
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            let offset = self.peek()?.span.start;
            return Err(syntax_error(
                self.source,
                offset,
                "Missing catch or finally after try",
            ));
        }
        Ok(Statement::Try {
            block,
            handler,
            finalizer,
            span: self.finish_span(start),
        })
    }

    fn parse_catch_clause(&mut self) -> Result<CatchClause, JsError> {
        let start = self.start_offset()?;
        self.expect_keyword(Keyword::Catch)?;
        self.scopes.enter(ScopeKind::Catch);
        let result = self.parse_catch_clause_inner(start);
        self.scopes.exit(self.source)?;
        result
    }

    fn parse_catch_clause_inner(&mut self, start: usize) -> Result<CatchClause, JsError> {
        let param = if self.eat_punctuator(Punctuator::LParen)? {
            let pattern = self.parse_binding_pattern(BindingKind::CatchParam)?;
            self.declare_pattern(&pattern, BindingKind::CatchParam, true)?;
            self.expect_punctuator(Punctuator::RParen)?;
            Some(pattern)
        } else {
            None
        };
        // The handler body shares the catch frame so that redeclaring the
        // parameter with `let` conflicts
        self.expect_punctuator(Punctuator::LBrace)?;
        let body = self.parse_statement_list_until_brace()?;
        self.expect_punctuator(Punctuator::RBrace)?;
        Ok(CatchClause {
            param,
            body,
            span: self.finish_span(start),
        })
    }

    /// A `{ ... }` statement list in its own block scope, returned as a
    /// plain vector (try blocks, finally blocks, function bodies reuse
    /// their own scope handling instead).
    fn parse_brace_block(&mut self) -> Result<Vec<Statement>, JsError> {
        self.expect_punctuator(Punctuator::LBrace)?;
        self.scopes.enter(ScopeKind::Block);
        let body = self.parse_statement_list_until_brace();
        self.scopes.exit(self.source)?;
        let body = body?;
        self.expect_punctuator(Punctuator::RBrace)?;
        Ok(body)
    }

    fn parse_switch_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.start_offset()?;
        self.expect_keyword(Keyword::Switch)?;
        self.expect_punctuator(Punctuator::LParen)?;
        let discriminant = self.parse_expression()?;
        self.expect_punctuator(Punctuator::RParen)?;
        self.expect_punctuator(Punctuator::LBrace)?;
        self.scopes.enter(ScopeKind::Block);
        self.switch_depth += 1;
        let cases = self.parse_switch_cases();
        self.switch_depth -= 1;
        self.scopes.exit(self.source)?;
        let cases = cases?;
        self.expect_punctuator(Punctuator::RBrace)?;
        Ok(Statement::Switch {
            discriminant,
            cases,
            span: self.finish_span(start),
        })
    }

    fn parse_switch_cases(&mut self) -> Result<Vec<SwitchCase>, JsError> {
        let mut cases = Vec::new();
        let mut seen_default = false;
        while !self.check_punctuator(Punctuator::RBrace)? {
            let case_start = self.start_offset()?;
            let test = if self.eat_keyword(Keyword::Case)? {
                Some(self.parse_expression()?)
            } else {
                let default_token = self.expect_keyword(Keyword::Default)?;
                if seen_default {
                    return Err(syntax_error(
                        self.source,
                        default_token.span.start,
                        "More than one default clause in switch statement",
                    ));
                }
                seen_default = true;
                None
            };
            self.expect_punctuator(Punctuator::Colon)?;
            let mut consequent = Vec::new();
            while !self.check_punctuator(Punctuator::RBrace)?
                && !self.check_keyword(Keyword::Case)?
                && !self.check_keyword(Keyword::Default)?
            {
                consequent.push(self.parse_statement(StatementContext::Block)?);
            }
            cases.push(SwitchCase {
                test,
                consequent,
                span: self.finish_span(case_start),
            });
        }
        Ok(cases)
    }

    fn parse_expression_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.start_offset()?;
        let expression = self.parse_expression()?;
        self.consume_semicolon()?;
        Ok(Statement::ExpressionStatement {
            expression,
            span: self.finish_span(start),
        })
    }

    // ----- for statements ---------------------------------------------

    /// `for`, `for-in`, `for-of` and `for await-of` share one production,
    /// distinguished by lookahead once the head's first part is parsed.
    fn parse_for_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.start_offset()?;
        self.expect_keyword(Keyword::For)?;
        let is_await = if self.check_keyword(Keyword::Await)? {
            let await_token = self.next()?;
            if !self.can_await() {
                return Err(semantic_error(
                    self.source,
                    await_token.span.start,
                    "`for await` is only valid in async functions",
                ));
            }
            true
        } else {
            false
        };
        self.expect_punctuator(Punctuator::LParen)?;

        // Empty initializer: plain C-style loop
        if !is_await && self.check_punctuator(Punctuator::Semicolon)? {
            self.next()?;
            return self.parse_for_rest(start, None);
        }

        let is_declaration = self.check_keyword(Keyword::Var)?
            || self.check_keyword(Keyword::Const)?
            || (self.check_keyword(Keyword::Let)? && (self.strict || self.is_let_declaration()?));

        if is_declaration {
            self.scopes.enter(ScopeKind::Block);
            let result = self.parse_for_declaration(start, is_await);
            self.scopes.exit(self.source)?;
            return result;
        }

        // Expression head; `in` must not bind while it may yet be the
        // for-in keyword
        self.no_in = true;
        let head = self.parse_expression();
        self.no_in = false;
        let head = head?;

        if self.check_keyword(Keyword::In)? {
            if is_await {
                return self.fail();
            }
            self.next()?;
            let left = match self.expression_to_pattern(head, false) {
                Ok(pattern) => ForTarget::Assignment(pattern),
                Err(Some(error)) => return Err(error),
                Err(None) => {
                    return Err(syntax_error(
                        self.source,
                        start,
                        "Invalid left-hand side in for-in loop",
                    ));
                }
            };
            let right = self.parse_expression()?;
            self.expect_punctuator(Punctuator::RParen)?;
            let body = self.parse_loop_body()?;
            return Ok(Statement::ForIn {
                left,
                right,
                body: Box::new(body),
                span: self.finish_span(start),
            });
        }
        if self.check_identifier("of")? {
            self.next()?;
            let left = match self.expression_to_pattern(head, false) {
                Ok(pattern) => ForTarget::Assignment(pattern),
                Err(Some(error)) => return Err(error),
                Err(None) => {
                    return Err(syntax_error(
                        self.source,
                        start,
                        "Invalid left-hand side in for-of loop",
                    ));
                }
            };
            let right = self.parse_assignment()?;
            self.expect_punctuator(Punctuator::RParen)?;
            let body = self.parse_loop_body()?;
            return Ok(Statement::ForOf {
                left,
                right,
                body: Box::new(body),
                r#await: is_await,
                span: self.finish_span(start),
            });
        }
        if is_await {
            return self.fail();
        }
        self.expect_punctuator(Punctuator::Semicolon)?;
        self.parse_for_rest(start, Some(ForInit::Expression(head)))
    }

    /// A for head starting with `var`/`let`/`const`; the declaration's
    /// block scope is already entered.
    fn parse_for_declaration(&mut self, start: usize, is_await: bool) -> Result<Statement, JsError> {
        let decl_start = self.start_offset()?;
        let kind_token = self.next()?;
        let kind = match kind_token.value {
            TokenValue::Keyword(Keyword::Var) => VariableKind::Var,
            TokenValue::Keyword(Keyword::Let) => VariableKind::Let,
            TokenValue::Keyword(Keyword::Const) => VariableKind::Const,
            _ => return Err(unexpected_token(self.source, &kind_token)),
        };
        let binding_kind = match kind {
            VariableKind::Var => BindingKind::Var,
            VariableKind::Let => BindingKind::Let,
            VariableKind::Const => BindingKind::Const,
        };
        let pattern = self.parse_binding_pattern(binding_kind)?;

        if self.check_keyword(Keyword::In)? || self.check_identifier("of")? {
            self.declare_pattern(&pattern, binding_kind, kind != VariableKind::Var)?;
            let target = ForTarget::Declaration {
                kind,
                span: Span::new(decl_start, pattern.span().end),
                pattern,
            };
            if self.eat_keyword(Keyword::In)? {
                if is_await {
                    return self.fail();
                }
                let right = self.parse_expression()?;
                self.expect_punctuator(Punctuator::RParen)?;
                let body = self.parse_loop_body()?;
                return Ok(Statement::ForIn {
                    left: target,
                    right,
                    body: Box::new(body),
                    span: self.finish_span(start),
                });
            }
            self.next()?; // of
            let right = self.parse_assignment()?;
            self.expect_punctuator(Punctuator::RParen)?;
            let body = self.parse_loop_body()?;
            return Ok(Statement::ForOf {
                left: target,
                right,
                body: Box::new(body),
                r#await: is_await,
                span: self.finish_span(start),
            });
        }

        if is_await {
            return self.fail();
        }
        // Classic loop: finish the first declarator, then the rest of the
        // declarator list
        self.declare_pattern(&pattern, binding_kind, kind != VariableKind::Var)?;
        let mut declarations = Vec::new();
        declarations.push(self.finish_for_declarator(kind, decl_start, pattern)?);
        while self.eat_punctuator(Punctuator::Comma)? {
            self.no_in = true;
            let declarator = self.parse_variable_declarator(kind, true);
            self.no_in = false;
            declarations.push(declarator?);
        }
        self.expect_punctuator(Punctuator::Semicolon)?;
        let span = Span::new(decl_start, self.last_end);
        self.parse_for_rest(
            start,
            Some(ForInit::VariableDeclaration {
                kind,
                declarations,
                span,
            }),
        )
    }

    fn finish_for_declarator(
        &mut self,
        kind: VariableKind,
        start: usize,
        pattern: Pattern,
    ) -> Result<VariableDeclarator, JsError> {
        let init = if self.eat_punctuator(Punctuator::Assign)? {
            self.no_in = true;
            let init = self.parse_assignment();
            self.no_in = false;
            Some(init?)
        } else {
            None
        };
        if init.is_none() && kind == VariableKind::Const {
            return Err(syntax_error(
                self.source,
                start,
                "Missing initializer in const declaration",
            ));
        }
        if init.is_none() && !matches!(pattern, Pattern::Identifier { .. }) {
            return Err(syntax_error(
                self.source,
                start,
                "Missing initializer in destructuring declaration",
            ));
        }
        Ok(VariableDeclarator {
            id: pattern,
            init,
            span: self.finish_span(start),
        })
    }

    /// Test, update and body of a classic for loop; the first `;` is
    /// already consumed.
    fn parse_for_rest(&mut self, start: usize, init: Option<ForInit>) -> Result<Statement, JsError> {
        let test = if self.check_punctuator(Punctuator::Semicolon)? {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_punctuator(Punctuator::Semicolon)?;
        let update = if self.check_punctuator(Punctuator::RParen)? {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_punctuator(Punctuator::RParen)?;
        let body = self.parse_loop_body()?;
        Ok(Statement::For {
            init,
            test,
            update,
            body: Box::new(body),
            span: self.finish_span(start),
        })
    }

    fn parse_loop_body(&mut self) -> Result<Statement, JsError> {
        self.loop_depth += 1;
        let body = self.parse_statement(StatementContext::Embedded);
        self.loop_depth -= 1;
        body
    }

    // ----- functions --------------------------------------------------

    /// A function declaration; `function` is the next token. The name is
    /// declared in the enclosing scope.
    fn parse_function_declaration(
        &mut self,
        is_async: bool,
        start: usize,
        allow_anonymous: bool,
    ) -> Result<Statement, JsError> {
        self.expect_keyword(Keyword::Function)?;
        let is_generator = self.eat_punctuator(Punctuator::Star)?;
        let name = if allow_anonymous && self.check_punctuator(Punctuator::LParen)? {
            None
        } else {
            let id = self.parse_binding_identifier(BindingKind::Function)?;
            self.scopes
                .declare(self.source, &id.name, BindingKind::Function, id.span, self.strict)?;
            Some(id)
        };
        let function = self.parse_function_rest(start, name, is_async, is_generator, None)?;
        Ok(Statement::FunctionDeclaration(function))
    }

    /// Saved context for a function-like body. `arrow` keeps the `this`
    /// sensitive flags (`super`, constructor-ness) of the enclosing code.
    fn enter_function_context(
        &mut self,
        is_async: bool,
        is_generator: bool,
        method: Option<MethodKind>,
        arrow: bool,
    ) -> FunctionContext {
        let saved = FunctionContext {
            strict: self.strict,
            in_generator: self.in_generator,
            in_async: self.in_async,
            in_parameters: self.in_parameters,
            in_constructor: self.in_constructor,
            in_method: self.in_method,
            in_static_block: self.in_static_block,
            has_class_heritage: self.has_class_heritage,
            no_in: self.no_in,
            function_depth: self.function_depth,
            loop_depth: self.loop_depth,
            switch_depth: self.switch_depth,
            labels: std::mem::take(&mut self.labels),
        };
        self.in_generator = is_generator;
        self.in_async = is_async;
        self.in_parameters = false;
        self.no_in = false;
        self.function_depth += 1;
        self.loop_depth = 0;
        self.switch_depth = 0;
        if !arrow {
            self.in_method = method.is_some();
            self.in_constructor = method == Some(MethodKind::Constructor);
            self.in_static_block = false;
            if method.is_none() {
                self.has_class_heritage = false;
            }
        }
        saved
    }

    fn restore_function_context(&mut self, saved: FunctionContext) {
        self.set_strict(saved.strict);
        self.in_generator = saved.in_generator;
        self.in_async = saved.in_async;
        self.in_parameters = saved.in_parameters;
        self.in_constructor = saved.in_constructor;
        self.in_method = saved.in_method;
        self.in_static_block = saved.in_static_block;
        self.has_class_heritage = saved.has_class_heritage;
        self.no_in = saved.no_in;
        self.function_depth = saved.function_depth;
        self.loop_depth = saved.loop_depth;
        self.switch_depth = saved.switch_depth;
        self.labels = saved.labels;
    }

    /// Parameters and body of any non-arrow function. The cursor is at
    /// the `(` of the parameter list.
    fn parse_function_rest(
        &mut self,
        start: usize,
        name: Option<Identifier>,
        is_async: bool,
        is_generator: bool,
        method: Option<MethodKind>,
    ) -> Result<Function, JsError> {
        let saved = self.enter_function_context(is_async, is_generator, method, false);
        let kind = function_scope_kind(is_async, is_generator);
        self.scopes.enter(ScopeKind::Function(kind));
        let result = self.parse_function_rest_inner(start, name, is_async, is_generator, method);
        self.scopes.exit(self.source)?;
        self.restore_function_context(saved);
        result
    }

    fn parse_function_rest_inner(
        &mut self,
        start: usize,
        name: Option<Identifier>,
        is_async: bool,
        is_generator: bool,
        method: Option<MethodKind>,
    ) -> Result<Function, JsError> {
        let params = self.parse_params()?;
        match method {
            Some(MethodKind::Get) => {
                if !params.params.is_empty() {
                    return Err(syntax_error(
                        self.source,
                        params.params[0].span().start,
                        "Getter must not have any formal parameters",
                    ));
                }
            }
            Some(MethodKind::Set) => {
                if params.params.len() != 1 {
                    let offset = self.peek()?.span.start;
                    return Err(syntax_error(
                        self.source,
                        offset,
                        "Setter must have exactly one formal parameter",
                    ));
                }
                if matches!(params.params[0], Pattern::Rest { .. }) {
                    return Err(syntax_error(
                        self.source,
                        params.params[0].span().start,
                        "Setter function argument must not be a rest parameter",
                    ));
                }
            }
            _ => {}
        }
        for (pname, pspan) in &params.names {
            self.scopes.declare_param(self.source, pname, *pspan, true)?;
        }
        let return_type = if self.features.contains(Features::TYPE_ANNOTATIONS)
            && self.eat_punctuator(Punctuator::Colon)?
        {
            Some(self.parse_type_annotation()?)
        } else {
            None
        };
        self.expect_punctuator(Punctuator::LBrace)?;
        let mut body = Vec::new();
        let use_strict = self.parse_directive_prologue(&mut body)?;
        if let Some(directive_span) = use_strict {
            if !params.simple {
                return Err(syntax_error(
                    self.source,
                    directive_span.start,
                    "Illegal `use strict` directive in function with non-simple parameter list",
                ));
            }
        }
        self.validate_params(&params, method.is_some())?;
        body.extend(self.parse_statement_list_until_brace()?);
        self.expect_punctuator(Punctuator::RBrace)?;
        Ok(Function {
            name,
            params: params.params,
            body,
            is_async,
            is_generator,
            return_type,
            span: self.finish_span(start),
        })
    }

    /// Parameter name checks that depend on final strictness: duplicates
    /// are only tolerated in sloppy simple lists outside methods, and
    /// strict mode rejects `eval`/`arguments`.
    fn validate_params(&self, params: &ParamList, is_method: bool) -> Result<(), JsError> {
        if self.strict || !params.simple || is_method {
            for (index, (name, span)) in params.names.iter().enumerate() {
                if params.names[..index].iter().any(|(n, _)| n == name) {
                    return Err(semantic_error(
                        self.source,
                        span.start,
                        format!("Identifier `{}` has already been declared", name),
                    ));
                }
            }
        }
        if self.strict {
            for (name, span) in &params.names {
                if name == "eval" || name == "arguments" {
                    return Err(semantic_error(
                        self.source,
                        span.start,
                        format!("Binding `{}` in strict mode", name),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Parse a parenthesized formal parameter list, including `(`/`)`.
    fn parse_params(&mut self) -> Result<ParamList, JsError> {
        self.expect_punctuator(Punctuator::LParen)?;
        let saved_in_parameters = self.in_parameters;
        self.in_parameters = true;
        let result = self.parse_params_inner();
        self.in_parameters = saved_in_parameters;
        result
    }

    fn parse_params_inner(&mut self) -> Result<ParamList, JsError> {
        let mut params = Vec::new();
        let mut simple = true;
        let mut names = Vec::new();
        while !self.check_punctuator(Punctuator::RParen)? {
            if self.check_punctuator(Punctuator::Spread)? {
                let rest_start = self.start_offset()?;
                self.next()?;
                let argument = self.parse_binding_pattern(BindingKind::Param)?;
                collect_pattern_names(&argument, &mut names);
                params.push(Pattern::Rest {
                    argument: Box::new(argument),
                    span: self.finish_span(rest_start),
                });
                simple = false;
                if self.check_punctuator(Punctuator::Comma)? {
                    let offset = self.peek()?.span.start;
                    return Err(syntax_error(
                        self.source,
                        offset,
                        "Rest parameter must be last formal parameter",
                    ));
                }
                break;
            }
            let param = self.parse_param(&mut names)?;
            if !matches!(param, Pattern::Identifier { .. }) {
                simple = false;
            }
            params.push(param);
            if !self.eat_punctuator(Punctuator::Comma)? {
                break;
            }
        }
        self.expect_punctuator(Punctuator::RParen)?;
        Ok(ParamList {
            params,
            simple,
            names,
        })
    }

    /// One formal parameter: pattern, optional type annotation, optional
    /// default value.
    fn parse_param(&mut self, names: &mut Vec<(String, Span)>) -> Result<Pattern, JsError> {
        let start = self.start_offset()?;
        let mut pattern = self.parse_binding_pattern(BindingKind::Param)?;
        if self.features.contains(Features::TYPE_ANNOTATIONS) {
            if let Pattern::Identifier {
                annotation, optional, span, ..
            } = &mut pattern
            {
                if self.lexer.peek_token()?.is_punctuator(Punctuator::Question) {
                    self.next()?;
                    *optional = true;
                    span.end = self.last_end;
                }
                if self.lexer.peek_token()?.is_punctuator(Punctuator::Colon) {
                    self.next()?;
                    let parsed = self.parse_type_annotation()?;
                    span.end = parsed.span.end;
                    *annotation = Some(parsed);
                }
            }
        }
        collect_pattern_names(&pattern, names);
        if self.eat_punctuator(Punctuator::Assign)? {
            let default = self.parse_assignment()?;
            let span = Span::new(start, default.span().end);
            pattern = Pattern::Assignment {
                left: Box::new(pattern),
                right: Box::new(default),
                span,
            };
        }
        Ok(pattern)
    }

    // ----- classes ----------------------------------------------------

    /// A class declaration or expression; `class` is the next token.
    /// Class bodies are always strict.
    fn parse_class(
        &mut self,
        start: usize,
        is_declaration: bool,
        allow_anonymous: bool,
    ) -> Result<Class, JsError> {
        self.expect_keyword(Keyword::Class)?;
        let saved_strict = self.strict;
        self.set_strict(true);
        let result = self.parse_class_inner(start, is_declaration, allow_anonymous);
        self.set_strict(saved_strict);
        result
    }

    fn parse_class_inner(
        &mut self,
        start: usize,
        is_declaration: bool,
        allow_anonymous: bool,
    ) -> Result<Class, JsError> {
        let has_name = !self.check_punctuator(Punctuator::LBrace)?
            && !self.check_keyword(Keyword::Extends)?;
        let name = if has_name {
            let id = self.parse_binding_identifier(BindingKind::Class)?;
            if is_declaration {
                self.scopes
                    .declare(self.source, &id.name, BindingKind::Class, id.span, true)?;
            }
            Some(id)
        } else if is_declaration && !allow_anonymous {
            return self.fail();
        } else {
            None
        };
        let super_class = if self.eat_keyword(Keyword::Extends)? {
            Some(Box::new(self.parse_lhs_expression()?))
        } else {
            None
        };
        let saved_heritage = self.has_class_heritage;
        self.has_class_heritage = super_class.is_some();
        self.scopes.enter(ScopeKind::Class);
        let body = self.parse_class_body();
        self.scopes.exit(self.source)?;
        self.has_class_heritage = saved_heritage;
        Ok(Class {
            name,
            super_class,
            body: body?,
            span: self.finish_span(start),
        })
    }

    fn parse_class_body(&mut self) -> Result<Vec<ClassElement>, JsError> {
        self.expect_punctuator(Punctuator::LBrace)?;
        let mut elements = Vec::new();
        let mut seen_constructor = false;
        while !self.check_punctuator(Punctuator::RBrace)? {
            if self.eat_punctuator(Punctuator::Semicolon)? {
                continue;
            }
            if self.at_end()? {
                return self.fail();
            }
            elements.push(self.parse_class_element(&mut seen_constructor)?);
        }
        self.expect_punctuator(Punctuator::RBrace)?;
        Ok(elements)
    }

    fn parse_class_element(&mut self, seen_constructor: &mut bool) -> Result<ClassElement, JsError> {
        let start = self.start_offset()?;

        let mut is_static = false;
        if self.check_keyword(Keyword::Static)? && !self.next_token_ends_member_name()? {
            self.next()?;
            is_static = true;
        }

        if is_static && self.check_punctuator(Punctuator::LBrace)? {
            return self.parse_static_block(start);
        }

        let mut is_async = false;
        let mut is_generator = false;
        let mut accessor: Option<MethodKind> = None;
        if self.check_keyword(Keyword::Async)? && !self.next_token_ends_member_name()? {
            let state = self.lexer.snapshot();
            self.lexer.next_token()?;
            if self.lexer.peek_token()?.newline_before {
                self.lexer.restore(state);
            } else {
                is_async = true;
                is_generator = self.eat_punctuator(Punctuator::Star)?;
            }
        } else if self.eat_punctuator(Punctuator::Star)? {
            is_generator = true;
        }
        if !is_async && !is_generator {
            for (text, kind) in [("get", MethodKind::Get), ("set", MethodKind::Set)] {
                if self.check_identifier(text)? && !self.next_token_ends_member_name()? {
                    self.next()?;
                    accessor = Some(kind);
                    break;
                }
            }
        }

        let key = self.parse_property_key(true)?;

        if self.check_punctuator(Punctuator::LParen)? {
            return self.parse_class_method(
                start,
                key,
                is_static,
                is_async,
                is_generator,
                accessor,
                seen_constructor,
            );
        }
        if is_async || is_generator || accessor.is_some() {
            return self.fail();
        }
        self.parse_class_field(start, key, is_static)
    }

    /// True if the token after the current one terminates a member name,
    /// meaning the current contextual keyword is itself the name.
    fn next_token_ends_member_name(&mut self) -> Result<bool, JsError> {
        let state = self.lexer.snapshot();
        self.lexer.next_token()?;
        let next = self.lexer.peek_token()?;
        let ends = matches!(
            next.value,
            TokenValue::Punctuator(Punctuator::LParen)
                | TokenValue::Punctuator(Punctuator::Assign)
                | TokenValue::Punctuator(Punctuator::Semicolon)
                | TokenValue::Punctuator(Punctuator::RBrace)
                | TokenValue::Punctuator(Punctuator::Colon)
        );
        self.lexer.restore(state);
        Ok(ends)
    }

    #[allow(clippy::too_many_arguments)]
    fn parse_class_method(
        &mut self,
        start: usize,
        key: PropertyKey,
        is_static: bool,
        is_async: bool,
        is_generator: bool,
        accessor: Option<MethodKind>,
        seen_constructor: &mut bool,
    ) -> Result<ClassElement, JsError> {
        let key_span = key.span();
        let name = key.static_name().map(str::to_string);
        let is_private = matches!(key, PropertyKey::Private { .. });

        if is_private {
            let pname = name.clone().unwrap_or_default();
            if pname == "constructor" {
                return Err(semantic_error(
                    self.source,
                    key_span.start,
                    "Classes may not have an element named `#constructor`",
                ));
            }
            let member_kind = match accessor {
                Some(MethodKind::Get) => PrivateMemberKind::Getter,
                Some(MethodKind::Set) => PrivateMemberKind::Setter,
                _ => PrivateMemberKind::Method,
            };
            self.scopes
                .declare_private(self.source, &pname, member_kind, is_static, key_span)?;
        }

        let is_constructor = !is_static
            && !is_private
            && name.as_deref() == Some("constructor")
            && matches!(key, PropertyKey::Identifier { .. } | PropertyKey::String { .. });
        if is_constructor {
            if accessor.is_some() {
                return Err(semantic_error(
                    self.source,
                    key_span.start,
                    "Class constructor may not be an accessor",
                ));
            }
            if is_generator {
                return Err(semantic_error(
                    self.source,
                    key_span.start,
                    "Class constructor may not be a generator",
                ));
            }
            if is_async {
                return Err(semantic_error(
                    self.source,
                    key_span.start,
                    "Class constructor may not be an async method",
                ));
            }
            if *seen_constructor {
                return Err(semantic_error(
                    self.source,
                    key_span.start,
                    "Duplicate constructor in the same class",
                ));
            }
            *seen_constructor = true;
        }
        if is_static && name.as_deref() == Some("prototype") && !is_private {
            return Err(semantic_error(
                self.source,
                key_span.start,
                "Classes may not have a static property named `prototype`",
            ));
        }

        let kind = if is_constructor {
            MethodKind::Constructor
        } else {
            accessor.unwrap_or(MethodKind::Method)
        };
        let function = self.parse_function_rest(start, None, is_async, is_generator, Some(kind))?;
        Ok(ClassElement::Method {
            key,
            kind,
            is_static,
            function,
            span: self.finish_span(start),
        })
    }

    fn parse_class_field(
        &mut self,
        start: usize,
        key: PropertyKey,
        is_static: bool,
    ) -> Result<ClassElement, JsError> {
        let key_span = key.span();
        let name = key.static_name().map(str::to_string);
        let is_private = matches!(key, PropertyKey::Private { .. });

        if is_private {
            let pname = name.clone().unwrap_or_default();
            if pname == "constructor" {
                return Err(semantic_error(
                    self.source,
                    key_span.start,
                    "Classes may not have an element named `#constructor`",
                ));
            }
            self.scopes.declare_private(
                self.source,
                &pname,
                PrivateMemberKind::Field,
                is_static,
                key_span,
            )?;
        } else {
            if !self.features.contains(Features::CLASS_PUBLIC_FIELDS) {
                return self.fail();
            }
            if name.as_deref() == Some("constructor") {
                return Err(semantic_error(
                    self.source,
                    key_span.start,
                    "Classes may not have a field named `constructor`",
                ));
            }
            if is_static && name.as_deref() == Some("prototype") {
                return Err(semantic_error(
                    self.source,
                    key_span.start,
                    "Classes may not have a static property named `prototype`",
                ));
            }
        }

        let annotation = if self.features.contains(Features::TYPE_ANNOTATIONS)
            && self.eat_punctuator(Punctuator::Colon)?
        {
            Some(self.parse_type_annotation()?)
        } else {
            None
        };

        let value = if self.eat_punctuator(Punctuator::Assign)? {
            Some(self.parse_field_initializer()?)
        } else {
            None
        };
        self.consume_semicolon()?;
        Ok(ClassElement::Field {
            key,
            value,
            is_static,
            annotation,
            span: self.finish_span(start),
        })
    }

    /// Field initializers behave like method bodies for `super.x` and
    /// `new.target` but may not contain `await`/`yield` of the enclosing
    /// function.
    fn parse_field_initializer(&mut self) -> Result<Expression, JsError> {
        let saved = self.enter_function_context(false, false, Some(MethodKind::Method), false);
        let value = self.parse_assignment();
        self.restore_function_context(saved);
        value
    }

    fn parse_static_block(&mut self, start: usize) -> Result<ClassElement, JsError> {
        if !self.features.contains(Features::CLASS_STATIC_BLOCKS) {
            return self.fail();
        }
        self.expect_punctuator(Punctuator::LBrace)?;
        let saved = self.enter_function_context(false, false, Some(MethodKind::Method), false);
        self.in_static_block = true;
        self.in_constructor = false;
        // `return` is illegal in a static block
        self.function_depth = 0;
        self.scopes
            .enter(ScopeKind::Function(FunctionKind::Normal));
        let body = self.parse_statement_list_until_brace();
        self.scopes.exit(self.source)?;
        self.restore_function_context(saved);
        let body = body?;
        self.expect_punctuator(Punctuator::RBrace)?;
        Ok(ClassElement::StaticBlock {
            body,
            span: self.finish_span(start),
        })
    }

    // ----- modules ----------------------------------------------------

    fn parse_import_declaration(&mut self) -> Result<Statement, JsError> {
        let start = self.start_offset()?;
        self.expect_keyword(Keyword::Import)?;

        // Bare import: `import 'mod'`
        if matches!(self.peek()?.value, TokenValue::String { .. }) {
            let source = self.parse_module_specifier()?;
            self.consume_semicolon()?;
            return Ok(Statement::Import {
                specifiers: Vec::new(),
                source,
                span: self.finish_span(start),
            });
        }

        let mut specifiers = Vec::new();
        let mut need_clause = true;
        // Default binding first, optionally followed by a namespace or
        // named clause
        if !self.check_punctuator(Punctuator::Star)? && !self.check_punctuator(Punctuator::LBrace)?
        {
            let local = self.parse_binding_identifier(BindingKind::Import)?;
            self.scopes
                .declare(self.source, &local.name, BindingKind::Import, local.span, self.strict)?;
            let span = local.span;
            specifiers.push(ImportSpecifier::Default { local, span });
            need_clause = self.eat_punctuator(Punctuator::Comma)?;
        }
        if need_clause {
            if self.check_punctuator(Punctuator::Star)? {
                let ns_start = self.start_offset()?;
                self.next()?;
                self.expect_contextual("as")?;
                let local = self.parse_binding_identifier(BindingKind::Import)?;
                self.scopes
                    .declare(self.source, &local.name, BindingKind::Import, local.span, self.strict)?;
                let span = self.finish_span(ns_start);
                specifiers.push(ImportSpecifier::Namespace { local, span });
            } else if self.eat_punctuator(Punctuator::LBrace)? {
                while !self.check_punctuator(Punctuator::RBrace)? {
                    let spec_start = self.start_offset()?;
                    let imported_token = self.next()?;
                    let imported_name = match identifier_name_of(&imported_token) {
                        Some(name) => name,
                        None => return Err(unexpected_token(self.source, &imported_token)),
                    };
                    let imported = Identifier::new(imported_name, imported_token.span);
                    let local = if self.eat_contextual("as")? {
                        self.parse_binding_identifier(BindingKind::Import)?
                    } else {
                        // Without a rename the imported name must itself be
                        // a legal binding
                        if !self.bindable_name(&imported_token) {
                            return Err(unexpected_token(self.source, &imported_token));
                        }
                        self.validate_binding_name(&imported.name, imported.span)?;
                        let mut local = imported.clone();
                        local.binding = BindingKind::Import;
                        local
                    };
                    self.scopes
                        .declare(self.source, &local.name, BindingKind::Import, local.span, self.strict)?;
                    specifiers.push(ImportSpecifier::Named {
                        imported,
                        local,
                        span: self.finish_span(spec_start),
                    });
                    if !self.eat_punctuator(Punctuator::Comma)? {
                        break;
                    }
                }
                self.expect_punctuator(Punctuator::RBrace)?;
            } else {
                return self.fail();
            }
        }
        self.expect_contextual("from")?;
        let source = self.parse_module_specifier()?;
        self.consume_semicolon()?;
        Ok(Statement::Import {
            specifiers,
            source,
            span: self.finish_span(start),
        })
    }

    fn parse_module_specifier(&mut self) -> Result<ModuleSpecifier, JsError> {
        let token = self.next()?;
        match token.value {
            TokenValue::String { value, .. } => Ok(ModuleSpecifier {
                value,
                span: token.span,
            }),
            _ => Err(unexpected_token(self.source, &token)),
        }
    }

    fn parse_export_declaration(&mut self) -> Result<Statement, JsError> {
        let start = self.start_offset()?;
        self.expect_keyword(Keyword::Export)?;

        if self.check_keyword(Keyword::Default)? {
            let default_token = self.next()?;
            self.scopes
                .add_export(self.source, "default", default_token.span)?;
            let declaration = self.parse_export_default_value()?;
            return Ok(Statement::ExportDefault {
                declaration,
                span: self.finish_span(start),
            });
        }

        if self.check_punctuator(Punctuator::Star)? {
            self.next()?;
            let exported = if self.eat_contextual("as")? {
                let token = self.next()?;
                let name = match identifier_name_of(&token) {
                    Some(name) => name,
                    None => return Err(unexpected_token(self.source, &token)),
                };
                self.scopes.add_export(self.source, &name, token.span)?;
                Some(Identifier::new(name, token.span))
            } else {
                None
            };
            self.expect_contextual("from")?;
            let source = self.parse_module_specifier()?;
            self.consume_semicolon()?;
            return Ok(Statement::ExportAll {
                exported,
                source,
                span: self.finish_span(start),
            });
        }

        if self.eat_punctuator(Punctuator::LBrace)? {
            let mut specifiers = Vec::new();
            while !self.check_punctuator(Punctuator::RBrace)? {
                let spec_start = self.start_offset()?;
                let local_token = self.next()?;
                let local_name = match identifier_name_of(&local_token) {
                    Some(name) => name,
                    None => return Err(unexpected_token(self.source, &local_token)),
                };
                let local = Identifier::new(local_name, local_token.span);
                let exported = if self.eat_contextual("as")? {
                    let token = self.next()?;
                    let name = match identifier_name_of(&token) {
                        Some(name) => name,
                        None => return Err(unexpected_token(self.source, &token)),
                    };
                    Identifier::new(name, token.span)
                } else {
                    local.clone()
                };
                specifiers.push(ExportSpecifier {
                    local,
                    exported,
                    span: self.finish_span(spec_start),
                });
                if !self.eat_punctuator(Punctuator::Comma)? {
                    break;
                }
            }
            self.expect_punctuator(Punctuator::RBrace)?;
            let source = if self.eat_contextual("from")? {
                Some(self.parse_module_specifier()?)
            } else {
                None
            };
            for spec in &specifiers {
                self.scopes
                    .add_export(self.source, &spec.exported.name, spec.exported.span)?;
                if source.is_none() {
                    // Local names are checked against top-level bindings
                    // once the whole program is parsed
                    self.scopes
                        .reference_export_local(&spec.local.name, spec.local.span);
                }
            }
            self.consume_semicolon()?;
            return Ok(Statement::ExportNamed {
                declaration: None,
                specifiers,
                source,
                span: self.finish_span(start),
            });
        }

        // `export <declaration>`
        let token = self.peek()?.clone();
        let declaration = match token.value {
            TokenValue::Keyword(Keyword::Var)
            | TokenValue::Keyword(Keyword::Let)
            | TokenValue::Keyword(Keyword::Const) => self.parse_variable_statement()?,
            TokenValue::Keyword(Keyword::Function) => {
                self.parse_function_declaration(false, token.span.start, false)?
            }
            TokenValue::Keyword(Keyword::Async) => {
                self.next()?;
                if !self.check_keyword(Keyword::Function)? {
                    return self.fail();
                }
                self.parse_function_declaration(true, token.span.start, false)?
            }
            TokenValue::Keyword(Keyword::Class) => {
                Statement::ClassDeclaration(self.parse_class(token.span.start, true, false)?)
            }
            _ => return self.fail(),
        };
        for (name, span) in declared_statement_names(&declaration) {
            self.scopes.add_export(self.source, &name, span)?;
        }
        Ok(Statement::ExportNamed {
            declaration: Some(Box::new(declaration)),
            specifiers: Vec::new(),
            source: None,
            span: self.finish_span(start),
        })
    }

    /// The value of `export default`: a (possibly anonymous) function or
    /// class declaration, or an assignment expression.
    fn parse_export_default_value(&mut self) -> Result<ExportDefaultKind, JsError> {
        let token = self.peek()?.clone();
        match token.value {
            TokenValue::Keyword(Keyword::Function) => {
                let statement = self.parse_function_declaration(false, token.span.start, true)?;
                match statement {
                    Statement::FunctionDeclaration(function) => {
                        Ok(ExportDefaultKind::Function(function))
                    }
                    _ => unreachable!(),
                }
            }
            TokenValue::Keyword(Keyword::Async) => {
                let state = self.lexer.snapshot();
                self.lexer.next_token()?;
                let follows_function = self.lexer.peek_token()?.is_keyword(Keyword::Function)
                    && !self.lexer.peek_token()?.newline_before;
                if follows_function {
                    let statement = self.parse_function_declaration(true, token.span.start, true)?;
                    match statement {
                        Statement::FunctionDeclaration(function) => {
                            Ok(ExportDefaultKind::Function(function))
                        }
                        _ => unreachable!(),
                    }
                } else {
                    self.lexer.restore(state);
                    let expression = self.parse_assignment()?;
                    self.consume_semicolon()?;
                    Ok(ExportDefaultKind::Expression(expression))
                }
            }
            TokenValue::Keyword(Keyword::Class) => {
                let class = self.parse_class(token.span.start, true, true)?;
                Ok(ExportDefaultKind::Class(class))
            }
            _ => {
                let expression = self.parse_assignment()?;
                self.consume_semicolon()?;
                Ok(ExportDefaultKind::Expression(expression))
            }
        }
    }

    // ----- binding patterns -------------------------------------------

    /// A binding identifier, validated against the current context
    /// (strict reserved words, `yield` in generators, `await` in async
    /// functions).
    fn parse_binding_identifier(&mut self, kind: BindingKind) -> Result<Identifier, JsError> {
        let token = self.next()?;
        let name = match identifier_name_of(&token) {
            Some(name) if self.bindable_name(&token) => name,
            _ => return Err(unexpected_token(self.source, &token)),
        };
        self.validate_binding_name(&name, token.span)?;
        Ok(Identifier {
            name,
            binding: kind,
            span: token.span,
        })
    }

    /// Keywords may serve as binding names only while they are merely
    /// contextual (`let` in sloppy mode, `yield` outside generators, ...).
    fn bindable_name(&self, token: &Token) -> bool {
        match &token.value {
            TokenValue::Identifier { .. } => true,
            TokenValue::Keyword(k) => match k {
                Keyword::Async => true,
                Keyword::Let | Keyword::Static => !self.strict,
                Keyword::Yield => !self.strict && !self.in_generator,
                Keyword::Await => !self.in_async && !self.in_static_block,
                _ => false,
            },
            _ => false,
        }
    }

    fn validate_binding_name(&self, name: &str, span: Span) -> Result<(), JsError> {
        if self.strict {
            if name == "eval" || name == "arguments" {
                return Err(semantic_error(
                    self.source,
                    span.start,
                    format!("Binding `{}` in strict mode", name),
                ));
            }
            if STRICT_RESERVED.contains(&name) || name == "let" || name == "static" || name == "yield" {
                return Err(syntax_error(
                    self.source,
                    span.start,
                    format!("Unexpected token `{}`", name),
                ));
            }
        }
        if name == "yield" && self.in_generator {
            return Err(syntax_error(
                self.source,
                span.start,
                "Unexpected token `yield`",
            ));
        }
        if name == "await" && (self.in_async || self.in_static_block) {
            return Err(syntax_error(
                self.source,
                span.start,
                "Unexpected token `await`",
            ));
        }
        Ok(())
    }

    fn parse_binding_pattern(&mut self, kind: BindingKind) -> Result<Pattern, JsError> {
        if self.check_punctuator(Punctuator::LBracket)? {
            return self.parse_array_binding_pattern(kind);
        }
        if self.check_punctuator(Punctuator::LBrace)? {
            return self.parse_object_binding_pattern(kind);
        }
        let id = self.parse_binding_identifier(kind)?;
        let span = id.span;
        Ok(Pattern::Identifier {
            id,
            annotation: None,
            optional: false,
            span,
        })
    }

    /// A binding pattern with an optional `= default` initializer, as
    /// used for destructuring elements.
    fn parse_binding_element(&mut self, kind: BindingKind) -> Result<Pattern, JsError> {
        let start = self.start_offset()?;
        let pattern = self.parse_binding_pattern(kind)?;
        if self.eat_punctuator(Punctuator::Assign)? {
            let right = self.parse_assignment()?;
            return Ok(Pattern::Assignment {
                left: Box::new(pattern),
                right: Box::new(right),
                span: self.finish_span(start),
            });
        }
        Ok(pattern)
    }

    fn parse_array_binding_pattern(&mut self, kind: BindingKind) -> Result<Pattern, JsError> {
        let start = self.start_offset()?;
        self.expect_punctuator(Punctuator::LBracket)?;
        let mut elements = Vec::new();
        while !self.check_punctuator(Punctuator::RBracket)? {
            if self.eat_punctuator(Punctuator::Comma)? {
                elements.push(None);
                continue;
            }
            if self.check_punctuator(Punctuator::Spread)? {
                let rest_start = self.start_offset()?;
                self.next()?;
                let argument = self.parse_binding_pattern(kind)?;
                elements.push(Some(Pattern::Rest {
                    argument: Box::new(argument),
                    span: self.finish_span(rest_start),
                }));
                break;
            }
            elements.push(Some(self.parse_binding_element(kind)?));
            if !self.check_punctuator(Punctuator::RBracket)? {
                self.expect_punctuator(Punctuator::Comma)?;
            }
        }
        self.expect_punctuator(Punctuator::RBracket)?;
        Ok(Pattern::Array {
            elements,
            span: self.finish_span(start),
        })
    }

    fn parse_object_binding_pattern(&mut self, kind: BindingKind) -> Result<Pattern, JsError> {
        let start = self.start_offset()?;
        self.expect_punctuator(Punctuator::LBrace)?;
        let mut properties = Vec::new();
        let mut rest = None;
        while !self.check_punctuator(Punctuator::RBrace)? {
            if self.check_punctuator(Punctuator::Spread)? {
                self.next()?;
                let id = self.parse_binding_identifier(kind)?;
                let span = id.span;
                rest = Some(Box::new(Pattern::Identifier {
                    id,
                    annotation: None,
                    optional: false,
                    span,
                }));
                break;
            }
            let prop_start = self.start_offset()?;
            let key = self.parse_property_key(false)?;
            let computed = matches!(key, PropertyKey::Computed { .. });
            let (value, shorthand) = if self.eat_punctuator(Punctuator::Colon)? {
                (self.parse_binding_element(kind)?, false)
            } else {
                // Shorthand form; the key must itself be a binding name
                let name = match &key {
                    PropertyKey::Identifier { name, span } => {
                        let name = name.clone();
                        let span = *span;
                        self.validate_binding_name(&name, span)?;
                        Identifier {
                            name,
                            binding: kind,
                            span,
                        }
                    }
                    _ => return self.fail(),
                };
                let span = name.span;
                let mut value = Pattern::Identifier {
                    id: name,
                    annotation: None,
                    optional: false,
                    span,
                };
                if self.eat_punctuator(Punctuator::Assign)? {
                    let right = self.parse_assignment()?;
                    value = Pattern::Assignment {
                        left: Box::new(value),
                        right: Box::new(right),
                        span: self.finish_span(prop_start),
                    };
                }
                (value, true)
            };
            properties.push(ObjectPatternProperty {
                key,
                value,
                shorthand,
                computed,
                span: self.finish_span(prop_start),
            });
            if !self.eat_punctuator(Punctuator::Comma)? {
                break;
            }
        }
        self.expect_punctuator(Punctuator::RBrace)?;
        Ok(Pattern::Object {
            properties,
            rest,
            span: self.finish_span(start),
        })
    }

    /// A property name: identifier, keyword, string, number, computed
    /// `[expr]` or (when allowed) a private name.
    fn parse_property_key(&mut self, allow_private: bool) -> Result<PropertyKey, JsError> {
        let token = self.peek()?.clone();
        match &token.value {
            TokenValue::Punctuator(Punctuator::LBracket) => {
                let start = token.span.start;
                self.next()?;
                let expr = self.parse_assignment()?;
                self.expect_punctuator(Punctuator::RBracket)?;
                Ok(PropertyKey::Computed {
                    expr: Box::new(expr),
                    span: self.finish_span(start),
                })
            }
            TokenValue::PrivateIdentifier(name) => {
                if !allow_private {
                    return self.fail();
                }
                self.next()?;
                Ok(PropertyKey::Private {
                    name: name.clone(),
                    span: token.span,
                })
            }
            TokenValue::String { value, .. } => {
                let value = value.clone();
                self.next()?;
                Ok(PropertyKey::String {
                    value,
                    span: token.span,
                })
            }
            TokenValue::Number { value, .. } => {
                let value = *value;
                self.next()?;
                Ok(PropertyKey::Number {
                    value,
                    span: token.span,
                })
            }
            _ => match identifier_name_of(&token) {
                Some(name) => {
                    self.next()?;
                    Ok(PropertyKey::Identifier {
                        name,
                        span: token.span,
                    })
                }
                None => self.fail(),
            },
        }
    }

    // ----- expressions ------------------------------------------------

    /// Comma-sequence expression.
    fn parse_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.start_offset()?;
        let first = self.parse_assignment()?;
        if !self.check_punctuator(Punctuator::Comma)? {
            return Ok(first);
        }
        let mut expressions = vec![first];
        while self.eat_punctuator(Punctuator::Comma)? {
            expressions.push(self.parse_assignment()?);
        }
        Ok(Expression::Sequence {
            expressions,
            span: self.finish_span(start),
        })
    }

    fn parse_assignment(&mut self) -> Result<Expression, JsError> {
        if self.in_generator && self.check_keyword(Keyword::Yield)? {
            return self.parse_yield();
        }
        let marker_before = self.cover_initializer;
        let start = self.start_offset()?;
        let expr = self.parse_conditional()?;

        // `x => body`: a single-identifier arrow head
        if let Expression::Identifier(id) = &expr {
            if self.check_punctuator(Punctuator::Arrow)? && !self.peek()?.newline_before {
                self.next()?;
                let param = Pattern::Identifier {
                    id: Identifier {
                        name: id.name.clone(),
                        binding: BindingKind::Param,
                        span: id.span,
                    },
                    annotation: None,
                    optional: false,
                    span: id.span,
                };
                return self.finish_arrow(start, vec![param], false, None);
            }
        }

        if let Some(operator) = self.assignment_operator()? {
            self.next()?;
            let left = if operator == AssignmentOperator::Assign {
                match self.expression_to_pattern(expr, false) {
                    Ok(Pattern::Identifier { id, .. }) => AssignmentTarget::Identifier(id),
                    Ok(Pattern::Member { expr, .. }) => AssignmentTarget::Member(expr),
                    Ok(pattern) => AssignmentTarget::Pattern(pattern),
                    Err(Some(error)) => return Err(error),
                    Err(None) => {
                        return Err(syntax_error(
                            self.source,
                            start,
                            "Invalid left-hand side in assignment",
                        ));
                    }
                }
            } else {
                self.simple_assignment_target(expr)?
            };
            // A successful target conversion legitimizes any shorthand
            // initializer inside it
            self.cover_initializer = marker_before;
            let right = self.parse_assignment()?;
            return Ok(Expression::Assignment {
                left,
                operator,
                right: Box::new(right),
                span: self.finish_span(start),
            });
        }

        if !self.in_cover_params && self.cover_initializer != marker_before {
            let offset = self.cover_initializer.unwrap_or(start);
            return Err(syntax_error(
                self.source,
                offset,
                "Shorthand property assignments are valid only in destructuring patterns",
            ));
        }
        Ok(expr)
    }

    fn assignment_operator(&mut self) -> Result<Option<AssignmentOperator>, JsError> {
        let op = match &self.peek()?.value {
            TokenValue::Punctuator(p) => match p {
                Punctuator::Assign => Some(AssignmentOperator::Assign),
                Punctuator::PlusEq => Some(AssignmentOperator::AddAssign),
                Punctuator::MinusEq => Some(AssignmentOperator::SubtractAssign),
                Punctuator::StarEq => Some(AssignmentOperator::MultiplyAssign),
                Punctuator::SlashEq => Some(AssignmentOperator::DivideAssign),
                Punctuator::PercentEq => Some(AssignmentOperator::ModuloAssign),
                Punctuator::StarStarEq => Some(AssignmentOperator::ExponentAssign),
                Punctuator::LtLtEq => Some(AssignmentOperator::LeftShiftAssign),
                Punctuator::GtGtEq => Some(AssignmentOperator::RightShiftAssign),
                Punctuator::GtGtGtEq => Some(AssignmentOperator::UnsignedRightShiftAssign),
                Punctuator::AndEq => Some(AssignmentOperator::BitwiseAndAssign),
                Punctuator::OrEq => Some(AssignmentOperator::BitwiseOrAssign),
                Punctuator::XorEq => Some(AssignmentOperator::BitwiseXorAssign),
                Punctuator::AndAndEq => Some(AssignmentOperator::LogicalAndAssign),
                Punctuator::OrOrEq => Some(AssignmentOperator::LogicalOrAssign),
                Punctuator::NullishCoalesceEq => Some(AssignmentOperator::NullishAssign),
                _ => None,
            },
            _ => None,
        };
        Ok(op)
    }

    /// Compound assignment and update operators require a simple target.
    fn simple_assignment_target(&mut self, expr: Expression) -> Result<AssignmentTarget, JsError> {
        match expr {
            Expression::Identifier(id) => {
                if self.strict && (id.name == "eval" || id.name == "arguments") {
                    return Err(semantic_error(
                        self.source,
                        id.span.start,
                        format!("Assigning to `{}` in strict mode", id.name),
                    ));
                }
                Ok(AssignmentTarget::Identifier(id))
            }
            Expression::Member { .. } => Ok(AssignmentTarget::Member(Box::new(expr))),
            Expression::Parenthesized { expression, .. } => self.simple_assignment_target(*expression),
            other => Err(syntax_error(
                self.source,
                other.span().start,
                "Invalid left-hand side in assignment",
            )),
        }
    }

    fn parse_yield(&mut self) -> Result<Expression, JsError> {
        let start = self.start_offset()?;
        let yield_token = self.expect_keyword(Keyword::Yield)?;
        if self.in_parameters {
            return Err(semantic_error(
                self.source,
                yield_token.span.start,
                "Yield expression cannot be used in function parameters",
            ));
        }
        let delegate = !self.peek()?.newline_before && self.eat_punctuator(Punctuator::Star)?;
        let argument = if delegate {
            Some(Box::new(self.parse_assignment()?))
        } else if !self.peek()?.newline_before && self.token_starts_expression()? {
            Some(Box::new(self.parse_assignment()?))
        } else {
            None
        };
        let span = self.finish_span(start);
        self.last_yield_span = Some(span);
        Ok(Expression::Yield {
            argument,
            delegate,
            span,
        })
    }

    /// Can the next token begin an expression operand? Used for the
    /// optional argument of `yield`.
    fn token_starts_expression(&mut self) -> Result<bool, JsError> {
        let token = self.peek()?;
        Ok(match &token.value {
            TokenValue::Identifier { .. }
            | TokenValue::PrivateIdentifier(_)
            | TokenValue::Number { .. }
            | TokenValue::BigInt(_)
            | TokenValue::String { .. }
            | TokenValue::TemplateComplete { .. }
            | TokenValue::TemplateHead { .. }
            | TokenValue::RegExp { .. } => true,
            TokenValue::Punctuator(p) => matches!(
                p,
                Punctuator::LParen
                    | Punctuator::LBracket
                    | Punctuator::LBrace
                    | Punctuator::Plus
                    | Punctuator::Minus
                    | Punctuator::Not
                    | Punctuator::Tilde
                    | Punctuator::PlusPlus
                    | Punctuator::MinusMinus
                    | Punctuator::Slash
                    | Punctuator::SlashEq
                    | Punctuator::Lt
            ),
            TokenValue::Keyword(k) => matches!(
                k,
                Keyword::Function
                    | Keyword::Class
                    | Keyword::New
                    | Keyword::This
                    | Keyword::Super
                    | Keyword::Async
                    | Keyword::Await
                    | Keyword::Typeof
                    | Keyword::Void
                    | Keyword::Delete
                    | Keyword::True
                    | Keyword::False
                    | Keyword::Null
                    | Keyword::Import
                    | Keyword::Yield
                    | Keyword::Let
                    | Keyword::Static
            ),
            _ => false,
        })
    }

    fn parse_conditional(&mut self) -> Result<Expression, JsError> {
        let start = self.start_offset()?;
        let test = self.parse_binary(1)?;
        if !self.eat_punctuator(Punctuator::Question)? {
            return Ok(test);
        }
        let saved_no_in = self.no_in;
        self.no_in = false;
        let consequent = self.parse_assignment();
        self.no_in = saved_no_in;
        let consequent = consequent?;
        self.expect_punctuator(Punctuator::Colon)?;
        let alternate = self.parse_assignment()?;
        Ok(Expression::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
            span: self.finish_span(start),
        })
    }

    /// Precedence-climbing loop over binary and logical operators.
    /// `**` is right-associative; `??` must not mix with `&&`/`||`
    /// without parentheses.
    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expression, JsError> {
        let start = self.start_offset()?;
        let mut left = self.parse_binary_operand(min_precedence)?;
        loop {
            let Some((precedence, op)) = self.binary_operator()? else {
                break;
            };
            if precedence < min_precedence {
                break;
            }
            let op_token = self.next()?;
            if let BinaryOp::Binary(BinaryOperator::Exponent) = op {
                // The base of `**` may not be an unparenthesized unary
                // or await expression
                if matches!(left, Expression::Unary { .. } | Expression::Await { .. }) {
                    return Err(syntax_error(
                        self.source,
                        op_token.span.start,
                        "Unexpected token `**`",
                    ));
                }
            }
            let right = if matches!(op, BinaryOp::Binary(BinaryOperator::Exponent)) {
                self.parse_binary(precedence)?
            } else {
                self.parse_binary(precedence + 1)?
            };
            match op {
                BinaryOp::Logical(operator) => {
                    let mixes = |e: &Expression| {
                        matches!(
                            e,
                            Expression::Logical {
                                operator: LogicalOperator::And | LogicalOperator::Or,
                                ..
                            }
                        )
                    };
                    let mixes_nullish = |e: &Expression| {
                        matches!(
                            e,
                            Expression::Logical {
                                operator: LogicalOperator::Nullish,
                                ..
                            }
                        )
                    };
                    let bad = match operator {
                        LogicalOperator::Nullish => mixes(&left) || mixes(&right),
                        _ => mixes_nullish(&left) || mixes_nullish(&right),
                    };
                    if bad {
                        return Err(syntax_error(
                            self.source,
                            op_token.span.start,
                            format!("Unexpected token `{}`", operator.as_str()),
                        ));
                    }
                    left = Expression::Logical {
                        left: Box::new(left),
                        operator,
                        right: Box::new(right),
                        span: self.finish_span(start),
                    };
                }
                BinaryOp::Binary(operator) => {
                    left = Expression::Binary {
                        left: Box::new(left),
                        operator,
                        right: Box::new(right),
                        span: self.finish_span(start),
                    };
                }
            }
        }
        Ok(left)
    }

    fn binary_operator(&mut self) -> Result<Option<(u8, BinaryOp)>, JsError> {
        use BinaryOperator as B;
        use LogicalOperator as L;
        let no_in = self.no_in;
        let op = match &self.peek()?.value {
            TokenValue::Punctuator(p) => match p {
                Punctuator::NullishCoalesce => Some((1, BinaryOp::Logical(L::Nullish))),
                Punctuator::OrOr => Some((2, BinaryOp::Logical(L::Or))),
                Punctuator::AndAnd => Some((3, BinaryOp::Logical(L::And))),
                Punctuator::Or => Some((4, BinaryOp::Binary(B::BitwiseOr))),
                Punctuator::Xor => Some((5, BinaryOp::Binary(B::BitwiseXor))),
                Punctuator::And => Some((6, BinaryOp::Binary(B::BitwiseAnd))),
                Punctuator::EqEq => Some((7, BinaryOp::Binary(B::Equal))),
                Punctuator::NotEq => Some((7, BinaryOp::Binary(B::NotEqual))),
                Punctuator::EqEqEq => Some((7, BinaryOp::Binary(B::StrictEqual))),
                Punctuator::NotEqEq => Some((7, BinaryOp::Binary(B::StrictNotEqual))),
                Punctuator::Lt => Some((8, BinaryOp::Binary(B::LessThan))),
                Punctuator::LtEq => Some((8, BinaryOp::Binary(B::LessThanOrEqual))),
                Punctuator::Gt => Some((8, BinaryOp::Binary(B::GreaterThan))),
                Punctuator::GtEq => Some((8, BinaryOp::Binary(B::GreaterThanOrEqual))),
                Punctuator::LtLt => Some((9, BinaryOp::Binary(B::LeftShift))),
                Punctuator::GtGt => Some((9, BinaryOp::Binary(B::RightShift))),
                Punctuator::GtGtGt => Some((9, BinaryOp::Binary(B::UnsignedRightShift))),
                Punctuator::Plus => Some((10, BinaryOp::Binary(B::Add))),
                Punctuator::Minus => Some((10, BinaryOp::Binary(B::Subtract))),
                Punctuator::Star => Some((11, BinaryOp::Binary(B::Multiply))),
                Punctuator::Slash => Some((11, BinaryOp::Binary(B::Divide))),
                Punctuator::Percent => Some((11, BinaryOp::Binary(B::Modulo))),
                Punctuator::StarStar => Some((12, BinaryOp::Binary(B::Exponent))),
                _ => None,
            },
            TokenValue::Keyword(Keyword::Instanceof) => Some((8, BinaryOp::Binary(B::Instanceof))),
            TokenValue::Keyword(Keyword::In) if !no_in => Some((8, BinaryOp::Binary(B::In))),
            _ => None,
        };
        Ok(op)
    }

    /// An operand of the binary ladder; handles `#field in obj` brand
    /// checks, whose private name is only legal before `in`.
    fn parse_binary_operand(&mut self, min_precedence: u8) -> Result<Expression, JsError> {
        let private_name = match &self.peek()?.value {
            TokenValue::PrivateIdentifier(name) => Some(name.clone()),
            _ => None,
        };
        if let Some(name) = private_name {
            let token = self.next()?;
            let legal = min_precedence <= 8
                && !self.no_in
                && self.peek()?.is_keyword(Keyword::In);
            if !legal {
                return Err(syntax_error(
                    self.source,
                    token.span.start,
                    "Unexpected token `private identifier`",
                ));
            }
            self.scopes
                .reference_private(self.source, &name, token.span)?;
            self.next()?; // in
            let object = self.parse_binary(9)?;
            return Ok(Expression::PrivateIn {
                name,
                name_span: token.span,
                object: Box::new(object),
                span: self.finish_span(token.span.start),
            });
        }
        self.parse_unary()
    }

    fn parse_unary(&mut self) -> Result<Expression, JsError> {
        let token = self.peek()?.clone();
        let start = token.span.start;
        let operator = match &token.value {
            TokenValue::Punctuator(Punctuator::Plus) => Some(UnaryOperator::Plus),
            TokenValue::Punctuator(Punctuator::Minus) => Some(UnaryOperator::Minus),
            TokenValue::Punctuator(Punctuator::Not) => Some(UnaryOperator::Not),
            TokenValue::Punctuator(Punctuator::Tilde) => Some(UnaryOperator::BitwiseNot),
            TokenValue::Keyword(Keyword::Typeof) => Some(UnaryOperator::Typeof),
            TokenValue::Keyword(Keyword::Void) => Some(UnaryOperator::Void),
            TokenValue::Keyword(Keyword::Delete) => Some(UnaryOperator::Delete),
            _ => None,
        };
        if let Some(operator) = operator {
            self.next()?;
            let argument = self.parse_unary()?;
            if operator == UnaryOperator::Delete {
                self.check_delete_target(&argument, start)?;
            }
            return Ok(Expression::Unary {
                operator,
                argument: Box::new(argument),
                span: self.finish_span(start),
            });
        }
        if matches!(
            token.value,
            TokenValue::Punctuator(Punctuator::PlusPlus)
                | TokenValue::Punctuator(Punctuator::MinusMinus)
        ) {
            let operator = if token.is_punctuator(Punctuator::PlusPlus) {
                UpdateOperator::Increment
            } else {
                UpdateOperator::Decrement
            };
            self.next()?;
            let argument = self.parse_unary()?;
            self.check_update_target(&argument)?;
            return Ok(Expression::Update {
                operator,
                argument: Box::new(argument),
                prefix: true,
                span: self.finish_span(start),
            });
        }
        if token.is_keyword(Keyword::Await) && self.can_await() {
            self.next()?;
            if self.in_parameters {
                return Err(semantic_error(
                    self.source,
                    start,
                    "Await expression cannot be used in function parameters",
                ));
            }
            let argument = self.parse_unary()?;
            let span = self.finish_span(start);
            self.last_await_span = Some(span);
            return Ok(Expression::Await {
                argument: Box::new(argument),
                span,
            });
        }
        self.parse_postfix()
    }

    /// `delete` may not remove a private member or, in strict mode, a
    /// bare identifier.
    fn check_delete_target(&self, argument: &Expression, start: usize) -> Result<(), JsError> {
        let target = argument.unwrap_parens();
        if self.strict && matches!(target, Expression::Identifier(_)) {
            return Err(semantic_error(
                self.source,
                start,
                "Delete of an unqualified identifier in strict mode",
            ));
        }
        if let Expression::Member {
            property: MemberKey::Private { .. },
            ..
        } = target
        {
            return Err(semantic_error(
                self.source,
                start,
                "Private fields can not be deleted",
            ));
        }
        Ok(())
    }

    fn check_update_target(&mut self, argument: &Expression) -> Result<(), JsError> {
        let target = argument.unwrap_parens();
        match target {
            Expression::Identifier(id) => {
                if self.strict && (id.name == "eval" || id.name == "arguments") {
                    return Err(semantic_error(
                        self.source,
                        id.span.start,
                        format!("Assigning to `{}` in strict mode", id.name),
                    ));
                }
                Ok(())
            }
            Expression::Member { .. } => Ok(()),
            other => Err(syntax_error(
                self.source,
                other.span().start,
                "Invalid left-hand side in assignment",
            )),
        }
    }

    fn parse_postfix(&mut self) -> Result<Expression, JsError> {
        let start = self.start_offset()?;
        let expr = self.parse_lhs_expression()?;
        let token = self.peek()?;
        if !token.newline_before
            && (token.is_punctuator(Punctuator::PlusPlus)
                || token.is_punctuator(Punctuator::MinusMinus))
        {
            let operator = if token.is_punctuator(Punctuator::PlusPlus) {
                UpdateOperator::Increment
            } else {
                UpdateOperator::Decrement
            };
            self.check_update_target(&expr)?;
            self.next()?;
            return Ok(Expression::Update {
                operator,
                argument: Box::new(expr),
                prefix: false,
                span: self.finish_span(start),
            });
        }
        Ok(expr)
    }

    fn parse_lhs_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.start_offset()?;
        let expr = if self.check_keyword(Keyword::New)? {
            self.parse_new_expression()?
        } else {
            self.parse_primary()?
        };
        self.parse_call_suffixes(expr, start, true)
    }

    fn parse_new_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.start_offset()?;
        let new_token = self.expect_keyword(Keyword::New)?;
        if self.eat_punctuator(Punctuator::Dot)? {
            let property = self.next()?;
            if !property.is_identifier_named("target") {
                return Err(unexpected_token(self.source, &property));
            }
            if self.function_depth == 0 {
                return Err(semantic_error(
                    self.source,
                    new_token.span.start,
                    "`new.target` expression is not allowed here",
                ));
            }
            return Ok(Expression::MetaProperty {
                meta: "new".to_string(),
                property: "target".to_string(),
                span: self.finish_span(start),
            });
        }
        if self.check_keyword(Keyword::Import)? {
            let offset = self.peek()?.span.start;
            return Err(syntax_error(
                self.source,
                offset,
                "Cannot use new with `import()`",
            ));
        }
        let callee = if self.check_keyword(Keyword::New)? {
            self.parse_new_expression()?
        } else {
            let callee_start = self.start_offset()?;
            let primary = self.parse_primary()?;
            self.parse_call_suffixes(primary, callee_start, false)?
        };
        let arguments = if self.check_punctuator(Punctuator::LParen)? {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        Ok(Expression::New {
            callee: Box::new(callee),
            arguments,
            span: self.finish_span(start),
        })
    }

    /// Member access, calls, optional chains and tagged templates.
    fn parse_call_suffixes(
        &mut self,
        mut expr: Expression,
        start: usize,
        allow_call: bool,
    ) -> Result<Expression, JsError> {
        let mut in_optional_chain = false;
        loop {
            let token = self.peek()?.clone();
            match &token.value {
                TokenValue::Punctuator(Punctuator::Dot) => {
                    self.next()?;
                    let property = self.parse_member_key()?;
                    expr = Expression::Member {
                        object: Box::new(expr),
                        property,
                        optional: false,
                        span: self.finish_span(start),
                    };
                }
                TokenValue::Punctuator(Punctuator::OptionalChain) => {
                    self.next()?;
                    in_optional_chain = true;
                    if self.check_punctuator(Punctuator::LParen)? {
                        if !allow_call {
                            return self.fail();
                        }
                        let arguments = self.parse_arguments()?;
                        expr = Expression::Call {
                            callee: Box::new(expr),
                            arguments,
                            optional: true,
                            span: self.finish_span(start),
                        };
                    } else if self.eat_punctuator(Punctuator::LBracket)? {
                        let saved_no_in = self.no_in;
                        self.no_in = false;
                        let property = self.parse_expression();
                        self.no_in = saved_no_in;
                        let property = property?;
                        self.expect_punctuator(Punctuator::RBracket)?;
                        expr = Expression::Member {
                            object: Box::new(expr),
                            property: MemberKey::Computed(Box::new(property)),
                            optional: true,
                            span: self.finish_span(start),
                        };
                    } else {
                        let property = self.parse_member_key()?;
                        expr = Expression::Member {
                            object: Box::new(expr),
                            property,
                            optional: true,
                            span: self.finish_span(start),
                        };
                    }
                }
                TokenValue::Punctuator(Punctuator::LBracket) => {
                    self.next()?;
                    let saved_no_in = self.no_in;
                    self.no_in = false;
                    let property = self.parse_expression();
                    self.no_in = saved_no_in;
                    let property = property?;
                    self.expect_punctuator(Punctuator::RBracket)?;
                    expr = Expression::Member {
                        object: Box::new(expr),
                        property: MemberKey::Computed(Box::new(property)),
                        optional: false,
                        span: self.finish_span(start),
                    };
                }
                TokenValue::Punctuator(Punctuator::LParen) if allow_call => {
                    let arguments = self.parse_arguments()?;
                    expr = Expression::Call {
                        callee: Box::new(expr),
                        arguments,
                        optional: false,
                        span: self.finish_span(start),
                    };
                }
                TokenValue::TemplateComplete { .. } | TokenValue::TemplateHead { .. } => {
                    if in_optional_chain {
                        return Err(syntax_error(
                            self.source,
                            token.span.start,
                            "Invalid tagged template on optional chain",
                        ));
                    }
                    let template = self.parse_template_literal()?;
                    let (quasis, expressions) = match template {
                        Expression::TemplateLiteral {
                            quasis,
                            expressions,
                            ..
                        } => (quasis, expressions),
                        _ => unreachable!(),
                    };
                    expr = Expression::TaggedTemplate {
                        tag: Box::new(expr),
                        quasis,
                        expressions,
                        span: self.finish_span(start),
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// The name after `.` or `?.`: an identifier name or a private name.
    fn parse_member_key(&mut self) -> Result<MemberKey, JsError> {
        let token = self.next()?;
        if let TokenValue::PrivateIdentifier(name) = &token.value {
            self.scopes
                .reference_private(self.source, name, token.span)?;
            return Ok(MemberKey::Private {
                name: name.clone(),
                span: token.span,
            });
        }
        match identifier_name_of(&token) {
            Some(name) => Ok(MemberKey::Identifier {
                name,
                span: token.span,
            }),
            None => Err(unexpected_token(self.source, &token)),
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<Argument>, JsError> {
        self.expect_punctuator(Punctuator::LParen)?;
        let saved_no_in = self.no_in;
        self.no_in = false;
        let result = self.parse_arguments_inner();
        self.no_in = saved_no_in;
        result
    }

    fn parse_arguments_inner(&mut self) -> Result<Vec<Argument>, JsError> {
        let mut arguments = Vec::new();
        while !self.check_punctuator(Punctuator::RParen)? {
            if self.check_punctuator(Punctuator::Spread)? {
                let start = self.start_offset()?;
                self.next()?;
                let argument = self.parse_assignment()?;
                arguments.push(Argument::Spread {
                    argument,
                    span: self.finish_span(start),
                });
            } else {
                arguments.push(Argument::Expression(self.parse_assignment()?));
            }
            if !self.eat_punctuator(Punctuator::Comma)? {
                break;
            }
        }
        self.expect_punctuator(Punctuator::RParen)?;
        Ok(arguments)
    }
}

/// Binary operator classification for the precedence ladder.
enum BinaryOp {
    Logical(LogicalOperator),
    Binary(BinaryOperator),
}

impl<'a> Parser<'a> {
    // ----- primary expressions ----------------------------------------

    fn parse_primary(&mut self) -> Result<Expression, JsError> {
        let token = self.peek()?.clone();
        let start = token.span.start;
        match &token.value {
            TokenValue::Punctuator(Punctuator::LParen) => self.parse_paren_or_arrow(start, false),
            // `/` at an operand position starts a regex literal
            TokenValue::Punctuator(Punctuator::Slash)
            | TokenValue::Punctuator(Punctuator::SlashEq) => {
                let regex = self.lexer.re_lex_as_regex()?;
                self.last_end = regex.span.end;
                match regex.value {
                    TokenValue::RegExp { pattern, flags } => Ok(Expression::Literal {
                        value: Literal::RegExp { pattern, flags },
                        span: regex.span,
                    }),
                    _ => unreachable!(),
                }
            }
            TokenValue::Punctuator(Punctuator::LBracket) => self.parse_array_literal(),
            TokenValue::Punctuator(Punctuator::LBrace) => self.parse_object_literal(),
            TokenValue::Punctuator(Punctuator::Lt)
                if self.features.contains(Features::JSX) =>
            {
                self.next()?;
                let element = self.parse_jsx_element_or_fragment(start)?;
                if self.peek()?.is_punctuator(Punctuator::Lt) {
                    let offset = self.peek()?.span.start;
                    return Err(syntax_error(
                        self.source,
                        offset,
                        "Adjacent JSX elements must be wrapped in an enclosing tag",
                    ));
                }
                Ok(element)
            }
            TokenValue::TemplateComplete { .. } | TokenValue::TemplateHead { .. } => {
                self.parse_template_literal()
            }
            TokenValue::Number { value, .. } => {
                let value = *value;
                self.next()?;
                Ok(Expression::Literal {
                    value: Literal::Number(value),
                    span: token.span,
                })
            }
            TokenValue::BigInt(value) => {
                let value = value.clone();
                self.next()?;
                Ok(Expression::Literal {
                    value: Literal::BigInt(value),
                    span: token.span,
                })
            }
            TokenValue::String { value, raw } => {
                let (value, raw) = (value.clone(), raw.clone());
                self.next()?;
                Ok(Expression::Literal {
                    value: Literal::String { value, raw },
                    span: token.span,
                })
            }
            TokenValue::Keyword(Keyword::True) => {
                self.next()?;
                Ok(Expression::Literal {
                    value: Literal::Boolean(true),
                    span: token.span,
                })
            }
            TokenValue::Keyword(Keyword::False) => {
                self.next()?;
                Ok(Expression::Literal {
                    value: Literal::Boolean(false),
                    span: token.span,
                })
            }
            TokenValue::Keyword(Keyword::Null) => {
                self.next()?;
                Ok(Expression::Literal {
                    value: Literal::Null,
                    span: token.span,
                })
            }
            TokenValue::Keyword(Keyword::This) => {
                self.next()?;
                Ok(Expression::This { span: token.span })
            }
            TokenValue::Keyword(Keyword::Super) => {
                self.next()?;
                let next_is_call = self.check_punctuator(Punctuator::LParen)?;
                let next_is_member = self.check_punctuator(Punctuator::Dot)?
                    || self.check_punctuator(Punctuator::LBracket)?;
                let legal = if next_is_call {
                    self.in_constructor && self.has_class_heritage
                } else if next_is_member {
                    self.in_method
                } else {
                    false
                };
                if !legal {
                    return Err(semantic_error(
                        self.source,
                        token.span.start,
                        "`super` keyword unexpected here",
                    ));
                }
                Ok(Expression::Super { span: token.span })
            }
            TokenValue::Keyword(Keyword::Function) => {
                self.next()?;
                let is_generator = self.eat_punctuator(Punctuator::Star)?;
                let name = if self.check_punctuator(Punctuator::LParen)? {
                    None
                } else {
                    // Expression names bind only inside the function; they
                    // are not declared in the enclosing scope
                    Some(self.parse_binding_identifier(BindingKind::Function)?)
                };
                let function = self.parse_function_rest(start, name, false, is_generator, None)?;
                Ok(Expression::Function(function))
            }
            TokenValue::Keyword(Keyword::Class) => {
                let class = self.parse_class(start, false, false)?;
                Ok(Expression::Class(class))
            }
            TokenValue::Keyword(Keyword::Async) => self.parse_async_expression(token),
            TokenValue::Keyword(Keyword::Import) => {
                self.next()?;
                if self.check_punctuator(Punctuator::LParen)? {
                    if !self.features.contains(Features::DYNAMIC_IMPORT) {
                        return self.fail();
                    }
                    self.next()?;
                    let argument = self.parse_assignment()?;
                    self.expect_punctuator(Punctuator::RParen)?;
                    return Ok(Expression::ImportCall {
                        argument: Box::new(argument),
                        span: self.finish_span(start),
                    });
                }
                if self.check_punctuator(Punctuator::Dot)? {
                    if !self.features.contains(Features::IMPORT_META) {
                        return self.fail();
                    }
                    self.next()?;
                    let property = self.next()?;
                    if !property.is_identifier_named("meta") {
                        return Err(unexpected_token(self.source, &property));
                    }
                    return Ok(Expression::MetaProperty {
                        meta: "import".to_string(),
                        property: "meta".to_string(),
                        span: self.finish_span(start),
                    });
                }
                Err(syntax_error(
                    self.source,
                    token.span.start,
                    "Unexpected token `import`",
                ))
            }
            _ => match self.identifier_like_name(&token) {
                Some(name) => {
                    self.next()?;
                    Ok(Expression::Identifier(Identifier::new(name, token.span)))
                }
                None => self.fail(),
            },
        }
    }

    /// `async` at an operand position: an async function expression, an
    /// async arrow head, or the plain identifier `async`.
    fn parse_async_expression(&mut self, async_token: Token) -> Result<Expression, JsError> {
        let start = async_token.span.start;
        self.next()?; // async
        let next_token = self.peek()?.clone();
        if next_token.is_keyword(Keyword::Function) && !next_token.newline_before {
            self.next()?;
            let is_generator = self.eat_punctuator(Punctuator::Star)?;
            let name = if self.check_punctuator(Punctuator::LParen)? {
                None
            } else {
                Some(self.parse_binding_identifier(BindingKind::Function)?)
            };
            let function = self.parse_function_rest(start, name, true, is_generator, None)?;
            return Ok(Expression::Function(function));
        }
        if next_token.is_punctuator(Punctuator::LParen) && !next_token.newline_before {
            return self.parse_paren_or_arrow(start, true);
        }
        if !next_token.newline_before {
            if let Some(name) = self.identifier_like_name(&next_token) {
                let state = self.lexer.snapshot();
                self.lexer.next_token()?;
                if self.lexer.peek_token()?.is_punctuator(Punctuator::Arrow)
                    && !self.lexer.peek_token()?.newline_before
                {
                    self.next()?; // =>
                    if name == "await" {
                        return Err(syntax_error(
                            self.source,
                            next_token.span.start,
                            "Unexpected token `await`",
                        ));
                    }
                    let param = Pattern::Identifier {
                        id: Identifier {
                            name,
                            binding: BindingKind::Param,
                            span: next_token.span,
                        },
                        annotation: None,
                        optional: false,
                        span: next_token.span,
                    };
                    return self.finish_arrow(start, vec![param], true, None);
                }
                self.lexer.restore(state);
            }
        }
        Ok(Expression::Identifier(Identifier::new(
            "async",
            async_token.span,
        )))
    }

    fn parse_template_literal(&mut self) -> Result<Expression, JsError> {
        let start = self.start_offset()?;
        let head = self.next()?;
        let mut quasis = Vec::new();
        let mut expressions = Vec::new();
        match head.value {
            TokenValue::TemplateComplete { cooked, raw } => {
                quasis.push(TemplateElement {
                    cooked,
                    raw,
                    tail: true,
                    span: head.span,
                });
            }
            TokenValue::TemplateHead { cooked, raw } => {
                quasis.push(TemplateElement {
                    cooked,
                    raw,
                    tail: false,
                    span: head.span,
                });
                loop {
                    let saved_no_in = self.no_in;
                    self.no_in = false;
                    let substitution = self.parse_expression();
                    self.no_in = saved_no_in;
                    expressions.push(substitution?);
                    if !self.check_punctuator(Punctuator::RBrace)? {
                        return self.fail();
                    }
                    let part = self.lexer.re_lex_template_continuation()?;
                    self.last_end = part.span.end;
                    match part.value {
                        TokenValue::TemplateMiddle { cooked, raw } => {
                            quasis.push(TemplateElement {
                                cooked,
                                raw,
                                tail: false,
                                span: part.span,
                            });
                        }
                        TokenValue::TemplateTail { cooked, raw } => {
                            quasis.push(TemplateElement {
                                cooked,
                                raw,
                                tail: true,
                                span: part.span,
                            });
                            break;
                        }
                        _ => unreachable!(),
                    }
                }
            }
            _ => unreachable!(),
        }
        Ok(Expression::TemplateLiteral {
            quasis,
            expressions,
            span: self.finish_span(start),
        })
    }

    fn parse_array_literal(&mut self) -> Result<Expression, JsError> {
        let start = self.start_offset()?;
        self.expect_punctuator(Punctuator::LBracket)?;
        let mut elements = Vec::new();
        while !self.check_punctuator(Punctuator::RBracket)? {
            if self.eat_punctuator(Punctuator::Comma)? {
                elements.push(None);
                continue;
            }
            if self.check_punctuator(Punctuator::Spread)? {
                let spread_start = self.start_offset()?;
                self.next()?;
                let argument = self.parse_assignment()?;
                elements.push(Some(ArrayElement::Spread {
                    argument,
                    span: self.finish_span(spread_start),
                }));
            } else {
                elements.push(Some(ArrayElement::Expression(self.parse_assignment()?)));
            }
            if !self.check_punctuator(Punctuator::RBracket)? {
                self.expect_punctuator(Punctuator::Comma)?;
            }
        }
        self.expect_punctuator(Punctuator::RBracket)?;
        Ok(Expression::Array {
            elements,
            span: self.finish_span(start),
        })
    }

    fn parse_object_literal(&mut self) -> Result<Expression, JsError> {
        let start = self.start_offset()?;
        self.expect_punctuator(Punctuator::LBrace)?;
        let mut properties = Vec::new();
        let mut seen_proto = false;
        while !self.check_punctuator(Punctuator::RBrace)? {
            if self.check_punctuator(Punctuator::Spread)? {
                let spread_start = self.start_offset()?;
                self.next()?;
                let argument = self.parse_assignment()?;
                properties.push(ObjectProperty::Spread {
                    argument,
                    span: self.finish_span(spread_start),
                });
            } else {
                properties.push(self.parse_object_property(&mut seen_proto)?);
            }
            if !self.eat_punctuator(Punctuator::Comma)? {
                break;
            }
        }
        self.expect_punctuator(Punctuator::RBrace)?;
        Ok(Expression::Object {
            properties,
            span: self.finish_span(start),
        })
    }

    fn parse_object_property(&mut self, seen_proto: &mut bool) -> Result<ObjectProperty, JsError> {
        let start = self.start_offset()?;
        let mut is_async = false;
        let mut is_generator = false;
        let mut accessor: Option<MethodKind> = None;

        if self.check_keyword(Keyword::Async)? && !self.next_token_ends_property_name()? {
            let state = self.lexer.snapshot();
            self.lexer.next_token()?;
            if self.lexer.peek_token()?.newline_before {
                self.lexer.restore(state);
            } else {
                is_async = true;
                is_generator = self.eat_punctuator(Punctuator::Star)?;
            }
        } else if self.eat_punctuator(Punctuator::Star)? {
            is_generator = true;
        }
        if !is_async && !is_generator {
            for (text, kind) in [("get", MethodKind::Get), ("set", MethodKind::Set)] {
                if self.check_identifier(text)? && !self.next_token_ends_property_name()? {
                    self.next()?;
                    accessor = Some(kind);
                    break;
                }
            }
        }

        let key = self.parse_property_key(false)?;
        let computed = matches!(key, PropertyKey::Computed { .. });

        if self.check_punctuator(Punctuator::LParen)?
            || is_async
            || is_generator
            || accessor.is_some()
        {
            let method_kind = accessor.unwrap_or(MethodKind::Method);
            let function =
                self.parse_function_rest(start, None, is_async, is_generator, Some(method_kind))?;
            let kind = match accessor {
                Some(MethodKind::Get) => PropertyKind::Get,
                Some(MethodKind::Set) => PropertyKind::Set,
                _ => PropertyKind::Init,
            };
            let span = self.finish_span(start);
            return Ok(ObjectProperty::Property {
                key,
                value: Expression::Function(function),
                kind,
                shorthand: false,
                computed,
                method: accessor.is_none(),
                span,
            });
        }

        if self.eat_punctuator(Punctuator::Colon)? {
            if !computed && key.static_name() == Some("__proto__") {
                if *seen_proto {
                    return Err(syntax_error(
                        self.source,
                        key.span().start,
                        "Duplicate `__proto__` fields are not allowed in object literals",
                    ));
                }
                *seen_proto = true;
            }
            let value = self.parse_assignment()?;
            return Ok(ObjectProperty::Property {
                key,
                value,
                kind: PropertyKind::Init,
                shorthand: false,
                computed,
                method: false,
                span: self.finish_span(start),
            });
        }

        // Shorthand forms; the key must be a legal identifier reference
        let id = match &key {
            PropertyKey::Identifier { name, span } => {
                let probe = Token {
                    value: TokenValue::Identifier {
                        name: name.clone(),
                        escaped: false,
                    },
                    span: *span,
                    newline_before: false,
                };
                match self.identifier_like_name(&probe) {
                    Some(name) => Identifier::new(name, *span),
                    None => {
                        return Err(syntax_error(
                            self.source,
                            span.start,
                            format!("Unexpected token `{}`", name),
                        ));
                    }
                }
            }
            _ => return self.fail(),
        };
        if self.check_punctuator(Punctuator::Assign)? {
            // Cover grammar: only legal if the object is later converted
            // into a destructuring pattern
            let eq_offset = self.peek()?.span.start;
            if self.cover_initializer.is_none() {
                self.cover_initializer = Some(eq_offset);
            }
            self.next()?;
            let right = self.parse_assignment()?;
            let span = self.finish_span(start);
            return Ok(ObjectProperty::Property {
                key,
                value: Expression::Assignment {
                    left: AssignmentTarget::Identifier(id),
                    operator: AssignmentOperator::Assign,
                    right: Box::new(right),
                    span,
                },
                kind: PropertyKind::Init,
                shorthand: true,
                computed: false,
                method: false,
                span,
            });
        }
        let span = id.span;
        Ok(ObjectProperty::Property {
            key,
            value: Expression::Identifier(id),
            kind: PropertyKind::Init,
            shorthand: true,
            computed: false,
            method: false,
            span,
        })
    }

    /// Like [`Parser::next_token_ends_member_name`] but for object
    /// literal positions.
    fn next_token_ends_property_name(&mut self) -> Result<bool, JsError> {
        let state = self.lexer.snapshot();
        self.lexer.next_token()?;
        let next = self.lexer.peek_token()?;
        let ends = matches!(
            next.value,
            TokenValue::Punctuator(Punctuator::LParen)
                | TokenValue::Punctuator(Punctuator::Assign)
                | TokenValue::Punctuator(Punctuator::Colon)
                | TokenValue::Punctuator(Punctuator::Comma)
                | TokenValue::Punctuator(Punctuator::RBrace)
        );
        self.lexer.restore(state);
        Ok(ends)
    }

    // ----- the parenthesized-or-arrow cover grammar -------------------

    fn parse_paren_or_arrow(&mut self, start: usize, is_async: bool) -> Result<Expression, JsError> {
        if self.features.contains(Features::TYPE_ANNOTATIONS) {
            if let Some(arrow) = self.try_parse_typed_arrow(start, is_async)? {
                return Ok(arrow);
            }
        }
        self.expect_punctuator(Punctuator::LParen)?;
        let saved_cover = self.cover_initializer.take();
        let saved_in_cover = self.in_cover_params;
        self.in_cover_params = true;
        let result = self.parse_paren_items(start, is_async, saved_cover);
        self.in_cover_params = saved_in_cover;
        result
    }

    fn parse_paren_items(
        &mut self,
        start: usize,
        is_async: bool,
        saved_cover: Option<usize>,
    ) -> Result<Expression, JsError> {
        let mut items: Vec<CoverItem> = Vec::new();
        let mut trailing_comma = false;
        if !self.check_punctuator(Punctuator::RParen)? {
            loop {
                if self.check_punctuator(Punctuator::Spread)? {
                    let spread_start = self.start_offset()?;
                    self.next()?;
                    let expr = self.parse_assignment()?;
                    items.push(CoverItem::Rest(expr, self.finish_span(spread_start)));
                } else {
                    items.push(CoverItem::Expression(self.parse_assignment()?));
                }
                if self.eat_punctuator(Punctuator::Comma)? {
                    if self.check_punctuator(Punctuator::RParen)? {
                        trailing_comma = true;
                        break;
                    }
                    continue;
                }
                break;
            }
        }
        let rparen = self.expect_punctuator(Punctuator::RParen)?;

        let is_arrow = self.check_punctuator(Punctuator::Arrow)? && !self.peek()?.newline_before;
        if is_arrow {
            let arrow_token = self.next()?;
            return self.reinterpret_cover_as_arrow(start, items, is_async, arrow_token, saved_cover);
        }

        if is_async {
            // Not an arrow after all: `async (...)` is a call
            if let Some(offset) = self.cover_initializer {
                return Err(syntax_error(
                    self.source,
                    offset,
                    "Shorthand property assignments are valid only in destructuring patterns",
                ));
            }
            self.cover_initializer = saved_cover;
            let callee = Expression::Identifier(Identifier::new(
                "async",
                Span::new(start, start + "async".len()),
            ));
            let arguments = items
                .into_iter()
                .map(|item| match item {
                    CoverItem::Expression(expr) => Argument::Expression(expr),
                    CoverItem::Rest(argument, span) => Argument::Spread { argument, span },
                })
                .collect();
            return Ok(Expression::Call {
                callee: Box::new(callee),
                arguments,
                optional: false,
                span: self.finish_span(start),
            });
        }

        // Plain parenthesized expression: rest elements, trailing commas
        // and empty lists all demanded an arrow
        for item in &items {
            if let CoverItem::Rest(_, span) = item {
                return Err(syntax_error(
                    self.source,
                    span.start,
                    "Unexpected token `...`",
                ));
            }
        }
        if items.is_empty() || trailing_comma {
            return Err(syntax_error(
                self.source,
                rparen.span.start,
                "Unexpected token `)`",
            ));
        }
        if let Some(offset) = self.cover_initializer {
            return Err(syntax_error(
                self.source,
                offset,
                "Shorthand property assignments are valid only in destructuring patterns",
            ));
        }
        self.cover_initializer = saved_cover;
        let mut expressions: Vec<Expression> = items
            .into_iter()
            .map(|item| match item {
                CoverItem::Expression(expr) => expr,
                CoverItem::Rest(..) => unreachable!(),
            })
            .collect();
        let expression = if expressions.len() == 1 {
            expressions.remove(0)
        } else {
            let span = Span::new(
                expressions[0].span().start,
                expressions[expressions.len() - 1].span().end,
            );
            Expression::Sequence { expressions, span }
        };
        Ok(Expression::Parenthesized {
            expression: Box::new(expression),
            span: self.finish_span(start),
        })
    }

    /// The cover resolved to an arrow: every item must reinterpret as a
    /// parameter pattern. Shapes that only made sense as expressions
    /// raise the malformed-parameter diagnostic at the `=>`.
    fn reinterpret_cover_as_arrow(
        &mut self,
        start: usize,
        items: Vec<CoverItem>,
        is_async: bool,
        arrow_token: Token,
        saved_cover: Option<usize>,
    ) -> Result<Expression, JsError> {
        let malformed = |this: &Self| {
            syntax_error(
                this.source,
                arrow_token.span.start,
                "Malformed arrow function parameter list",
            )
        };
        if self.in_generator {
            if let Some(span) = self.last_yield_span {
                if span.start > start {
                    return Err(malformed(self));
                }
            }
        }
        if self.in_async || is_async {
            if let Some(span) = self.last_await_span {
                if span.start > start {
                    return Err(malformed(self));
                }
            }
        }
        let item_count = items.len();
        let mut params = Vec::new();
        for (index, item) in items.into_iter().enumerate() {
            match item {
                CoverItem::Expression(expr) => match self.expression_to_pattern(expr, true) {
                    Ok(pattern) => params.push(pattern),
                    Err(Some(error)) => return Err(error),
                    Err(None) => return Err(malformed(self)),
                },
                CoverItem::Rest(expr, span) => {
                    if index != item_count - 1 {
                        return Err(syntax_error(
                            self.source,
                            span.start,
                            "Rest parameter must be last formal parameter",
                        ));
                    }
                    let argument = match self.expression_to_pattern(expr, true) {
                        Ok(pattern) => pattern,
                        Err(Some(error)) => return Err(error),
                        Err(None) => return Err(malformed(self)),
                    };
                    if matches!(argument, Pattern::Assignment { .. }) {
                        // Rest parameters cannot have defaults
                        return Err(malformed(self));
                    }
                    params.push(Pattern::Rest {
                        argument: Box::new(argument),
                        span,
                    });
                }
            }
        }
        // The conversion legitimized markers set inside these parens; any
        // outer marker is still pending
        self.cover_initializer = saved_cover;
        self.finish_arrow(start, params, is_async, None)
    }

    /// Parameters are converted; parse the arrow's body and assemble the
    /// function. The `=>` is already consumed.
    fn finish_arrow(
        &mut self,
        start: usize,
        params: Vec<Pattern>,
        is_async: bool,
        return_type: Option<TypeAnnotation>,
    ) -> Result<Expression, JsError> {
        let mut names = Vec::new();
        for param in &params {
            collect_pattern_names(param, &mut names);
        }
        // Arrow parameters never tolerate duplicates, and names are
        // validated against the enclosing context (plus the arrow's own
        // async-ness for `await`)
        for (index, (name, span)) in names.iter().enumerate() {
            if names[..index].iter().any(|(n, _)| n == name) {
                return Err(semantic_error(
                    self.source,
                    span.start,
                    format!("Identifier `{}` has already been declared", name),
                ));
            }
            self.validate_binding_name(name, *span)?;
            if is_async && name == "await" {
                return Err(syntax_error(
                    self.source,
                    span.start,
                    "Unexpected token `await`",
                ));
            }
        }
        let simple = params.iter().all(|p| matches!(p, Pattern::Identifier { .. }));
        let saved = self.enter_function_context(is_async, false, None, true);
        self.scopes.enter(ScopeKind::Function(FunctionKind::Arrow));
        let result = self.finish_arrow_inner(start, params, is_async, return_type, names, simple);
        self.scopes.exit(self.source)?;
        self.restore_function_context(saved);
        result
    }

    fn finish_arrow_inner(
        &mut self,
        start: usize,
        params: Vec<Pattern>,
        is_async: bool,
        return_type: Option<TypeAnnotation>,
        names: Vec<(String, Span)>,
        simple: bool,
    ) -> Result<Expression, JsError> {
        for (name, span) in &names {
            self.scopes.declare_param(self.source, name, *span, false)?;
        }
        let body = if self.check_punctuator(Punctuator::LBrace)? {
            self.next()?;
            let mut statements = Vec::new();
            let use_strict = self.parse_directive_prologue(&mut statements)?;
            if let Some(directive_span) = use_strict {
                if !simple {
                    return Err(syntax_error(
                        self.source,
                        directive_span.start,
                        "Illegal `use strict` directive in function with non-simple parameter list",
                    ));
                }
            }
            if self.strict {
                for (name, span) in &names {
                    if name == "eval" || name == "arguments" {
                        return Err(semantic_error(
                            self.source,
                            span.start,
                            format!("Binding `{}` in strict mode", name),
                        ));
                    }
                }
            }
            statements.extend(self.parse_statement_list_until_brace()?);
            self.expect_punctuator(Punctuator::RBrace)?;
            ArrowBody::Block(statements)
        } else {
            ArrowBody::Expression(Box::new(self.parse_assignment()?))
        };
        Ok(Expression::Arrow(ArrowFunction {
            params,
            body,
            is_async,
            return_type,
            span: self.finish_span(start),
        }))
    }

    /// Under the type-annotation feature an arrow head like `(a: T)` is
    /// not a parseable expression, so arrow heads are tried first and the
    /// cursor rewound when the attempt fails.
    fn try_parse_typed_arrow(
        &mut self,
        start: usize,
        is_async: bool,
    ) -> Result<Option<Expression>, JsError> {
        let lexer_state = self.lexer.snapshot();
        let scope_mark = self.scopes.mark();
        let saved_yield = self.last_yield_span;
        let saved_await = self.last_await_span;
        let saved_cover = self.cover_initializer;
        let saved_end = self.last_end;
        match self.parse_typed_arrow_head() {
            Ok(Some((params, return_type))) => {
                self.next()?; // =>
                let arrow = self.finish_arrow(start, params, is_async, return_type)?;
                Ok(Some(arrow))
            }
            Ok(None) | Err(_) => {
                self.lexer.restore(lexer_state);
                self.scopes.reset_to(scope_mark);
                self.last_yield_span = saved_yield;
                self.last_await_span = saved_await;
                self.cover_initializer = saved_cover;
                self.last_end = saved_end;
                Ok(None)
            }
        }
    }

    /// Parse `( params ) : ReturnType` up to but excluding the `=>`.
    /// Returns `None` when no arrow follows.
    #[allow(clippy::type_complexity)]
    fn parse_typed_arrow_head(
        &mut self,
    ) -> Result<Option<(Vec<Pattern>, Option<TypeAnnotation>)>, JsError> {
        self.expect_punctuator(Punctuator::LParen)?;
        let saved_in_parameters = self.in_parameters;
        self.in_parameters = true;
        let parsed = self.parse_typed_arrow_params();
        self.in_parameters = saved_in_parameters;
        let params = parsed?;
        let return_type = if self.eat_punctuator(Punctuator::Colon)? {
            Some(self.parse_type_annotation()?)
        } else {
            None
        };
        if self.check_punctuator(Punctuator::Arrow)? && !self.peek()?.newline_before {
            Ok(Some((params, return_type)))
        } else {
            Ok(None)
        }
    }

    fn parse_typed_arrow_params(&mut self) -> Result<Vec<Pattern>, JsError> {
        let mut params = Vec::new();
        let mut names = Vec::new();
        while !self.check_punctuator(Punctuator::RParen)? {
            if self.check_punctuator(Punctuator::Spread)? {
                let rest_start = self.start_offset()?;
                self.next()?;
                let argument = self.parse_binding_pattern(BindingKind::Param)?;
                params.push(Pattern::Rest {
                    argument: Box::new(argument),
                    span: self.finish_span(rest_start),
                });
                break;
            }
            params.push(self.parse_param(&mut names)?);
            if !self.eat_punctuator(Punctuator::Comma)? {
                break;
            }
        }
        self.expect_punctuator(Punctuator::RParen)?;
        Ok(params)
    }

    // ----- expression-to-pattern reinterpretation ---------------------

    /// Reinterpret an already-parsed expression as a pattern. `binding`
    /// selects binding-pattern rules (arrow parameters) over assignment
    /// -target rules (destructuring assignment, for-in/of heads).
    ///
    /// `Err(None)` means the shape is simply not a pattern; the caller
    /// owns the diagnostic. `Err(Some(_))` is a hard error.
    fn expression_to_pattern(
        &mut self,
        expr: Expression,
        binding: bool,
    ) -> Result<Pattern, Option<JsError>> {
        match expr {
            Expression::Identifier(mut id) => {
                if binding {
                    if let Err(error) = self.validate_binding_name(&id.name, id.span) {
                        return Err(Some(error));
                    }
                    id.binding = BindingKind::Param;
                } else if self.strict && (id.name == "eval" || id.name == "arguments") {
                    return Err(Some(semantic_error(
                        self.source,
                        id.span.start,
                        format!("Assigning to `{}` in strict mode", id.name),
                    )));
                }
                let span = id.span;
                Ok(Pattern::Identifier {
                    id,
                    annotation: None,
                    optional: false,
                    span,
                })
            }
            Expression::Member { .. } => {
                if binding {
                    return Err(None);
                }
                let span = expr.span();
                Ok(Pattern::Member {
                    expr: Box::new(expr),
                    span,
                })
            }
            Expression::Parenthesized { expression, .. } => {
                if binding {
                    return Err(None);
                }
                let inner = self.expression_to_pattern(*expression, false)?;
                match inner {
                    Pattern::Identifier { .. } | Pattern::Member { .. } => Ok(inner),
                    _ => Err(None),
                }
            }
            Expression::Assignment {
                left,
                operator: AssignmentOperator::Assign,
                right,
                span,
            } => {
                let left_pattern = match left {
                    AssignmentTarget::Identifier(mut id) => {
                        if binding {
                            if let Err(error) = self.validate_binding_name(&id.name, id.span) {
                                return Err(Some(error));
                            }
                            id.binding = BindingKind::Param;
                        }
                        let span = id.span;
                        Pattern::Identifier {
                            id,
                            annotation: None,
                            optional: false,
                            span,
                        }
                    }
                    AssignmentTarget::Member(member) => {
                        if binding {
                            return Err(None);
                        }
                        let span = member.span();
                        Pattern::Member { expr: member, span }
                    }
                    AssignmentTarget::Pattern(pattern) => pattern,
                };
                Ok(Pattern::Assignment {
                    left: Box::new(left_pattern),
                    right,
                    span,
                })
            }
            Expression::Assignment { .. } => Err(None),
            Expression::Array { elements, span } => {
                let element_count = elements.len();
                let mut out = Vec::new();
                for (index, element) in elements.into_iter().enumerate() {
                    match element {
                        None => out.push(None),
                        Some(ArrayElement::Expression(e)) => {
                            out.push(Some(self.expression_to_pattern(e, binding)?));
                        }
                        Some(ArrayElement::Spread { argument, span: rest_span }) => {
                            if index != element_count - 1 {
                                return Err(None);
                            }
                            let target = self.expression_to_pattern(argument, binding)?;
                            if matches!(target, Pattern::Assignment { .. }) {
                                return Err(None);
                            }
                            out.push(Some(Pattern::Rest {
                                argument: Box::new(target),
                                span: rest_span,
                            }));
                        }
                    }
                }
                Ok(Pattern::Array {
                    elements: out,
                    span,
                })
            }
            Expression::Object { properties, span } => {
                let property_count = properties.len();
                let mut out = Vec::new();
                let mut rest = None;
                for (index, property) in properties.into_iter().enumerate() {
                    match property {
                        ObjectProperty::Property {
                            key,
                            value,
                            kind: PropertyKind::Init,
                            shorthand,
                            computed,
                            method: false,
                            span: property_span,
                        } => {
                            let pattern = self.expression_to_pattern(value, binding)?;
                            out.push(ObjectPatternProperty {
                                key,
                                value: pattern,
                                shorthand,
                                computed,
                                span: property_span,
                            });
                        }
                        ObjectProperty::Spread { argument, .. } => {
                            if index != property_count - 1 {
                                return Err(None);
                            }
                            let target = self.expression_to_pattern(argument, binding)?;
                            let ok = match &target {
                                Pattern::Identifier { .. } => true,
                                Pattern::Member { .. } => !binding,
                                _ => false,
                            };
                            if !ok {
                                return Err(None);
                            }
                            rest = Some(Box::new(target));
                        }
                        _ => return Err(None),
                    }
                }
                Ok(Pattern::Object {
                    properties: out,
                    rest,
                    span,
                })
            }
            _ => Err(None),
        }
    }

    // ----- JSX --------------------------------------------------------

    /// An element or fragment; the opening `<` is already consumed.
    fn parse_jsx_element_or_fragment(&mut self, start: usize) -> Result<Expression, JsError> {
        if self.eat_punctuator(Punctuator::Gt)? {
            // Fragment: `<> children </>`
            let children = self.parse_jsx_children(start, None)?;
            return Ok(Expression::JsxFragment {
                children,
                span: self.finish_span(start),
            });
        }
        let name = self.parse_jsx_name(true)?;
        let mut attributes = Vec::new();
        loop {
            if self.check_punctuator(Punctuator::Gt)?
                || self.check_punctuator(Punctuator::Slash)?
            {
                break;
            }
            if self.check_punctuator(Punctuator::LBrace)? {
                let spread_start = self.start_offset()?;
                self.next()?;
                self.expect_punctuator(Punctuator::Spread)?;
                let argument = self.parse_assignment()?;
                self.expect_punctuator(Punctuator::RBrace)?;
                attributes.push(JsxAttribute::Spread {
                    argument,
                    span: self.finish_span(spread_start),
                });
                continue;
            }
            attributes.push(self.parse_jsx_attribute()?);
        }
        if self.eat_punctuator(Punctuator::Slash)? {
            self.expect_punctuator(Punctuator::Gt)?;
            return Ok(Expression::JsxElement {
                name,
                attributes,
                children: Vec::new(),
                self_closing: true,
                span: self.finish_span(start),
            });
        }
        self.expect_punctuator(Punctuator::Gt)?;
        let children = self.parse_jsx_children(start, Some(&name))?;
        Ok(Expression::JsxElement {
            name,
            attributes,
            children,
            self_closing: false,
            span: self.finish_span(start),
        })
    }

    /// Children in text mode up to the matching closing tag, which is
    /// consumed and verified here. `expected` is `None` for fragments.
    fn parse_jsx_children(
        &mut self,
        element_start: usize,
        expected: Option<&JsxName>,
    ) -> Result<Vec<JsxChild>, JsError> {
        let mut children = Vec::new();
        loop {
            let token = self.lexer.re_lex_jsx_text()?;
            self.last_end = token.span.end;
            match token.value {
                TokenValue::JsxText(value) => {
                    children.push(JsxChild::Text {
                        value,
                        span: token.span,
                    });
                }
                TokenValue::Punctuator(Punctuator::Lt) => {
                    if self.eat_punctuator(Punctuator::Slash)? {
                        // Closing tag
                        let closing = if self.check_punctuator(Punctuator::Gt)? {
                            None
                        } else {
                            Some(self.parse_jsx_name(true)?)
                        };
                        self.expect_punctuator(Punctuator::Gt)?;
                        let matches = match (expected, &closing) {
                            (None, None) => true,
                            (Some(open), Some(close)) => open.text() == close.text(),
                            _ => false,
                        };
                        if !matches {
                            let opening = expected.map(JsxName::text).unwrap_or_default();
                            return Err(syntax_error(
                                self.source,
                                token.span.start,
                                format!(
                                    "Expected corresponding JSX closing tag for `<{}>`",
                                    opening
                                ),
                            ));
                        }
                        return Ok(children);
                    }
                    let nested = self.parse_jsx_element_or_fragment(token.span.start)?;
                    children.push(JsxChild::Element(nested));
                }
                TokenValue::Punctuator(Punctuator::LBrace) => {
                    if self.check_punctuator(Punctuator::RBrace)? {
                        // `{}` containers hold nothing and are rejected
                        return self.fail();
                    }
                    let expr = self.parse_expression()?;
                    self.expect_punctuator(Punctuator::RBrace)?;
                    children.push(JsxChild::ExpressionContainer {
                        expr: Box::new(expr),
                        span: Span::new(token.span.start, self.last_end),
                    });
                }
                TokenValue::Eof => {
                    return Err(syntax_error(
                        self.source,
                        element_start,
                        "Unterminated JSX contents",
                    ));
                }
                _ => unreachable!(),
            }
        }
    }

    /// A JSX name: plain, namespaced (`ns:tag`, gated) or a member path
    /// (`a.b.c`, elements only).
    fn parse_jsx_name(&mut self, allow_member: bool) -> Result<JsxName, JsError> {
        let first = self.next_jsx_identifier()?;
        let (first_name, first_span) = first;
        if self.check_punctuator(Punctuator::Colon)? {
            if !self.features.contains(Features::JSX_NAMESPACES) {
                return self.fail();
            }
            self.next()?;
            let (name, name_span) = self.next_jsx_identifier()?;
            return Ok(JsxName::Namespaced {
                namespace: first_name,
                name,
                span: Span::new(first_span.start, name_span.end),
            });
        }
        let mut name = JsxName::Identifier {
            name: first_name,
            span: first_span,
        };
        if allow_member {
            while self.eat_punctuator(Punctuator::Dot)? {
                let (property, property_span) = self.next_jsx_identifier()?;
                let span = Span::new(first_span.start, property_span.end);
                name = JsxName::Member {
                    object: Box::new(name),
                    property,
                    span,
                };
            }
        }
        Ok(name)
    }

    fn next_jsx_identifier(&mut self) -> Result<(String, Span), JsError> {
        let token = self.lexer.re_lex_jsx_identifier()?;
        self.last_end = token.span.end;
        match token.value {
            TokenValue::Identifier { name, .. } => Ok((name, token.span)),
            _ => Err(unexpected_token(self.source, &token)),
        }
    }

    fn parse_jsx_attribute(&mut self) -> Result<JsxAttribute, JsError> {
        let (first_name, first_span) = self.next_jsx_identifier()?;
        let name = if self.check_punctuator(Punctuator::Colon)? {
            if !self.features.contains(Features::JSX_NAMESPACES) {
                return self.fail();
            }
            self.next()?;
            let (suffix, suffix_span) = self.next_jsx_identifier()?;
            JsxName::Namespaced {
                namespace: first_name,
                name: suffix,
                span: Span::new(first_span.start, suffix_span.end),
            }
        } else {
            JsxName::Identifier {
                name: first_name,
                span: first_span,
            }
        };
        let value = if self.eat_punctuator(Punctuator::Assign)? {
            Some(self.parse_jsx_attribute_value()?)
        } else {
            None
        };
        Ok(JsxAttribute::Named {
            name,
            value,
            span: Span::new(first_span.start, self.last_end),
        })
    }

    fn parse_jsx_attribute_value(&mut self) -> Result<JsxAttributeValue, JsError> {
        let token = self.lexer.re_lex_jsx_attribute_value()?;
        self.last_end = token.span.end;
        match token.value {
            // Attribute strings are raw text; JSX has no escape grammar
            TokenValue::String { value, .. } => Ok(JsxAttributeValue::String {
                value,
                span: token.span,
            }),
            TokenValue::Punctuator(Punctuator::LBrace) => {
                let expr = self.parse_assignment()?;
                self.expect_punctuator(Punctuator::RBrace)?;
                Ok(JsxAttributeValue::Expression {
                    expr: Box::new(expr),
                    span: Span::new(token.span.start, self.last_end),
                })
            }
            TokenValue::Punctuator(Punctuator::Lt) => {
                let element = self.parse_jsx_element_or_fragment(token.span.start)?;
                Ok(JsxAttributeValue::Element(Box::new(element)))
            }
            _ => Err(unexpected_token(self.source, &token)),
        }
    }

    // ----- type annotations -------------------------------------------

    /// The supported annotation subset: references with generic
    /// arguments, `[]` suffixes, unions and parenthesized types. The `:`
    /// is already consumed.
    fn parse_type_annotation(&mut self) -> Result<TypeAnnotation, JsError> {
        let start = self.start_offset()?;
        let first = self.parse_type_postfix()?;
        if !self.check_punctuator(Punctuator::Or)? {
            return Ok(first);
        }
        let mut parts = vec![first];
        while self.eat_punctuator(Punctuator::Or)? {
            parts.push(self.parse_type_postfix()?);
        }
        Ok(TypeAnnotation {
            kind: TypeKind::Union(parts),
            span: self.finish_span(start),
        })
    }

    fn parse_type_postfix(&mut self) -> Result<TypeAnnotation, JsError> {
        let start = self.start_offset()?;
        let mut annotation = self.parse_type_primary()?;
        while self.check_punctuator(Punctuator::LBracket)? {
            self.next()?;
            self.expect_punctuator(Punctuator::RBracket)?;
            annotation = TypeAnnotation {
                kind: TypeKind::Array(Box::new(annotation)),
                span: self.finish_span(start),
            };
        }
        Ok(annotation)
    }

    fn parse_type_primary(&mut self) -> Result<TypeAnnotation, JsError> {
        let start = self.start_offset()?;
        if self.eat_punctuator(Punctuator::LParen)? {
            let inner = self.parse_type_annotation()?;
            self.expect_punctuator(Punctuator::RParen)?;
            return Ok(TypeAnnotation {
                kind: TypeKind::Paren(Box::new(inner)),
                span: self.finish_span(start),
            });
        }
        let token = self.next()?;
        let mut name = match identifier_name_of(&token) {
            Some(name) => name,
            None => return Err(unexpected_token(self.source, &token)),
        };
        while self.eat_punctuator(Punctuator::Dot)? {
            let part = self.next()?;
            match identifier_name_of(&part) {
                Some(part_name) => {
                    name.push('.');
                    name.push_str(&part_name);
                }
                None => return Err(unexpected_token(self.source, &part)),
            }
        }
        let mut arguments = Vec::new();
        if self.eat_punctuator(Punctuator::Lt)? {
            loop {
                arguments.push(self.parse_type_annotation()?);
                if !self.eat_punctuator(Punctuator::Comma)? {
                    break;
                }
            }
            self.expect_type_gt()?;
        }
        Ok(TypeAnnotation {
            kind: TypeKind::Reference { name, arguments },
            span: self.finish_span(start),
        })
    }

    /// Close a generic argument list. Nested lists end in `>>` and
    /// friends, which the lexer splits one `>` at a time.
    fn expect_type_gt(&mut self) -> Result<(), JsError> {
        if self.eat_punctuator(Punctuator::Gt)? {
            return Ok(());
        }
        let splittable = matches!(
            self.peek()?.value,
            TokenValue::Punctuator(
                Punctuator::GtGt
                    | Punctuator::GtGtGt
                    | Punctuator::GtEq
                    | Punctuator::GtGtEq
                    | Punctuator::GtGtGtEq
            )
        );
        if splittable {
            let gt = self.lexer.re_lex_single_gt()?;
            self.last_end = gt.span.end;
            return Ok(());
        }
        self.fail()
    }

    // ----- token helpers ----------------------------------------------

    fn peek(&mut self) -> Result<&Token, JsError> {
        self.lexer.peek_token()
    }

    fn next(&mut self) -> Result<Token, JsError> {
        let token = self.lexer.next_token()?;
        self.last_end = token.span.end;
        Ok(token)
    }

    /// Start offset of the next token.
    fn start_offset(&mut self) -> Result<usize, JsError> {
        Ok(self.peek()?.span.start)
    }

    /// Span from `start` to the end of the last consumed token.
    fn finish_span(&self, start: usize) -> Span {
        Span::new(start, self.last_end.max(start))
    }

    fn at_end(&mut self) -> Result<bool, JsError> {
        Ok(self.peek()?.is_eof())
    }

    fn check_punctuator(&mut self, p: Punctuator) -> Result<bool, JsError> {
        Ok(self.peek()?.is_punctuator(p))
    }

    fn check_keyword(&mut self, k: Keyword) -> Result<bool, JsError> {
        Ok(self.peek()?.is_keyword(k))
    }

    /// An unescaped identifier with this exact text (`of`, `from`, `as`,
    /// `get`, `set`, ...).
    fn check_identifier(&mut self, name: &str) -> Result<bool, JsError> {
        Ok(self.peek()?.is_identifier_named(name))
    }

    fn eat_punctuator(&mut self, p: Punctuator) -> Result<bool, JsError> {
        if self.check_punctuator(p)? {
            self.next()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn eat_keyword(&mut self, k: Keyword) -> Result<bool, JsError> {
        if self.check_keyword(k)? {
            self.next()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn eat_contextual(&mut self, name: &str) -> Result<bool, JsError> {
        if self.check_identifier(name)? {
            self.next()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn expect_punctuator(&mut self, p: Punctuator) -> Result<Token, JsError> {
        if self.check_punctuator(p)? {
            return self.next();
        }
        self.fail()
    }

    fn expect_keyword(&mut self, k: Keyword) -> Result<Token, JsError> {
        if self.check_keyword(k)? {
            return self.next();
        }
        self.fail()
    }

    fn expect_contextual(&mut self, name: &str) -> Result<Token, JsError> {
        if self.check_identifier(name)? {
            return self.next();
        }
        self.fail()
    }

    /// Raise the unexpected-token diagnostic for the next token.
    fn fail<T>(&mut self) -> Result<T, JsError> {
        let token = self.peek()?.clone();
        Err(unexpected_token(self.source, &token))
    }

    /// The automatic semicolon insertion ladder: an explicit `;`, or a
    /// position where the grammar inserts one (`}`, end of input, or a
    /// token on a new line).
    fn consume_semicolon(&mut self) -> Result<(), JsError> {
        if self.eat_punctuator(Punctuator::Semicolon)? {
            return Ok(());
        }
        let token = self.peek()?;
        if token.is_eof() || token.is_punctuator(Punctuator::RBrace) || token.newline_before {
            return Ok(());
        }
        self.fail()
    }

    fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
        self.lexer.strict = strict;
    }

    fn can_await(&self) -> bool {
        if self.in_static_block {
            return false;
        }
        if self.in_async {
            return true;
        }
        self.function_depth == 0 && self.features.contains(Features::TOP_LEVEL_AWAIT)
    }

    /// The name of a token legal as an identifier reference in the
    /// current context, contextual keywords included.
    fn identifier_like_name(&self, token: &Token) -> Option<String> {
        match &token.value {
            TokenValue::Identifier { name, .. } => {
                if self.strict && STRICT_RESERVED.contains(&name.as_str()) {
                    return None;
                }
                Some(name.clone())
            }
            TokenValue::Keyword(k) => {
                let legal = match k {
                    Keyword::Async => true,
                    Keyword::Let | Keyword::Static => !self.strict,
                    Keyword::Yield => !self.strict && !self.in_generator,
                    Keyword::Await => !self.in_async && !self.in_static_block,
                    _ => false,
                };
                if legal {
                    Some(k.as_str().to_string())
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

// ----- free helpers ---------------------------------------------------

/// The text of an IdentifierName position, where keywords are ordinary
/// names (property keys, member names, import/export names).
fn identifier_name_of(token: &Token) -> Option<String> {
    match &token.value {
        TokenValue::Identifier { name, .. } => Some(name.clone()),
        TokenValue::Keyword(k) => Some(k.as_str().to_string()),
        _ => None,
    }
}

fn function_scope_kind(is_async: bool, is_generator: bool) -> FunctionKind {
    match (is_async, is_generator) {
        (true, true) => FunctionKind::AsyncGenerator,
        (true, false) => FunctionKind::Async,
        (false, true) => FunctionKind::Generator,
        (false, false) => FunctionKind::Normal,
    }
}

/// Every name bound by a pattern, in source order.
fn collect_pattern_names(pattern: &Pattern, names: &mut Vec<(String, Span)>) {
    match pattern {
        Pattern::Identifier { id, .. } => names.push((id.name.clone(), id.span)),
        Pattern::Object {
            properties, rest, ..
        } => {
            for property in properties {
                collect_pattern_names(&property.value, names);
            }
            if let Some(rest) = rest {
                collect_pattern_names(rest, names);
            }
        }
        Pattern::Array { elements, .. } => {
            for element in elements.iter().flatten() {
                collect_pattern_names(element, names);
            }
        }
        Pattern::Assignment { left, .. } => collect_pattern_names(left, names),
        Pattern::Rest { argument, .. } => collect_pattern_names(argument, names),
        Pattern::Member { .. } => {}
    }
}

/// Top-level names bound by an exported declaration.
fn declared_statement_names(statement: &Statement) -> Vec<(String, Span)> {
    let mut names = Vec::new();
    match statement {
        Statement::VariableDeclaration { declarations, .. } => {
            for declarator in declarations {
                collect_pattern_names(&declarator.id, &mut names);
            }
        }
        Statement::FunctionDeclaration(function) => {
            if let Some(name) = &function.name {
                names.push((name.name.clone(), name.span));
            }
        }
        Statement::ClassDeclaration(class) => {
            if let Some(name) = &class.name {
                names.push((name.name.clone(), name.span));
            }
        }
        _ => {}
    }
    names
}
