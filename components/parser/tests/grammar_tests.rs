//! Grammar and early-error fixture tests
//!
//! End-to-end fixtures over whole source units: tree shapes, span
//! properties, ASI and restricted productions, re-lexing of ambiguous
//! punctuation, feature gating and the early-error diagnostics with their
//! exact messages and positions.

use core_types::Span;
use parser::ast::{
    ArrowBody, BinaryOperator, Expression, Literal, Statement, VariableKind,
};
use parser::{parse_source, Features, Program};

fn parse(source: &str) -> Result<Program, core_types::JsError> {
    parse_source("fixture.js", source, Features::default())
}

fn parse_with(source: &str, features: Features) -> Result<Program, core_types::JsError> {
    parse_source("fixture.js", source, features)
}

fn first_expression(program: &Program) -> &Expression {
    match &program.body[0] {
        Statement::ExpressionStatement { expression, .. } => expression,
        other => panic!("expected expression statement, got {:?}", other),
    }
}

// =============================================================================
// Span Properties
// =============================================================================

#[test]
fn test_root_span_covers_input_exactly() {
    for source in [
        "",
        "let x = 1;",
        "function f(a) { return a * 2; }\nf(21);\n",
        "class C { #x = 1; get x() { return this.#x; } }",
    ] {
        let program = parse(source).unwrap();
        assert_eq!(
            program.span,
            Span::new(0, source.chars().count()),
            "source {:?}",
            source
        );
    }
}

#[test]
fn test_child_spans_contained_in_parent() {
    let program = parse("while (ready) { step(count, total); }").unwrap();
    match &program.body[0] {
        Statement::While { test, body, span } => {
            assert!(span.contains(test.span()));
            assert!(span.contains(body.span()));
        }
        other => panic!("unexpected statement {:?}", other),
    }
}

#[test]
fn test_sibling_spans_do_not_overlap() {
    let program = parse("let a = 1; let b = 2; let c = 3;").unwrap();
    assert_eq!(program.body.len(), 3);
    for pair in program.body.windows(2) {
        assert!(pair[0].span().end <= pair[1].span().start);
    }
}

#[test]
fn test_binary_operand_spans_ordered() {
    let program = parse("lo + hi").unwrap();
    match first_expression(&program) {
        Expression::Binary {
            left, right, span, ..
        } => {
            assert!(span.contains(left.span()));
            assert!(span.contains(right.span()));
            assert!(left.span().end <= right.span().start);
        }
        other => panic!("unexpected expression {:?}", other),
    }
}

// =============================================================================
// Literal Values
// =============================================================================

#[test]
fn test_radix_literal_round_trip() {
    for (source, expected) in [("0o12", 10.0), ("0b10", 2.0), ("00", 0.0), ("0xFF", 255.0)] {
        let program = parse(source).unwrap();
        match first_expression(&program) {
            Expression::Literal {
                value: Literal::Number(v),
                ..
            } => assert_eq!(*v, expected, "source {:?}", source),
            other => panic!("unexpected expression {:?}", other),
        }
    }
}

#[test]
fn test_string_cooked_and_raw() {
    let program = parse(r#"'a\tb!';"#).unwrap();
    match first_expression(&program) {
        Expression::Literal {
            value: Literal::String { value, raw },
            ..
        } => {
            assert_eq!(value, "a\tb!");
            assert_eq!(raw, r#"'a\tb!'"#);
        }
        other => panic!("unexpected expression {:?}", other),
    }
}

#[test]
fn test_bigint_suffix_on_legacy_octal() {
    let err = parse("let i = 02n").unwrap_err();
    assert_eq!(err.message, "Identifier directly after number");
    assert_eq!(err.position.line, 1);
    assert_eq!(err.position.column, 10);
}

#[test]
fn test_bigint_suffix_on_float() {
    let err = parse("x = 1.5n").unwrap_err();
    assert_eq!(err.message, "Identifier directly after number");
    assert_eq!(err.position.offset, 7);
}

// =============================================================================
// ASI and Restricted Productions
// =============================================================================

#[test]
fn test_asi_at_newline_brace_and_eof() {
    let program = parse("let a = 1\nlet b = 2").unwrap();
    assert_eq!(program.body.len(), 2);
    let program = parse("{ a() }").unwrap();
    assert_eq!(program.body.len(), 1);
    let program = parse("b()").unwrap();
    assert_eq!(program.body.len(), 1);
}

#[test]
fn test_return_argument_dropped_after_newline() {
    let program = parse("function f() { return\n1 }").unwrap();
    match &program.body[0] {
        Statement::FunctionDeclaration(function) => {
            assert_eq!(function.body.len(), 2);
            assert!(matches!(
                function.body[0],
                Statement::Return { argument: None, .. }
            ));
        }
        other => panic!("unexpected statement {:?}", other),
    }
}

#[test]
fn test_newline_after_throw_is_fatal() {
    let err = parse("throw\nnew Error()").unwrap_err();
    assert_eq!(err.message, "Illegal newline after throw");
    assert_eq!(err.position.line, 2);
}

#[test]
fn test_postfix_update_does_not_cross_newline() {
    let program = parse("a\n++\nb").unwrap();
    assert_eq!(program.body.len(), 2);
}

#[test]
fn test_missing_semicolon_without_newline() {
    let err = parse("let a = 1 let b = 2").unwrap_err();
    assert_eq!(err.message, "Unexpected token `let`");
}

// =============================================================================
// Re-lexing Ambiguous Punctuation
// =============================================================================

#[test]
fn test_slash_is_division_after_operand() {
    let program = parse("a / b / c").unwrap();
    match first_expression(&program) {
        Expression::Binary {
            operator: BinaryOperator::Divide,
            left,
            ..
        } => assert!(matches!(
            **left,
            Expression::Binary {
                operator: BinaryOperator::Divide,
                ..
            }
        )),
        other => panic!("unexpected expression {:?}", other),
    }
}

#[test]
fn test_slash_is_regex_at_operand_position() {
    let program = parse("x = /ab+c/gi;").unwrap();
    match first_expression(&program) {
        Expression::Assignment { right, .. } => match &**right {
            Expression::Literal {
                value: Literal::RegExp { pattern, flags },
                ..
            } => {
                assert_eq!(pattern, "ab+c");
                assert_eq!(flags, "gi");
            }
            other => panic!("unexpected expression {:?}", other),
        },
        other => panic!("unexpected expression {:?}", other),
    }
}

#[test]
fn test_template_re_entry_part_shapes() {
    let program = parse("`a${b}c${d}e`;").unwrap();
    match first_expression(&program) {
        Expression::TemplateLiteral {
            quasis,
            expressions,
            ..
        } => {
            assert_eq!(quasis.len(), 3);
            assert_eq!(expressions.len(), 2);
            assert_eq!(
                quasis.iter().map(|q| q.cooked.as_str()).collect::<Vec<_>>(),
                vec!["a", "c", "e"]
            );
            assert!(!quasis[0].tail);
            assert!(quasis[2].tail);
        }
        other => panic!("unexpected expression {:?}", other),
    }
}

#[test]
fn test_nested_template_substitution() {
    let program = parse("`a${`b${c}d`}e`;").unwrap();
    match first_expression(&program) {
        Expression::TemplateLiteral { expressions, .. } => {
            assert_eq!(expressions.len(), 1);
            assert!(matches!(
                expressions[0],
                Expression::TemplateLiteral { .. }
            ));
        }
        other => panic!("unexpected expression {:?}", other),
    }
}

#[test]
fn test_unterminated_template_reports_backtick() {
    let err = parse("x = `abc${y}").unwrap_err();
    assert_eq!(err.message, "Unterminated template literal");
}

// =============================================================================
// Arrow Cover Grammar
// =============================================================================

#[test]
fn test_paren_list_is_sequence_without_arrow() {
    let program = parse("(a, b);").unwrap();
    match first_expression(&program) {
        Expression::Parenthesized { expression, .. } => {
            assert!(matches!(**expression, Expression::Sequence { .. }));
        }
        other => panic!("unexpected expression {:?}", other),
    }
}

#[test]
fn test_paren_list_reinterpreted_as_arrow_params() {
    let program = parse("(a, { b = 1 }, ...rest) => a;").unwrap();
    match first_expression(&program) {
        Expression::Arrow(arrow) => {
            assert_eq!(arrow.params.len(), 3);
            assert!(matches!(arrow.body, ArrowBody::Expression(_)));
        }
        other => panic!("unexpected expression {:?}", other),
    }
}

#[test]
fn test_malformed_arrow_list_reported_at_arrow() {
    let source = "(a, b + 1) => a";
    let err = parse(source).unwrap_err();
    assert_eq!(err.message, "Malformed arrow function parameter list");
    assert_eq!(err.position.offset, source.find("=>").unwrap());
}

#[test]
fn test_async_paren_resolves_to_call_or_arrow() {
    let program = parse("async(a, b);").unwrap();
    assert!(matches!(first_expression(&program), Expression::Call { .. }));
    let program = parse("async (a, b) => a;").unwrap();
    match first_expression(&program) {
        Expression::Arrow(arrow) => assert!(arrow.is_async),
        other => panic!("unexpected expression {:?}", other),
    }
}

#[test]
fn test_typed_arrow_parameters_rewind() {
    let features = Features::default() | Features::TYPE_ANNOTATIONS;
    let program = parse_with("(items: Array<Item>, limit?: Number): Item[] => items;", features)
        .unwrap();
    match first_expression(&program) {
        Expression::Arrow(arrow) => {
            assert_eq!(arrow.params.len(), 2);
            assert!(arrow.return_type.is_some());
        }
        other => panic!("unexpected expression {:?}", other),
    }
    // Same feature set, no arrow: still a plain parenthesized sequence
    let program = parse_with("(a, b);", features).unwrap();
    assert!(matches!(
        first_expression(&program),
        Expression::Parenthesized { .. }
    ));
}

// =============================================================================
// Contextual Keywords and Function Kinds
// =============================================================================

#[test]
fn test_for_await_of_inside_async_function() {
    let program = parse("async function f() { for await (x of xs); }").unwrap();
    match &program.body[0] {
        Statement::FunctionDeclaration(function) => {
            assert!(function.is_async);
            assert!(matches!(
                function.body[0],
                Statement::ForOf { r#await: true, .. }
            ));
        }
        other => panic!("unexpected statement {:?}", other),
    }
}

#[test]
fn test_for_await_rejected_in_plain_function() {
    let err = parse("function f() { for await (x of xs); }").unwrap_err();
    assert_eq!(err.message, "`for await` is only valid in async functions");
}

#[test]
fn test_yield_in_generator_default_parameter() {
    let err = parse("function* g(a = yield 1) {}").unwrap_err();
    assert_eq!(
        err.message,
        "Yield expression cannot be used in function parameters"
    );
}

#[test]
fn test_await_is_an_identifier_outside_async() {
    let program = parse("function f(await) { return await; }").unwrap();
    assert_eq!(program.body.len(), 1);
    let err = parse("async function f(await) {}").unwrap_err();
    assert_eq!(err.message, "Unexpected token `await`");
}

#[test]
fn test_of_and_let_stay_contextual() {
    assert!(parse("let of = 1; for (of of of);").is_ok());
    assert!(parse("let let = 1;").is_err());
    assert!(parse("var let = 1;").is_ok());
}

// =============================================================================
// Strict Mode
// =============================================================================

#[test]
fn test_directive_enables_strict_octal_check() {
    let err = parse("'use strict';\nlet x = 017;").unwrap_err();
    assert_eq!(err.message, "Octal literals are not allowed in strict mode");
    assert_eq!(err.position.line, 2);
}

#[test]
fn test_escaped_directive_does_not_count() {
    // \x20 is a space; the raw text differs from "use strict"
    assert!(parse("'use\\x20strict';\nlet x = 017;").is_ok());
}

#[test]
fn test_class_bodies_are_always_strict() {
    let err = parse("class C { m() { return 017; } }").unwrap_err();
    assert_eq!(err.message, "Octal literals are not allowed in strict mode");
}

#[test]
fn test_strict_feature_applies_to_whole_program() {
    let err = parse_with("with (x) {}", Features::default() | Features::STRICT).unwrap_err();
    assert_eq!(err.message, "`with` statements are not allowed in strict mode");
    assert!(parse("with (x) {}").is_ok());
}

#[test]
fn test_strict_rejects_eval_binding() {
    let err = parse("'use strict'; var eval = 1;").unwrap_err();
    assert_eq!(err.message, "Binding `eval` in strict mode");
}

#[test]
fn test_use_strict_with_non_simple_params() {
    let err = parse("function f(a = 1) { 'use strict'; }").unwrap_err();
    assert_eq!(
        err.message,
        "Illegal `use strict` directive in function with non-simple parameter list"
    );
}

// =============================================================================
// Declarations and Scopes
// =============================================================================

#[test]
fn test_duplicate_let_reported_at_second_site() {
    let err = parse("let x = 1;\nlet x = 2;").unwrap_err();
    assert_eq!(err.message, "Identifier `x` has already been declared");
    assert_eq!(err.position.line, 2);
    assert_eq!(err.position.column, 4);
}

#[test]
fn test_block_scoping_allows_shadowing() {
    assert!(parse("let x = 1; { let x = 2; }").is_ok());
    assert!(parse("function f(a) { { let a = 1; } }").is_ok());
}

#[test]
fn test_var_conflicts_with_outer_let_through_blocks() {
    let err = parse("let x; { { var x; } }").unwrap_err();
    assert_eq!(err.message, "Identifier `x` has already been declared");
}

#[test]
fn test_catch_parameter_conflicts_with_handler_let() {
    let err = parse("try { f(); } catch (e) { let e; }").unwrap_err();
    assert_eq!(err.message, "Identifier `e` has already been declared");
    assert!(parse("try { f(); } catch { g(); }").is_ok());
}

#[test]
fn test_import_binding_conflicts_with_let() {
    let err = parse("import x from 'mod';\nlet x;").unwrap_err();
    assert_eq!(err.message, "Identifier `x` has already been declared");
}

// =============================================================================
// Classes and Private Names
// =============================================================================

#[test]
fn test_duplicate_private_name_at_second_span() {
    let source = "class C { #a; #a }";
    let err = parse(source).unwrap_err();
    assert_eq!(err.message, "Identifier `#a` has already been declared");
    assert_eq!(err.position.offset, source.rfind("#a").unwrap());
}

#[test]
fn test_private_name_static_mismatch_conflicts() {
    let err = parse("class C { static #a; #a }").unwrap_err();
    assert_eq!(err.message, "Identifier `#a` has already been declared");
    let err = parse("class C { static get #a() {} set #a(v) {} }").unwrap_err();
    assert_eq!(err.message, "Identifier `#a` has already been declared");
    assert!(parse("class C { get #a() {} set #a(v) {} }").is_ok());
}

#[test]
fn test_private_reference_outside_any_class() {
    let err = parse("obj.#aaa").unwrap_err();
    assert_eq!(
        err.message,
        "Private field `#aaa` must be declared in an enclosing class"
    );
    assert_eq!(err.position.offset, 4);
}

#[test]
fn test_private_reference_resolves_in_enclosing_class() {
    assert!(parse("class A { #x; inner() { return class { probe(a) { return a.#x; } }; } }")
        .is_ok());
    let err =
        parse("class A { inner() { return class { probe(a) { return a.#missing; } }; } }")
            .unwrap_err();
    assert_eq!(
        err.message,
        "Private field `#missing` must be declared in an enclosing class"
    );
}

#[test]
fn test_private_names_visible_in_static_block_closures() {
    assert!(parse("class C { static #x = 1; static { (() => C.#x)(); } }").is_ok());
}

#[test]
fn test_brand_check_and_delete_rules() {
    assert!(parse("class C { #x; has(o) { return #x in o; } }").is_ok());
    let err = parse("class C { #x; m(o) { delete o.#x; } }").unwrap_err();
    assert_eq!(err.message, "Private fields can not be deleted");
}

#[test]
fn test_constructor_restrictions() {
    let err = parse("class C { constructor() {} constructor() {} }").unwrap_err();
    assert_eq!(err.message, "Duplicate constructor in the same class");
    let err = parse("class C { *constructor() {} }").unwrap_err();
    assert_eq!(err.message, "Class constructor may not be a generator");
    let err = parse("class C { get constructor() {} }").unwrap_err();
    assert_eq!(err.message, "Class constructor may not be an accessor");
    let err = parse("class C { constructor = 1 }").unwrap_err();
    assert_eq!(err.message, "Classes may not have a field named `constructor`");
}

#[test]
fn test_static_prototype_rejected() {
    let err = parse("class C { static prototype() {} }").unwrap_err();
    assert_eq!(
        err.message,
        "Classes may not have a static property named `prototype`"
    );
}

#[test]
fn test_super_placement() {
    assert!(parse("class A extends B { constructor() { super(); } }").is_ok());
    let err = parse("class A { constructor() { super(); } }").unwrap_err();
    assert_eq!(err.message, "`super` keyword unexpected here");
    let err =
        parse("class A extends B { constructor() { function f() { super(); } } }").unwrap_err();
    assert_eq!(err.message, "`super` keyword unexpected here");
    assert!(parse("class A extends B { m() { return super.m(); } }").is_ok());
}

// =============================================================================
// Modules
// =============================================================================

#[test]
fn test_export_clause_requires_local_binding() {
    let err = parse("export { encrypt }").unwrap_err();
    assert_eq!(err.message, "Export `encrypt` is not defined");
    assert!(parse("export { encrypt }; function encrypt() {}").is_ok());
}

#[test]
fn test_duplicate_export_across_clause_forms() {
    let err = parse("export let key = 1;\nlet other = 2;\nexport { other as key };").unwrap_err();
    assert_eq!(err.message, "Duplicate export `key`");
    assert_eq!(err.position.line, 3);
}

#[test]
fn test_duplicate_export_between_two_clauses() {
    let err = parse("let a = 1; export { a }; export { a };").unwrap_err();
    assert_eq!(err.message, "Duplicate export `a`");
}

#[test]
fn test_export_default_skips_local_name_checks() {
    assert!(parse("export default function () {}").is_ok());
    assert!(parse("export default missing;").is_ok());
    let err = parse("export default 1; export default 2;").unwrap_err();
    assert_eq!(err.message, "Duplicate export `default`");
}

#[test]
fn test_reexport_clause_skips_local_name_checks() {
    assert!(parse("export { missing } from 'mod';").is_ok());
    assert!(parse("export * as ns from 'mod';").is_ok());
}

#[test]
fn test_import_forms() {
    assert!(parse("import 'side-effect';").is_ok());
    assert!(parse("import d from 'mod';").is_ok());
    assert!(parse("import * as ns from 'mod';").is_ok());
    assert!(parse("import d, { a, b as c } from 'mod';").is_ok());
    let err = parse("import { default } from 'mod';").unwrap_err();
    assert_eq!(err.message, "Unexpected token `default`");
}

// =============================================================================
// Feature Gates
// =============================================================================

#[test]
fn test_dynamic_import_gate() {
    assert!(parse("import('x')").is_ok());
    let err = parse_with("import('x')", Features::default() & !Features::DYNAMIC_IMPORT)
        .unwrap_err();
    assert_eq!(err.message, "Unexpected token `(`");
    assert_eq!(err.position.line, 1);
    assert_eq!(err.position.column, 6);
}

#[test]
fn test_bigint_gate() {
    assert!(parse("let x = 10n;").is_ok());
    let err = parse_with("let x = 10n;", Features::default() & !Features::BIGINT).unwrap_err();
    assert_eq!(err.message, "Identifier directly after number");
}

#[test]
fn test_logical_assignment_gate() {
    assert!(parse("a ??= b").is_ok());
    assert!(parse_with("a ??= b", Features::default() & !Features::LOGICAL_ASSIGNMENT).is_err());
}

#[test]
fn test_private_fields_gate() {
    assert!(parse("class C { #x }").is_ok());
    let err = parse_with(
        "class C { #x }",
        Features::default() & !Features::CLASS_PRIVATE_FIELDS,
    )
    .unwrap_err();
    assert_eq!(err.message, "Unexpected character '#'");
}

#[test]
fn test_public_fields_gate() {
    assert!(parse("class C { x = 1 }").is_ok());
    assert!(parse_with(
        "class C { x = 1 }",
        Features::default() & !Features::CLASS_PUBLIC_FIELDS
    )
    .is_err());
}

#[test]
fn test_static_block_gate() {
    assert!(parse("class C { static { init(); } }").is_ok());
    assert!(parse_with(
        "class C { static { init(); } }",
        Features::default() & !Features::CLASS_STATIC_BLOCKS
    )
    .is_err());
}

#[test]
fn test_top_level_await_gate() {
    assert!(parse("await f();").is_ok());
    // With the feature off, `await` is an ordinary identifier at top level
    let program =
        parse_with("await;", Features::default() & !Features::TOP_LEVEL_AWAIT).unwrap();
    assert!(matches!(
        first_expression(&program),
        Expression::Identifier(_)
    ));
}

#[test]
fn test_json_strings_gate() {
    let source = "let s = 'a\u{2028}b';";
    assert!(parse(source).is_ok());
    let err = parse_with(source, Features::default() & !Features::JSON_STRINGS).unwrap_err();
    assert_eq!(err.message, "Unterminated string constant");
    assert_eq!(err.position.offset, 8);
}

// =============================================================================
// JSX
// =============================================================================

#[test]
fn test_jsx_disabled_by_default() {
    assert!(parse("<div/>").is_err());
}

#[test]
fn test_jsx_nesting_and_text() {
    let features = Features::default() | Features::JSX;
    let program = parse_with("<ul>item <li>{x}</li> tail</ul>", features).unwrap();
    match first_expression(&program) {
        Expression::JsxElement { name, children, .. } => {
            assert_eq!(name.text(), "ul");
            assert_eq!(children.len(), 3);
        }
        other => panic!("unexpected expression {:?}", other),
    }
}

#[test]
fn test_jsx_fragment() {
    let features = Features::default() | Features::JSX;
    let program = parse_with("<>a<b/></>", features).unwrap();
    match first_expression(&program) {
        Expression::JsxFragment { children, .. } => assert_eq!(children.len(), 2),
        other => panic!("unexpected expression {:?}", other),
    }
}

#[test]
fn test_adjacent_jsx_elements_rejected() {
    let features = Features::default() | Features::JSX;
    let source = "<a/> <b/>";
    let err = parse_with(source, features).unwrap_err();
    assert_eq!(
        err.message,
        "Adjacent JSX elements must be wrapped in an enclosing tag"
    );
    assert_eq!(err.position.offset, source.find("<b").unwrap());
}

#[test]
fn test_jsx_closing_tag_must_match() {
    let features = Features::default() | Features::JSX;
    let err = parse_with("<div>text</span>", features).unwrap_err();
    assert_eq!(
        err.message,
        "Expected corresponding JSX closing tag for `<div>`"
    );
}

#[test]
fn test_jsx_namespace_gate_at_colon() {
    let jsx_only = Features::default() | Features::JSX;
    let err = parse_with("<svg:rect/>", jsx_only).unwrap_err();
    assert_eq!(err.message, "Unexpected token `:`");
    assert_eq!(err.position.offset, 4);
    assert!(parse_with("<svg:rect/>", jsx_only | Features::JSX_NAMESPACES).is_ok());
}

#[test]
fn test_jsx_empty_expression_container_rejected() {
    let features = Features::default() | Features::JSX;
    assert!(parse_with("<a>{}</a>", features).is_err());
    assert!(parse_with("<a>{x}</a>", features).is_ok());
}

// =============================================================================
// Operators
// =============================================================================

#[test]
fn test_logical_assignment_right_associative() {
    let program = parse("a &&= b ||= c ??= d").unwrap();
    let Expression::Assignment { right, .. } = first_expression(&program) else {
        panic!("expected assignment");
    };
    let Expression::Assignment { right, .. } = &**right else {
        panic!("expected nested assignment");
    };
    assert!(matches!(&**right, Expression::Assignment { .. }));
}

#[test]
fn test_nullish_must_be_parenthesized_with_logical() {
    assert!(parse("a ?? b || c").is_err());
    assert!(parse("a || b ?? c").is_err());
    assert!(parse("(a ?? b) || c").is_ok());
    assert!(parse("a ?? (b || c)").is_ok());
}

#[test]
fn test_exponent_unary_base_needs_parens() {
    assert!(parse("-a ** 2").is_err());
    assert!(parse("(-a) ** 2").is_ok());
    assert!(parse("2 ** -a").is_ok());
}

#[test]
fn test_optional_chain_and_calls() {
    assert!(parse("a?.b.c?.['d']?.(1, 2)").is_ok());
    assert!(parse("new C(a)?.b").is_ok());
}

#[test]
fn test_in_operator_suppressed_in_for_head() {
    let program = parse("for (k in o);").unwrap();
    assert!(matches!(program.body[0], Statement::ForIn { .. }));
    let program = parse("if (k in o);").unwrap();
    match &program.body[0] {
        Statement::If { test, .. } => assert!(matches!(
            test,
            Expression::Binary {
                operator: BinaryOperator::In,
                ..
            }
        )),
        other => panic!("unexpected statement {:?}", other),
    }
}

// =============================================================================
// Statements
// =============================================================================

#[test]
fn test_labeled_break_and_continue() {
    assert!(parse("outer: for (;;) { inner: for (;;) { continue outer; } break outer; }").is_ok());
    let err = parse("a: { continue a; }").unwrap_err();
    assert_eq!(err.message, "Invalid continue label `a`");
    let err = parse("break;").unwrap_err();
    assert_eq!(err.message, "Illegal break statement");
}

#[test]
fn test_switch_single_default() {
    assert!(parse("switch (x) { case 1: a(); default: b(); }").is_ok());
    let err = parse("switch (x) { default: a(); default: b(); }").unwrap_err();
    assert_eq!(err.message, "More than one default clause in switch statement");
}

#[test]
fn test_variable_declaration_shapes() {
    let program = parse("const { a, b: [c] } = src, d = 2;").unwrap();
    match &program.body[0] {
        Statement::VariableDeclaration {
            kind, declarations, ..
        } => {
            assert_eq!(*kind, VariableKind::Const);
            assert_eq!(declarations.len(), 2);
        }
        other => panic!("unexpected statement {:?}", other),
    }
    let err = parse("const x;").unwrap_err();
    assert_eq!(err.message, "Missing initializer in const declaration");
}

#[test]
fn test_trailing_tokens_after_program_rejected() {
    let err = parse("let x = 1; )").unwrap_err();
    assert_eq!(err.message, "Unexpected token `)`");
}
