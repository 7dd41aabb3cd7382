use super::ast::*;
use super::{parse, SourceFile};
use pretty_assertions::assert_eq;

fn parse_source(src: &str) -> Program {
    let source = SourceFile::new("test.nc", src);
    parse(&source).unwrap_or_else(|e| panic!("parse failed: {}", e))
}

fn parse_error(src: &str) -> String {
    let source = SourceFile::new("test.nc", src);
    parse(&source).expect_err("expected a parse error").message
}

fn only_expr(program: &Program) -> &Expr {
    assert_eq!(program.stmts.len(), 1, "expected a single statement");
    match &program.stmts[0] {
        Stmt::Expr { expr, .. } => expr,
        other => panic!("expected expression statement, got {:?}", other),
    }
}

#[test]
fn let_binding_with_annotation() {
    let program = parse_source("let mut count: Number = 0;");
    match &program.stmts[0] {
        Stmt::Let {
            name, ty, mutable, ..
        } => {
            assert_eq!(name, "count");
            assert_eq!(ty.as_deref(), Some("Number"));
            assert!(mutable);
        }
        other => panic!("expected let, got {:?}", other),
    }
}

#[test]
fn const_binding_is_immutable() {
    let program = parse_source("const PI = 3.14;");
    assert!(matches!(&program.stmts[0], Stmt::Const { name, .. } if name == "PI"));
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let program = parse_source("1 + 2 * 3");
    match only_expr(&program) {
        Expr::Binary { op, right, .. } => {
            assert_eq!(*op, BinaryOp::Add);
            assert!(matches!(
                right.as_ref(),
                Expr::Binary {
                    op: BinaryOp::Mul,
                    ..
                }
            ));
        }
        other => panic!("expected binary, got {:?}", other),
    }
}

#[test]
fn comparison_below_arithmetic_above_logic() {
    let program = parse_source("a + 1 < b && c");
    match only_expr(&program) {
        Expr::Binary { op, left, .. } => {
            assert_eq!(*op, BinaryOp::And);
            assert!(matches!(
                left.as_ref(),
                Expr::Binary {
                    op: BinaryOp::Lt,
                    ..
                }
            ));
        }
        other => panic!("expected binary, got {:?}", other),
    }
}

#[test]
fn unary_negation_nests() {
    let program = parse_source("!-x");
    match only_expr(&program) {
        Expr::Unary {
            op: UnaryOp::Not,
            operand,
            ..
        } => assert!(matches!(
            operand.as_ref(),
            Expr::Unary {
                op: UnaryOp::Neg,
                ..
            }
        )),
        other => panic!("expected unary, got {:?}", other),
    }
}

#[test]
fn if_else_chain_is_one_expression() {
    let program = parse_source("if a { 1 } else if b { 2 } else { 3 }");
    match only_expr(&program) {
        Expr::If {
            branches,
            else_block,
            ..
        } => {
            assert_eq!(branches.len(), 2);
            assert!(else_block.is_some());
        }
        other => panic!("expected if, got {:?}", other),
    }
}

#[test]
fn block_trailing_expression_is_its_value() {
    let program = parse_source("{ let x = 1; x + 1 }");
    match only_expr(&program) {
        Expr::Block { block, .. } => {
            assert_eq!(block.stmts.len(), 1);
            assert!(block.expr.is_some());
        }
        other => panic!("expected block, got {:?}", other),
    }
}

#[test]
fn missing_semicolon_mid_block_is_an_error() {
    let message = parse_error("{ let x = 1 let y = 2; }");
    assert!(message.contains("Semi"), "got: {}", message);
}

#[test]
fn single_param_lambda() {
    let program = parse_source("x => x * 2");
    match only_expr(&program) {
        Expr::Lambda { params, .. } => {
            assert_eq!(params.len(), 1);
            assert_eq!(params[0].name, "x");
        }
        other => panic!("expected lambda, got {:?}", other),
    }
}

#[test]
fn paren_param_lambda_with_block_body() {
    let program = parse_source("(a, b) => { a + b }");
    match only_expr(&program) {
        Expr::Lambda { params, body, .. } => {
            assert_eq!(params.len(), 2);
            assert!(body.expr.is_some());
        }
        other => panic!("expected lambda, got {:?}", other),
    }
}

#[test]
fn parenthesized_expression_is_not_a_lambda() {
    let program = parse_source("(a + b) * 2");
    assert!(matches!(
        only_expr(&program),
        Expr::Binary {
            op: BinaryOp::Mul,
            ..
        }
    ));
}

#[test]
fn list_comprehension_with_filter() {
    let program = parse_source("[x * x for x in numbers if x % 2 == 0]");
    match only_expr(&program) {
        Expr::ListComprehension {
            binding, filter, ..
        } => {
            assert_eq!(binding, "x");
            assert!(filter.is_some());
        }
        other => panic!("expected comprehension, got {:?}", other),
    }
}

#[test]
fn list_literal_allows_trailing_comma() {
    let program = parse_source("[1, 2, 3,]");
    match only_expr(&program) {
        Expr::List { elements, .. } => assert_eq!(elements.len(), 3),
        other => panic!("expected list, got {:?}", other),
    }
}

#[test]
fn inclusive_and_exclusive_ranges() {
    let program = parse_source("0..10");
    assert!(matches!(
        only_expr(&program),
        Expr::Range {
            inclusive: false,
            ..
        }
    ));

    let program = parse_source("1..=5");
    assert!(matches!(
        only_expr(&program),
        Expr::Range {
            inclusive: true,
            ..
        }
    ));
}

#[test]
fn struct_def_with_mutable_field_and_default() {
    let program = parse_source("struct Point { mut x: Number, y: Number = 0 }");
    match &program.stmts[0] {
        Stmt::StructDef(def) => {
            assert_eq!(def.name, "Point");
            assert_eq!(def.fields.len(), 2);
            assert!(def.fields[0].mutable);
            assert!(def.fields[1].default.is_some());
        }
        other => panic!("expected struct def, got {:?}", other),
    }
}

#[test]
fn struct_literal_requires_uppercase_name() {
    let program = parse_source("let p = Point { x: 1, y: 2 };");
    match &program.stmts[0] {
        Stmt::Let { value, .. } => match value.as_ref() {
            Expr::StructLiteral { name, fields, .. } => {
                assert_eq!(name, "Point");
                assert_eq!(fields.len(), 2);
            }
            other => panic!("expected struct literal, got {:?}", other),
        },
        other => panic!("expected let, got {:?}", other),
    }
}

#[test]
fn match_subject_braces_are_the_arm_block() {
    let program = parse_source("match x { 0 => \"zero\", n if n > 0 => \"pos\", _ => \"neg\" }");
    match only_expr(&program) {
        Expr::Match { arms, .. } => {
            assert_eq!(arms.len(), 3);
            assert!(matches!(arms[0].pattern, Pattern::Number { value, .. } if value == 0.0));
            assert!(arms[1].guard.is_some());
            assert!(matches!(arms[2].pattern, Pattern::Wildcard { .. }));
        }
        other => panic!("expected match, got {:?}", other),
    }
}

#[test]
fn result_patterns_nest() {
    let program = parse_source("match r { Ok(n) => n, Err(msg) => 0 }");
    match only_expr(&program) {
        Expr::Match { arms, .. } => {
            assert!(matches!(arms[0].pattern, Pattern::Ok { .. }));
            assert!(matches!(arms[1].pattern, Pattern::Err { .. }));
        }
        other => panic!("expected match, got {:?}", other),
    }
}

#[test]
fn result_constructors_short_and_long_form() {
    let program = parse_source("Ok(1)");
    assert!(matches!(only_expr(&program), Expr::OkCtor { .. }));

    let program = parse_source("Result::Err(\"boom\")");
    assert!(matches!(only_expr(&program), Expr::ErrCtor { .. }));
}

#[test]
fn method_call_vs_field_access() {
    let program = parse_source("p.x");
    assert!(matches!(only_expr(&program), Expr::FieldAccess { .. }));

    let program = parse_source("xs.map(x => x + 1)");
    match only_expr(&program) {
        Expr::MethodCall { method, args, .. } => {
            assert_eq!(method, "map");
            assert_eq!(args.len(), 1);
        }
        other => panic!("expected method call, got {:?}", other),
    }
}

#[test]
fn field_path_assignment() {
    let program = parse_source("p.x = 5;");
    match &program.stmts[0] {
        Stmt::Assign {
            target: AssignTarget::Field { field, .. },
            ..
        } => assert_eq!(field, "x"),
        other => panic!("expected field assignment, got {:?}", other),
    }
}

#[test]
fn call_result_is_not_an_assignment_target() {
    let message = parse_error("f() = 1;");
    assert!(message.contains("invalid assignment target"), "got: {}", message);
}

#[test]
fn async_fn_and_await() {
    let program = parse_source("async fn fetch() { await http.get(\"/x\") }");
    match &program.stmts[0] {
        Stmt::FnDef(def) => {
            assert!(def.is_async);
            assert!(matches!(
                def.body.expr.as_deref(),
                Some(Expr::Await { .. })
            ));
        }
        other => panic!("expected fn def, got {:?}", other),
    }
}

#[test]
fn async_block_expression() {
    let program = parse_source("let p = async { 1 + 2 };");
    match &program.stmts[0] {
        Stmt::Let { value, .. } => assert!(matches!(value.as_ref(), Expr::AsyncBlock { .. })),
        other => panic!("expected let, got {:?}", other),
    }
}

#[test]
fn template_parts_are_parsed_expressions() {
    let program = parse_source("`sum: ${a + b}`");
    match only_expr(&program) {
        Expr::Template { parts, .. } => {
            assert_eq!(parts.len(), 2);
            assert!(matches!(&parts[0], TemplatePart::Text { value } if value == "sum: "));
            match &parts[1] {
                TemplatePart::Expr { expr } => assert!(matches!(
                    expr.as_ref(),
                    Expr::Binary {
                        op: BinaryOp::Add,
                        ..
                    }
                )),
                other => panic!("expected expr part, got {:?}", other),
            }
        }
        other => panic!("expected template, got {:?}", other),
    }
}

#[test]
fn bad_template_interpolation_reports_the_template() {
    let message = parse_error("`${1 +}`");
    assert!(message.contains("template interpolation"), "got: {}", message);
}

#[test]
fn for_loop_over_range() {
    let program = parse_source("for i in 0..10 { print(i); }");
    match &program.stmts[0] {
        Stmt::For {
            binding, iterable, ..
        } => {
            assert_eq!(binding, "i");
            assert!(matches!(iterable.as_ref(), Expr::Range { .. }));
        }
        other => panic!("expected for, got {:?}", other),
    }
}

#[test]
fn loop_with_break_and_continue() {
    let program = parse_source("loop { if done { break; } continue; }");
    assert!(matches!(&program.stmts[0], Stmt::Loop { .. }));
}

#[test]
fn return_with_and_without_value() {
    let program = parse_source("fn f() { return 1; }\nfn g() { return; }");
    match (&program.stmts[0], &program.stmts[1]) {
        (Stmt::FnDef(f), Stmt::FnDef(g)) => {
            assert!(matches!(&f.body.stmts[0], Stmt::Return { value: Some(_), .. }));
            assert!(matches!(&g.body.stmts[0], Stmt::Return { value: None, .. }));
        }
        other => panic!("expected two fn defs, got {:?}", other),
    }
}

#[test]
fn index_expression() {
    let program = parse_source("xs[i + 1]");
    assert!(matches!(only_expr(&program), Expr::Index { .. }));
}

#[test]
fn spans_cover_whole_expressions() {
    let program = parse_source("1 + 2 * 3");
    let span = only_expr(&program).span();
    assert_eq!(span.start, 0);
    assert_eq!(span.end, 9);
}
