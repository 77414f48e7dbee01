use epsilang_session::Interner;

use super::{ParseError, ParseErrorKind, Parser};
use crate::ast::*;
use crate::lexer::Lexer;

fn parse(source: &str) -> (Module, Vec<ParseError>, Interner) {
    let mut interner = Interner::new();

    let (tokens, lexer_errors) = Lexer::new(source, &mut interner).lex();
    assert!(lexer_errors.is_empty(), "lexer errors in parser tests");

    let (module, errors) = Parser::new(tokens).parse();
    (module, errors, interner)
}

fn parse_ok(source: &str) -> (Module, Interner) {
    let (module, errors, interner) = parse(source);
    assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
    (module, interner)
}

/// Renders an expression tree with names but without spans, so that
/// sources differing only in grouping can be compared.
fn shape(expr: &Expr, interner: &Interner) -> String {
    match &expr.kind {
        ExprKind::Integer(n) => n.to_string(),
        ExprKind::Var(ident) => interner.resolve(&ident.ident).to_owned(),
        ExprKind::BinOp { op, lhs, rhs } => format!(
            "({op:?} {} {})",
            shape(lhs, interner),
            shape(rhs, interner)
        ),
        ExprKind::Call { callee, args } => {
            let mut out = format!("(call {}", interner.resolve(&callee.ident));
            for arg in args {
                out.push(' ');
                out.push_str(&shape(arg, interner));
            }
            out.push(')');
            out
        }
        ExprKind::ParseError => "<error>".to_owned(),
    }
}

fn exit_shape(source: &str) -> String {
    let (module, interner) = parse_ok(source);
    match &module.stmts[..] {
        [Stmt::Exit(expr)] => shape(expr, &interner),
        other => panic!("expected a single exit statement, got {other:?}"),
    }
}

#[test]
fn precedence_groups_like_explicit_parens() {
    assert_eq!(exit_shape("exit(x + y * z);"), "(Add x (Mul y z))");
    assert_eq!(exit_shape("exit(x + (y * z));"), "(Add x (Mul y z))");
}

#[test]
fn subtraction_left_associates() {
    assert_eq!(exit_shape("exit(a - b - c);"), "(Sub (Sub a b) c)");
}

#[test]
fn same_tier_operators_left_associate() {
    assert_eq!(exit_shape("exit(a / b * c);"), "(Mul (Div a b) c)");
    assert_eq!(exit_shape("exit(a + b - c);"), "(Sub (Add a b) c)");
}

#[test]
fn parens_override_precedence() {
    assert_eq!(exit_shape("exit((x + y) * z);"), "(Mul (Add x y) z)");
}

#[test]
fn call_arguments() {
    assert_eq!(exit_shape("exit(add(2, 3));"), "(call add 2 3)");
    assert_eq!(exit_shape("exit(f());"), "(call f)");
    assert_eq!(
        exit_shape("exit(f(g(1), 2 + 3));"),
        "(call f (call g 1) (Add 2 3))"
    );
}

#[test]
fn trailing_comma_in_arguments_rejected() {
    let (_, errors, _) = parse("exit(f(1,));");
    assert!(!errors.is_empty());
}

#[test]
fn let_statement() {
    let (module, _) = parse_ok("let x = 5;");
    assert!(matches!(&module.stmts[..], [Stmt::Let { .. }]));
}

#[test]
fn assignment_statement() {
    let (module, _) = parse_ok("x = x + 1;");
    assert!(matches!(&module.stmts[..], [Stmt::Assign { .. }]));
}

#[test]
fn bare_identifier_statement_rejected() {
    let (_, errors, _) = parse("x;");
    assert!(!errors.is_empty());
}

#[test]
fn bare_call_statement_rejected() {
    let (_, errors, _) = parse("f();");
    assert!(!errors.is_empty());
}

#[test]
fn if_else_chain() {
    let (module, _) = parse_ok(
        "if (a == b) { exit(1); } else if (a < b) { exit(2); } else { exit(0); }",
    );

    let Stmt::If(if_stmt) = &module.stmts[0] else {
        panic!("expected an if statement");
    };
    assert!(matches!(if_stmt.cond, Cond::Compare { .. }));
    assert_eq!(if_stmt.then_block.stmts.len(), 1);

    let ElseBranch::If(else_if) = if_stmt.else_branch.as_deref().unwrap() else {
        panic!("expected an else-if");
    };
    assert!(matches!(
        else_if.else_branch.as_deref(),
        Some(ElseBranch::Block(_))
    ));
}

#[test]
fn if_without_else() {
    let (module, _) = parse_ok("if (x != 0) { exit(1); }");

    let Stmt::If(if_stmt) = &module.stmts[0] else {
        panic!("expected an if statement");
    };
    assert!(if_stmt.else_branch.is_none());
}

#[test]
fn bare_condition() {
    let (module, _) = parse_ok("if (x) { exit(1); }");

    let Stmt::If(if_stmt) = &module.stmts[0] else {
        panic!("expected an if statement");
    };
    assert!(matches!(if_stmt.cond, Cond::Expr(_)));
}

#[test]
fn while_statement() {
    let (module, _) = parse_ok("while (i < 10) { i = i + 1; }");

    let Stmt::While { cond, body } = &module.stmts[0] else {
        panic!("expected a while statement");
    };
    assert!(matches!(cond, Cond::Compare { op: epsilang_ir::CmpOp::Lt, .. }));
    assert!(matches!(&body.stmts[..], [Stmt::Assign { .. }]));
}

#[test]
fn function_definition() {
    let (module, _) = parse_ok("fn add(a, b) { return a + b; }");

    let Stmt::Func(func) = &module.stmts[0] else {
        panic!("expected a function definition");
    };
    assert_eq!(func.params.len(), 2);
    assert!(matches!(&func.body.stmts[..], [Stmt::Return(_)]));
}

#[test]
fn function_with_no_parameters() {
    let (module, _) = parse_ok("fn five() { return 5; }");

    let Stmt::Func(func) = &module.stmts[0] else {
        panic!("expected a function definition");
    };
    assert!(func.params.is_empty());
}

#[test]
fn nested_function_parses() {
    // rejected later by the declaration pass, but grammatically fine
    let (module, _) = parse_ok("fn f() { fn g() { return 1; } return 2; }");

    let Stmt::Func(func) = &module.stmts[0] else {
        panic!("expected a function definition");
    };
    assert!(matches!(func.body.stmts[0], Stmt::Func(_)));
}

#[test]
fn return_outside_function_rejected() {
    let (module, errors, _) = parse("return 5;");

    assert!(errors
        .iter()
        .any(|e| e.kind == ParseErrorKind::ReturnOutsideFunction));
    assert!(matches!(&module.stmts[..], [Stmt::ParseError]));
}

#[test]
fn recovery_skips_to_next_statement() {
    let (module, errors, _) = parse("let = 5; exit(0);");

    assert_eq!(errors.len(), 1);
    assert!(matches!(&module.stmts[..], [Stmt::ParseError, Stmt::Exit(_)]));
}

#[test]
fn recovery_inside_block() {
    let (module, errors, _) = parse("if (a == b) { let = 1; exit(2); }");

    assert_eq!(errors.len(), 1);

    let Stmt::If(if_stmt) = &module.stmts[0] else {
        panic!("expected an if statement");
    };
    assert!(matches!(
        &if_stmt.then_block.stmts[..],
        [Stmt::ParseError, Stmt::Exit(_)]
    ));
}

#[test]
fn missing_closing_brace() {
    let (_, errors, _) = parse("fn f() { return 1;");
    assert!(!errors.is_empty());
}

#[test]
fn missing_semicolon_still_produces_statement() {
    let (module, errors, _) = parse("exit(0)");

    assert_eq!(errors.len(), 1);
    assert!(matches!(&module.stmts[..], [Stmt::Exit(_)]));
}

#[test]
fn expression_statement() {
    let (module, _) = parse_ok("1 + 2;");
    assert!(matches!(&module.stmts[..], [Stmt::Expr(_)]));
}
