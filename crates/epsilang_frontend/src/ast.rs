use epsilang_ir::{BinOp, CmpOp, Ident};
use epsilang_session::span::Span;

use crate::Node;

/// One parsed source file: the ordered top-level statements.
#[derive(Node!, Default)]
pub struct Module {
    pub stmts: Vec<Stmt>,
}

#[derive(Node!)]
pub enum Stmt {
    Exit(Expr),
    Let { ident: Ident, expr: Expr },
    Assign { ident: Ident, expr: Expr },
    If(IfStmt),
    While { cond: Cond, body: Block },
    Func(FuncDecl),
    Return(Expr),
    Expr(Expr),

    ParseError,
}

/// A function definition. The body is its own field rather than a
/// generic block statement so the two cannot be confused downstream.
#[derive(Node!)]
pub struct FuncDecl {
    pub ident: Ident,
    pub params: Vec<Ident>,
    pub body: Block,
}

#[derive(Node!)]
pub struct IfStmt {
    pub cond: Cond,
    pub then_block: Block,
    pub else_branch: Option<Box<ElseBranch>>,
}

/// The `else` child is either another `if` (an `else if` chain) or a
/// plain block.
#[derive(Node!)]
pub enum ElseBranch {
    If(IfStmt),
    Block(Block),
}

/// An `if`/`while` condition. Comparisons appear only here and are not
/// chainable; a bare expression is tested against zero.
#[derive(Node!)]
pub enum Cond {
    Compare { op: CmpOp, lhs: Expr, rhs: Expr },
    Expr(Expr),
}

#[derive(Node!)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Node!)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Node!)]
pub enum ExprKind {
    Integer(i64),
    Var(Ident),

    BinOp {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    Call {
        callee: Ident,
        args: Vec<Expr>,
    },

    ParseError,
}
