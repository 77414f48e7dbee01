use epsilang_ir::{BinOp, Ident};
use epsilang_utils::peek::Peek;

use super::{ParseResult, Parser};
use crate::ast::*;
use crate::token::*;

/// Precedence tiers of the arithmetic grammar: additive operators bind
/// loosest, multiplicative tightest. Both tiers are left-associative.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Prec {
    Lowest,
    Term,
    Factor,
}

fn binop_prec(binop: BinOp) -> Prec {
    match binop {
        BinOp::Add | BinOp::Sub => Prec::Term,
        BinOp::Mul | BinOp::Div => Prec::Factor,
    }
}

impl Parser {
    pub(crate) fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_prec(Prec::Lowest)
    }

    fn parse_prec(&mut self, prec: Prec) -> ParseResult<Expr> {
        let mut expr = self.parse_factor()?;

        while let Some(op) = self.peek_bin_op(prec) {
            self.tokens.next();

            let rhs = self.parse_prec(binop_prec(op))?;

            let span = expr.span.union(rhs.span);
            expr = Expr::new(
                ExprKind::BinOp {
                    op,
                    lhs: Box::new(expr),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }

        Ok(expr)
    }

    /// An atom: integer literal, identifier reference, call, or a
    /// parenthesized expression. One token of lookahead after an
    /// identifier decides reference vs call.
    fn parse_factor(&mut self) -> ParseResult<Expr> {
        match self.tokens.peek() {
            Some(Token {
                kind: TokenKind::Integer(n),
                span,
            }) => {
                self.tokens.next();
                Ok(Expr::new(ExprKind::Integer(n), span))
            }

            Some(Token {
                kind: TokenKind::Identifier(ident),
                span,
            }) => {
                self.tokens.next();
                let ident = Ident { ident, span };

                if self.eat_kind(TokenKind::LParen) {
                    self.parse_call(ident)
                } else {
                    Ok(Expr::new(ExprKind::Var(ident), span))
                }
            }

            Some(t) if t.kind == TokenKind::LParen => {
                self.tokens.next();

                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;

                Ok(expr)
            }

            other => Err(self.error_expected("an expression", other)),
        }
    }

    // the callee name and its `(` are already consumed
    fn parse_call(&mut self, callee: Ident) -> ParseResult<Expr> {
        let mut args = vec![];

        if !self.eat_kind(TokenKind::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if !self.eat_kind(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RParen)?;
        }

        let span = callee.span.union(self.tokens.prev_span());
        Ok(Expr::new(ExprKind::Call { callee, args }, span))
    }

    fn peek_bin_op(&self, in_prec: Prec) -> Option<BinOp> {
        let op = match self.tokens.peek().map(|t| t.kind)? {
            TokenKind::Add => BinOp::Add,
            TokenKind::Sub => BinOp::Sub,
            TokenKind::Mul => BinOp::Mul,
            TokenKind::Div => BinOp::Div,

            _ => return None,
        };

        (binop_prec(op) > in_prec).then_some(op)
    }
}
