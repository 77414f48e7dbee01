#[cfg(test)]
mod tests;

mod expr;

use epsilang_ir::{CmpOp, Ident};
use epsilang_session::diagnostics::prelude::*;
use epsilang_utils::peek::Peek;

use crate::ast::*;
use crate::lexer::TokenIter;
use crate::token::{Keyword, Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

#[derive(serde::Serialize, thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("expected {expected}, found {found}")]
    Expected { expected: String, found: String },

    #[error("expected {expected}, found end of input")]
    UnexpectedEof { expected: String },

    #[error("`return` outside of a function body")]
    ReturnOutsideFunction,
}

impl IntoDiagnostic for ParseError {
    fn into_diagnostic(self) -> Diagnostic {
        Diagnostic::error()
            .with_message(format!("syntax error: {}", self.kind))
            .with_span(self.span)
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

pub struct Parser {
    tokens: TokenIter,
    errors: Vec<ParseError>,

    // nonzero while parsing a function body; gates `return`
    fn_depth: usize,
}

impl Parser {
    pub fn new(tokens: TokenIter) -> Self {
        Self {
            tokens,
            errors: vec![],
            fn_depth: 0,
        }
    }

    pub fn parse(mut self) -> (Module, Vec<ParseError>) {
        let mut stmts = vec![];

        while !self.tokens.at_end() {
            stmts.push(self.parse_statement_or_recover());
        }

        (Module { stmts }, self.errors)
    }

    fn parse_statement_or_recover(&mut self) -> Stmt {
        self.parse_or_recover(Self::parse_statement, |parser, _| {
            parser.recover_statement();
            Stmt::ParseError
        })
    }

    // always advances at least one token (unless at end), so that
    // recovery can never spin on the same input
    fn parse_statement(&mut self) -> ParseResult<Stmt> {
        match self.tokens.peek() {
            Some(t) if t.kind == TokenKind::Keyword(Keyword::Exit) => {
                self.tokens.next();
                self.parse_exit_stmt()
            }

            Some(t) if t.kind == TokenKind::Keyword(Keyword::Let) => {
                self.tokens.next();

                let ident = self.parse_ident()?;
                self.expect(TokenKind::Assign)?;
                let expr = self.parse_expr()?;
                self.expect_or_recover(TokenKind::Semicolon);

                Ok(Stmt::Let { ident, expr })
            }

            Some(t) if t.kind == TokenKind::Keyword(Keyword::If) => {
                self.parse_if_stmt().map(Stmt::If)
            }

            Some(t) if t.kind == TokenKind::Keyword(Keyword::While) => {
                self.tokens.next();

                self.expect(TokenKind::LParen)?;
                let cond = self.parse_cond()?;
                self.expect(TokenKind::RParen)?;
                let body = self.parse_block()?;

                Ok(Stmt::While { cond, body })
            }

            Some(t) if t.kind == TokenKind::Keyword(Keyword::Fn) => {
                self.tokens.next();
                self.parse_func_decl().map(Stmt::Func)
            }

            Some(t) if t.kind == TokenKind::Keyword(Keyword::Return) => {
                self.tokens.next();

                if self.fn_depth == 0 {
                    return Err(ParseError {
                        kind: ParseErrorKind::ReturnOutsideFunction,
                        span: t.span,
                    });
                }

                let expr = self.parse_expr()?;
                self.expect_or_recover(TokenKind::Semicolon);

                Ok(Stmt::Return(expr))
            }

            // an identifier at statement position is only legal as the
            // target of an assignment
            Some(Token {
                kind: TokenKind::Identifier(_),
                ..
            }) if matches!(
                self.tokens.peek_second(),
                Some(t) if t.kind == TokenKind::Assign
            ) =>
            {
                let ident = self.parse_ident()?;
                self.expect(TokenKind::Assign)?;
                let expr = self.parse_expr()?;
                self.expect_or_recover(TokenKind::Semicolon);

                Ok(Stmt::Assign { ident, expr })
            }

            Some(t) if matches!(t.kind, TokenKind::Integer(_) | TokenKind::LParen) => {
                let expr = self.parse_expr()?;
                self.expect_or_recover(TokenKind::Semicolon);

                Ok(Stmt::Expr(expr))
            }

            other => {
                self.tokens.next();
                Err(self.error_expected("a statement", other))
            }
        }
    }

    fn parse_exit_stmt(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::LParen)?;
        let expr = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        self.expect_or_recover(TokenKind::Semicolon);

        Ok(Stmt::Exit(expr))
    }

    fn parse_if_stmt(&mut self) -> ParseResult<IfStmt> {
        self.expect(TokenKind::Keyword(Keyword::If))?;

        self.expect(TokenKind::LParen)?;
        let cond = self.parse_cond()?;
        self.expect(TokenKind::RParen)?;

        let then_block = self.parse_block()?;

        let else_branch = if self.eat_kind(TokenKind::Keyword(Keyword::Else)) {
            let branch = match self.tokens.peek() {
                Some(t) if t.kind == TokenKind::Keyword(Keyword::If) => {
                    ElseBranch::If(self.parse_if_stmt()?)
                }
                _ => ElseBranch::Block(self.parse_block()?),
            };
            Some(Box::new(branch))
        } else {
            None
        };

        Ok(IfStmt {
            cond,
            then_block,
            else_branch,
        })
    }

    fn parse_func_decl(&mut self) -> ParseResult<FuncDecl> {
        let ident = self.parse_ident()?;

        self.expect(TokenKind::LParen)?;

        let mut params = vec![];
        if !self.eat_kind(TokenKind::RParen) {
            loop {
                params.push(self.parse_ident()?);
                if !self.eat_kind(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RParen)?;
        }

        self.fn_depth += 1;
        let body = self.parse_block();
        self.fn_depth -= 1;

        Ok(FuncDecl {
            ident,
            params,
            body: body?,
        })
    }

    /// A condition is an expression, optionally compared against a
    /// second one. Comparisons do not chain.
    fn parse_cond(&mut self) -> ParseResult<Cond> {
        let lhs = self.parse_expr()?;

        let op = match self.tokens.peek().map(|t| t.kind) {
            Some(TokenKind::Eq) => CmpOp::Eq,
            Some(TokenKind::Ne) => CmpOp::Ne,
            Some(TokenKind::Ge) => CmpOp::Ge,
            Some(TokenKind::Le) => CmpOp::Le,
            Some(TokenKind::Gt) => CmpOp::Gt,
            Some(TokenKind::Lt) => CmpOp::Lt,
            _ => return Ok(Cond::Expr(lhs)),
        };
        self.tokens.next();

        let rhs = self.parse_expr()?;
        Ok(Cond::Compare { op, lhs, rhs })
    }

    fn parse_block(&mut self) -> ParseResult<Block> {
        let start = self.tokens.peek_span();
        self.expect(TokenKind::LBrace)?;

        let mut stmts = vec![];
        while self
            .tokens
            .peek()
            .is_some_and(|t| t.kind != TokenKind::RBrace)
        {
            stmts.push(self.parse_statement_or_recover());
        }

        self.expect(TokenKind::RBrace)?;

        Ok(Block {
            stmts,
            span: Span::new(start.start, self.tokens.prev_span().end),
        })
    }

    fn parse_ident(&mut self) -> ParseResult<Ident> {
        match self.tokens.peek() {
            Some(Token {
                kind: TokenKind::Identifier(ident),
                span,
            }) => {
                self.tokens.next();
                Ok(Ident { ident, span })
            }
            other => Err(self.error_expected("an identifier", other)),
        }
    }

    fn parse_or_recover<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> ParseResult<T>,
        recover: impl FnOnce(&mut Self, Span) -> T,
    ) -> T {
        let span_start = self.tokens.peek_span();

        match parse(self) {
            Ok(node) => node,
            Err(err) => {
                self.report(err);

                let span_end = self.tokens.prev_span().end;
                recover(self, Span::new(span_start.start, span_end.max(span_start.start)))
            }
        }
    }

    /// Skip to the next statement boundary: consume through the next
    /// `;`, or stop short of a `}` so the enclosing block can close.
    fn recover_statement(&mut self) {
        loop {
            match self.tokens.peek() {
                None => return,
                Some(t) if t.kind == TokenKind::RBrace => return,
                Some(t) if t.kind == TokenKind::Semicolon => {
                    self.tokens.next();
                    return;
                }
                Some(_) => {
                    self.tokens.next();
                }
            }
        }
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        match self.tokens.peek() {
            Some(t) if t.kind == kind => {
                self.tokens.next();
                Ok(t)
            }

            other => Err(self.error_expected(kind.token_name(), other)),
        }
    }

    fn expect_or_recover(&mut self, kind: TokenKind) {
        if let Err(error) = self.expect(kind) {
            self.report(error);
        }
    }

    fn eat_kind(&mut self, kind: TokenKind) -> bool {
        match self.tokens.peek() {
            Some(t) if t.kind == kind => {
                self.tokens.next();
                true
            }
            _ => false,
        }
    }

    fn report(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    fn error_expected(&self, expected: impl Into<String>, found: Option<Token>) -> ParseError {
        match found {
            Some(token) => ParseError {
                kind: ParseErrorKind::Expected {
                    expected: expected.into(),
                    found: token.kind.token_name().to_owned(),
                },
                span: token.span,
            },
            None => ParseError {
                kind: ParseErrorKind::UnexpectedEof {
                    expected: expected.into(),
                },
                span: self.tokens.eof_span(),
            },
        }
    }
}
