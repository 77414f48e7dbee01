#[cfg(test)]
mod tests;

use std::str::Chars;

use epsilang_session::diagnostics::prelude::*;
use epsilang_session::Interner;
use epsilang_utils::peek::Peek;

use crate::token::*;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct LexerError {
    pub kind: LexerErrorKind,
    pub span: Span,
}

#[derive(serde::Serialize, thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexerErrorKind {
    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),

    #[error("expected `=` after `!`")]
    BareBang,

    #[error("integer literal does not fit in 64 bits")]
    IntegerOverflow,
}

impl IntoDiagnostic for LexerError {
    fn into_diagnostic(self) -> Diagnostic {
        Diagnostic::error()
            .with_message(self.kind.to_string())
            .with_span(self.span)
    }
}

type LexerResult<T> = Result<T, LexerErrorKind>;

pub struct Lexer<'sess> {
    interner: &'sess mut Interner,
    errors: Vec<LexerError>,

    all: &'sess str,
    chars: Chars<'sess>,

    token_start: usize,
}

impl<'sess> Lexer<'sess> {
    pub fn new(source: &'sess str, interner: &'sess mut Interner) -> Self {
        Self {
            interner,
            errors: vec![],

            all: source,
            chars: source.chars(),

            token_start: 0,
        }
    }

    pub fn lex(mut self) -> (TokenIter, Vec<LexerError>) {
        let mut tokens = vec![];
        while let Some(token) = self.lex_token() {
            tokens.push(token);
        }

        let iter = TokenIter {
            tokens: tokens.into_iter(),
            prev_span: Span::empty(0),
            eof_span: Span::empty(self.all.len()),
        };

        (iter, self.errors)
    }

    /// The next token, skipping whitespace and error-and-continuing
    /// past anything unrecognized. `None` is end of input.
    fn lex_token(&mut self) -> Option<Token> {
        loop {
            self.token_start = self.byte_pos();

            let kind = match self.chars.next()? {
                ch if ch.is_ascii_whitespace() => continue,

                '{' => TokenKind::LBrace,
                '}' => TokenKind::RBrace,
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,

                ',' => TokenKind::Comma,
                ';' => TokenKind::Semicolon,

                '+' => TokenKind::Add,
                '-' => TokenKind::Sub,
                '*' => TokenKind::Mul,
                '/' => TokenKind::Div,

                '=' if self.chars.eat('=') => TokenKind::Eq,
                '=' => TokenKind::Assign,

                '!' if self.chars.eat('=') => TokenKind::Ne,
                '!' => {
                    self.report_error(LexerErrorKind::BareBang);
                    continue;
                }

                '>' if self.chars.eat('=') => TokenKind::Ge,
                '>' => TokenKind::Gt,

                '<' if self.chars.eat('=') => TokenKind::Le,
                '<' => TokenKind::Lt,

                ch @ '0'..='9' => match self.lex_integer(ch) {
                    Ok(kind) => kind,
                    Err(err) => {
                        self.report_error(err);
                        continue;
                    }
                },

                ch if ch.is_ascii_alphabetic() => self.lex_word(),

                ch => {
                    self.report_error(LexerErrorKind::UnexpectedChar(ch));
                    continue;
                }
            };

            let token = Token {
                kind,
                span: Span::new(self.token_start, self.byte_pos()),
            };

            return Some(token);
        }
    }

    /// Maximal run of decimal digits. The whole run is consumed even
    /// when the value overflows, so lexing resumes after it.
    fn lex_integer(&mut self, first: char) -> LexerResult<TokenKind> {
        let mut n = Some(first as i64 - '0' as i64);

        while let Some(ch @ '0'..='9') = self.chars.peek() {
            self.chars.next();

            let digit = ch as i64 - '0' as i64;
            n = n.and_then(|n| n.checked_mul(10));
            n = n.and_then(|n| n.checked_add(digit));
        }

        n.map(TokenKind::Integer)
            .ok_or(LexerErrorKind::IntegerOverflow)
    }

    /// Keywords and identifiers are maximal runs of ASCII letters; a
    /// digit or underscore ends the word.
    fn lex_word(&mut self) -> TokenKind {
        while matches!(self.chars.peek(), Some(ch) if ch.is_ascii_alphabetic()) {
            self.chars.next();
        }

        let word = &self.all[self.token_start..self.byte_pos()];

        match word {
            "exit" => TokenKind::Keyword(Keyword::Exit),
            "let" => TokenKind::Keyword(Keyword::Let),
            "if" => TokenKind::Keyword(Keyword::If),
            "else" => TokenKind::Keyword(Keyword::Else),
            "while" => TokenKind::Keyword(Keyword::While),
            "return" => TokenKind::Keyword(Keyword::Return),
            "fn" => TokenKind::Keyword(Keyword::Fn),
            _ => TokenKind::Identifier(self.interner.get_or_intern(word)),
        }
    }

    fn byte_pos(&self) -> usize {
        self.all.len() - self.chars.as_str().len()
    }

    fn report_error(&mut self, kind: LexerErrorKind) {
        let span = Span::new(self.token_start, self.byte_pos());
        self.errors.push(LexerError { kind, span });
    }
}

/// The lexed token stream. Running dry is the end-of-input signal; the
/// span just past the last character stays available for diagnostics.
pub struct TokenIter {
    tokens: std::vec::IntoIter<Token>,
    prev_span: Span,
    eof_span: Span,
}

impl TokenIter {
    pub fn prev_span(&self) -> Span {
        self.prev_span
    }

    pub fn peek_span(&self) -> Span {
        self.peek().map(|t| t.span).unwrap_or(self.eof_span)
    }

    pub fn eof_span(&self) -> Span {
        self.eof_span
    }
}

impl Iterator for TokenIter {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.tokens.next()?;
        self.prev_span = token.span;
        Some(token)
    }
}

impl Peek for TokenIter {
    fn peek(&self) -> Option<Self::Item> {
        self.tokens.as_slice().first().copied()
    }

    fn peek_second(&self) -> Option<Self::Item> {
        self.tokens.as_slice().get(1).copied()
    }
}
