use epsilang_session::span::Span;
use epsilang_session::InternedStr;

use crate::NodeCopy;

#[derive(NodeCopy!)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(NodeCopy!)]
pub enum TokenKind {
    Keyword(Keyword),
    Identifier(InternedStr),
    Integer(i64),

    LBrace,
    RBrace,
    LParen,
    RParen,

    Comma,
    Semicolon,

    Add,
    Sub,
    Mul,
    Div,

    Assign,

    Eq,
    Ne,
    Ge,
    Le,
    Gt,
    Lt,
}

#[derive(NodeCopy!)]
pub enum Keyword {
    Exit,
    Let,
    If,
    Else,
    While,
    Return,
    Fn,
}

impl TokenKind {
    pub fn token_name(&self) -> &'static str {
        match self {
            TokenKind::Keyword(kw) => match kw {
                Keyword::Exit => "keyword `exit`",
                Keyword::Let => "keyword `let`",
                Keyword::If => "keyword `if`",
                Keyword::Else => "keyword `else`",
                Keyword::While => "keyword `while`",
                Keyword::Return => "keyword `return`",
                Keyword::Fn => "keyword `fn`",
            },
            TokenKind::Identifier(_) => "identifier",
            TokenKind::Integer(_) => "integer",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::Comma => "`,`",
            TokenKind::Semicolon => "`;`",
            TokenKind::Add => "`+`",
            TokenKind::Sub => "`-`",
            TokenKind::Mul => "`*`",
            TokenKind::Div => "`/`",
            TokenKind::Assign => "`=`",
            TokenKind::Eq => "`==`",
            TokenKind::Ne => "`!=`",
            TokenKind::Ge => "`>=`",
            TokenKind::Le => "`<=`",
            TokenKind::Gt => "`>`",
            TokenKind::Lt => "`<`",
        }
    }
}
