use epsilang_session::Interner;

use super::{Lexer, LexerError, LexerErrorKind};
use crate::token::{Keyword, Token, TokenKind};

fn lex(source: &str) -> (Vec<Token>, Vec<LexerError>) {
    let mut interner = Interner::new();
    let (tokens, errors) = Lexer::new(source, &mut interner).lex();
    (tokens.collect(), errors)
}

fn kinds(source: &str) -> Vec<TokenKind> {
    let (tokens, errors) = lex(source);
    assert!(errors.is_empty(), "unexpected lexer errors: {errors:?}");
    tokens.iter().map(|t| t.kind).collect()
}

#[test]
fn exit_statement() {
    assert_eq!(
        kinds("exit(0);"),
        [
            TokenKind::Keyword(Keyword::Exit),
            TokenKind::LParen,
            TokenKind::Integer(0),
            TokenKind::RParen,
            TokenKind::Semicolon,
        ]
    );
}

#[test]
fn keywords_and_identifiers() {
    let tokens = kinds("exit let if else while return fn banana");

    assert_eq!(
        &tokens[..7],
        [
            TokenKind::Keyword(Keyword::Exit),
            TokenKind::Keyword(Keyword::Let),
            TokenKind::Keyword(Keyword::If),
            TokenKind::Keyword(Keyword::Else),
            TokenKind::Keyword(Keyword::While),
            TokenKind::Keyword(Keyword::Return),
            TokenKind::Keyword(Keyword::Fn),
        ]
    );
    assert!(matches!(tokens[7], TokenKind::Identifier(_)));
}

#[test]
fn integer_value() {
    assert_eq!(kinds("12345"), [TokenKind::Integer(12345)]);
}

#[test]
fn integer_overflow() {
    let (tokens, errors) = lex("100000000000000000000");

    assert!(tokens.is_empty());
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, LexerErrorKind::IntegerOverflow);
}

#[test]
fn two_character_operators() {
    assert_eq!(
        kinds("== != >= <= > < ="),
        [
            TokenKind::Eq,
            TokenKind::Ne,
            TokenKind::Ge,
            TokenKind::Le,
            TokenKind::Gt,
            TokenKind::Lt,
            TokenKind::Assign,
        ]
    );
}

#[test]
fn comparison_lookahead_is_greedy() {
    // `<=` wins over `<` followed by `=`
    assert_eq!(kinds("<=<"), [TokenKind::Le, TokenKind::Lt]);
    assert_eq!(kinds("==="), [TokenKind::Eq, TokenKind::Assign]);
}

#[test]
fn bare_bang_is_an_error() {
    let (tokens, errors) = lex("!");
    assert!(tokens.is_empty());
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, LexerErrorKind::BareBang);

    // lexing continues past the bad character
    let (tokens, errors) = lex("! !=");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Ne);
    assert_eq!(errors.len(), 1);
}

#[test]
fn unknown_character_is_skipped() {
    let (tokens, errors) = lex("let @ x");

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, LexerErrorKind::UnexpectedChar('@'));

    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].kind, TokenKind::Keyword(Keyword::Let));
    assert!(matches!(tokens[1].kind, TokenKind::Identifier(_)));
}

#[test]
fn words_are_letter_runs_only() {
    // a digit ends the word: `x1` is an identifier then an integer
    let tokens = kinds("x1");
    assert!(matches!(tokens[0], TokenKind::Identifier(_)));
    assert_eq!(tokens[1], TokenKind::Integer(1));
}

#[test]
fn slash_is_always_division() {
    // no comment syntax
    assert_eq!(
        kinds("1//2"),
        [
            TokenKind::Integer(1),
            TokenKind::Div,
            TokenKind::Div,
            TokenKind::Integer(2),
        ]
    );
}

#[test]
fn whitespace_produces_nothing() {
    let (tokens, errors) = lex(" \t\r\n  ");
    assert!(tokens.is_empty());
    assert!(errors.is_empty());
}

#[test]
fn lexemes_are_nonempty_source_substrings() {
    let source = "let x = 5;\nexit(x + 2);";
    let (tokens, errors) = lex(source);
    assert!(errors.is_empty());

    for token in &tokens {
        let lexeme = &source[token.span.start..token.span.end];
        assert!(!lexeme.is_empty(), "empty lexeme for {:?}", token.kind);
        assert!(lexeme.chars().all(|ch| !ch.is_ascii_whitespace()));
    }
}
