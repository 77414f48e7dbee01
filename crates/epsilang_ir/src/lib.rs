//! Vocabulary shared by the frontend, the declaration pre-pass and the
//! code generator.

#[macro_use]
extern crate macro_rules_attribute;

pub mod symbols;

use epsilang_session::span::Span;
use epsilang_session::InternedStr;

derive_alias! {
    #[derive(Node!)] = #[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)];
    #[derive(NodeCopy!)] = #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)];
}

/// An identifier occurrence: the interned name plus where it appeared.
#[derive(NodeCopy!)]
pub struct Ident {
    pub ident: InternedStr,
    pub span: Span,
}

#[derive(NodeCopy!)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Comparison operators, legal only at the top of `if`/`while`
/// conditions.
#[derive(NodeCopy!)]
pub enum CmpOp {
    Eq,
    Ne,
    Ge,
    Le,
    Gt,
    Lt,
}
