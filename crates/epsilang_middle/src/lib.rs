//! Analysis between parsing and emission: the declaration pre-pass
//! that builds the symbol tables the code generator resolves against.

mod declare;

pub use declare::{declare, DeclareError, DeclareErrorKind};
