//! The back end: lowering the checked tree to FASM-dialect x86-64
//! assembly text, and driving the external assembler and linker.

pub mod assembler;

mod codegen;

pub use codegen::{generate, CodegenError, CodegenErrorKind};
