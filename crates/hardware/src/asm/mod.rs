//! The SAVM assembler.
//!
//! Source text flows through the tokenizer into the encoder, which groups
//! instructions into function units, resolves references, and emits the flat
//! binary instruction stream consumed by the execution core. All failures
//! are accumulated as structured errors; nothing here panics on bad input.

/// Binary encoder: token stream → instruction records.
pub mod encoder;

/// Assembler error types.
pub mod error;

/// Tokenizer for the assembly text surface.
pub mod lexer;

pub use encoder::{Assembly, assemble, assemble_source};
pub use error::{AsmError, AsmErrorKind};
