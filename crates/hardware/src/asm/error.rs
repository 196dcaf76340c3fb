//! Assembler error types.
//!
//! Encoding never unwinds past its boundary: every failure is accumulated as
//! an [`AsmError`] (a kind plus the originating source line) and returned to
//! the caller alongside whatever code was produced.

use std::fmt;

use thiserror::Error;

/// The specific assembler failure.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AsmErrorKind {
    /// A lexical failure reported by the tokenizer.
    #[error("{0}")]
    Lex(String),

    /// A top-level token that is neither a label nor a mnemonic.
    #[error("invalid token \"{0}\"")]
    InvalidToken(String),

    /// The mnemonic is not in the instruction table.
    #[error("no such instruction \"{0}\"")]
    UnknownMnemonic(String),

    /// The instruction did not get its fixed number of operands.
    #[error("\"{mnemonic}\" expects {expected} operand(s)")]
    WrongOperandCount {
        /// The mnemonic being assembled.
        mnemonic: String,
        /// Its fixed operand arity.
        expected: usize,
    },

    /// Two operands were not separated by a comma.
    #[error("expected \",\" between operands")]
    MissingSeparator,

    /// The operand name is not a register.
    #[error("\"{0}\" is not a register")]
    UnknownRegister(String),

    /// An integer or address literal failed to parse.
    #[error("malformed literal \"{0}\"")]
    BadLiteral(String),

    /// A function unit with this name was already declared.
    #[error("function \"{0}\" is already defined")]
    DuplicateFunction(String),

    /// An identifier operand names no declared function unit.
    #[error("unresolved reference to \"{0}\"")]
    UnresolvedReference(String),

    /// The destination operand cannot receive a value (a literal, for
    /// instance) — a hard error for `mov` and the ALU family.
    #[error("no valid destination for \"{0}\"")]
    NoValidDestination(String),

    /// No variant of the mnemonic accepts an operand of this lexical type.
    #[error("no form of \"{0}\" accepts this operand")]
    UnsupportedOperand(String),
}

/// An accumulated assembler error: the kind plus its source line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AsmError {
    /// What went wrong.
    pub kind: AsmErrorKind,
    /// 1-based source line, when one is attributable.
    pub line: Option<u32>,
}

impl AsmError {
    /// Builds an error attributed to a source line.
    pub fn at(kind: AsmErrorKind, line: u32) -> Self {
        Self {
            kind,
            line: Some(line),
        }
    }
}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}: {}", line, self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for AsmError {}
