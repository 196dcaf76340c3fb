//! Instruction set definition.
//!
//! The canonical opcode table (one entry per mnemonic+mode combination),
//! addressing modes, and the packed three-word instruction format shared by
//! the assembler and the execution core.

/// Instruction word packing and 24-byte record serialization.
pub mod instruction;

/// Opcode and addressing-mode enumerations.
pub mod opcode;

pub use instruction::Instruction;
pub use opcode::{AddrMode, Opcode};
