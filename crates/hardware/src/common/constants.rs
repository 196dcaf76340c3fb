//! System-wide constants for the SAVM machine.
//!
//! These values define the fixed architectural surface shared by the
//! assembler and the execution core: the reserved RAM window, the
//! instruction record geometry, and the interrupt vector table size.
//! They must never drift apart between the two sides.

/// Base address of the reserved RAM/function window.
///
/// Function references produced by the assembler resolve relative to this
/// base, and the boot quirk in the execution core starts fetching here.
pub const RAM_BASE: u64 = 0xA000_0000;

/// Architectural size of the reserved RAM window, in 64-bit words.
///
/// Only a configurable prefix of the window is actually backed by host
/// memory (see [`crate::config::SystemConfig::ram_words`]); the window
/// itself is part of the address-space contract.
pub const RAM_WINDOW_WORDS: u64 = 0x4000_0000;

/// Number of 64-bit words occupied by one instruction.
///
/// The program counter advances by this amount every cycle, and function
/// offsets are multiples of it.
pub const WORDS_PER_INSTRUCTION: u64 = 3;

/// Size of one serialized instruction record in bytes (three LE words).
pub const INSTRUCTION_RECORD_BYTES: usize = 24;

/// Number of entries in the interrupt vector table.
pub const IVT_ENTRIES: usize = 6;

/// Bit in the `flags` register set while an interrupt handler is active.
pub const FLAG_INTERRUPT: u64 = 1 << 0;
