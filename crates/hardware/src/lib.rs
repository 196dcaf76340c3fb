//! SAVM virtual machine library.
//!
//! This crate implements a toy register-machine emulator and its companion
//! assembler, with the following:
//! 1. **ISA:** A canonical 52-entry opcode table, three addressing modes,
//!    and a 24-byte three-word instruction format shared bit-for-bit by the
//!    encoder and the execution core.
//! 2. **Assembler:** Tokenizer and encoder turning mnemonic source into a
//!    flat instruction stream, with accumulated structured errors.
//! 3. **Core:** A 46-register file with an interrupt-time shadow copy, a
//!    bounded call stack, a 6-entry interrupt vector table, and a one
//!    instruction per cycle fetch/decode/execute engine.
//! 4. **SoC:** A memory bus routing word accesses over registered address
//!    ranges, RAM, and three peripherals (RTC, mailbox, UART).
//! 5. **Simulation:** Machine assembly, reset, image loading, and
//!    statistics.

/// The assembler: tokenizer, encoder, and error types.
pub mod asm;
/// Common types and constants (registers, errors, architectural constants).
pub mod common;
/// Machine configuration (defaults and hierarchical config structures).
pub mod config;
/// Execution core (CPU state, interrupts, fetch/decode/execute).
pub mod core;
/// Instruction set (opcodes, addressing modes, instruction packing).
pub mod isa;
/// Machine assembly, run control, and image handling.
pub mod sim;
/// System-on-chip (bus, RAM, device trait, peripherals).
pub mod soc;
/// Execution statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from
/// JSON.
pub use crate::config::Config;
/// The machine value; construct with `Machine::new`.
pub use crate::sim::Machine;
/// One-call assembly of source text.
pub use crate::asm::assemble_source;
