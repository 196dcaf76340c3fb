//! Common types and constants shared across the machine.
//!
//! This module provides the building blocks every other component leans on:
//! 1. **Constants:** The reserved RAM window, record geometry, and flag bits.
//! 2. **Errors:** Bus failures and fatal machine conditions.
//! 3. **Registers:** The canonical 46-entry register space and its storage.

/// System-wide constants (RAM window, record geometry, IVT size).
pub mod constants;

/// Bus and machine error types.
pub mod error;

/// Register file and canonical register numbering.
pub mod reg;

pub use constants::{FLAG_INTERRUPT, IVT_ENTRIES, RAM_BASE, WORDS_PER_INSTRUCTION};
pub use error::{BusError, VmError};
pub use reg::{REGISTER_COUNT, REGISTER_NAMES, RegisterFile, register_index};
