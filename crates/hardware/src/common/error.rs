//! Machine and bus error definitions.
//!
//! This module defines the two run-time error taxonomies of the machine:
//! 1. **Bus errors:** Unmapped accesses and mapping conflicts, returned as
//!    explicit variants rather than signalled by unwinding.
//! 2. **Machine errors:** Fatal conditions the execution core propagates to
//!    the driver (invalid register index, out-of-range interrupt kind, I/O
//!    failures from the loader).
//!
//! The execution core converts exactly one bus condition — `Unmapped` —
//! into a `BADADDR` interrupt; everything else here is fatal to the run.

use thiserror::Error;

/// Failures produced by the memory bus.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BusError {
    /// No registered mapping covers the accessed address.
    ///
    /// This is the one recoverable bus condition: the execution core turns
    /// it into a `BADADDR` interrupt instead of aborting the run loop.
    #[error("no mapping covers address {addr:#x}")]
    Unmapped {
        /// The address that missed every registered range.
        addr: u64,
    },

    /// A mapping with exactly this `(start, end)` pair already exists.
    ///
    /// Raised at registration time; partial overlaps are not detected and
    /// are resolved by registration order instead.
    #[error("range [{start:#x}, {end:#x}) is already mapped")]
    AlreadyMapped {
        /// Inclusive start of the rejected range.
        start: u64,
        /// Exclusive end of the rejected range.
        end: u64,
    },
}

/// Fatal machine-level failures surfaced to the driver.
#[derive(Debug, Error)]
pub enum VmError {
    /// A register index outside the canonical 46-entry space was used.
    #[error("invalid register index {0}")]
    InvalidRegister(u64),

    /// An interrupt kind outside the vector table was requested by the
    /// instruction stream.
    #[error("interrupt kind {0} is outside the vector table")]
    InvalidInterrupt(u64),

    /// A bus failure that the execution core did not convert to an
    /// interrupt (mapping conflicts, unmapped instruction fetch).
    #[error(transparent)]
    Bus(#[from] BusError),

    /// Host I/O failure while loading or dumping an image.
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}
