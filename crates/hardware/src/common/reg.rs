//! Register file and the canonical register index space.
//!
//! This module defines the machine's 46 addressable registers. It provides:
//! 1. **Canonical numbering:** A single explicit name table shared by the
//!    assembler (name → index) and the execution core (index → slot).
//! 2. **Storage:** Six scalar registers and four ten-slot banks.
//! 3. **Snapshots:** The file is `Clone` so interrupt entry can take a real
//!    copy rather than an alias.
//!
//! The index space is contiguous: scalars occupy 0..=5, then the `data`,
//! `index`, `addr`, and `ptr` banks are packed back to back with no gaps.
//! Indices 46 and above are invalid and surface as
//! [`VmError::InvalidRegister`].

use crate::common::error::VmError;

/// Number of scalar registers (`flags` through `cycle`).
pub const SCALAR_COUNT: usize = 6;

/// Number of slots in each indexed register bank.
pub const BANK_SLOTS: usize = 10;

/// Total number of addressable registers.
pub const REGISTER_COUNT: usize = 46;

/// Canonical register name table.
///
/// The position of a name in this table *is* its register index, for both
/// the assembler and the execution core. Keep [`RegisterFile::read`] and
/// [`RegisterFile::write`] in agreement with this ordering; the register
/// indexing tests enforce it.
pub const REGISTER_NAMES: [&str; REGISTER_COUNT] = [
    "flags", "tmp", "sp", "ip", "pc", "cycle", // scalars: 0..=5
    "data0", "data1", "data2", "data3", "data4", "data5", "data6", "data7", "data8",
    "data9", // 6..=15
    "index0", "index1", "index2", "index3", "index4", "index5", "index6", "index7", "index8",
    "index9", // 16..=25
    "addr0", "addr1", "addr2", "addr3", "addr4", "addr5", "addr6", "addr7", "addr8",
    "addr9", // 26..=35
    "ptr0", "ptr1", "ptr2", "ptr3", "ptr4", "ptr5", "ptr6", "ptr7", "ptr8",
    "ptr9", // 36..=45
];

/// Looks up the canonical index for a register name.
///
/// # Arguments
///
/// * `name` - Register name without the `%` sigil (e.g. `"data3"`).
///
/// # Returns
///
/// The flat index into the canonical space, or `None` for unknown names.
pub fn register_index(name: &str) -> Option<u64> {
    REGISTER_NAMES
        .iter()
        .position(|candidate| *candidate == name)
        .map(|idx| idx as u64)
}

/// The machine register file: six scalars plus four ten-slot banks.
///
/// One instance holds the live registers; a second instance holds the
/// pre-interrupt snapshot taken on interrupt entry and restored by `iret`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterFile {
    /// Status flags; bit 0 is the in-interrupt-handler flag.
    pub flags: u64,
    /// Scratch register; `cmp` stores its result here.
    pub tmp: u64,
    /// Stack pointer (index into the call/data stack).
    pub sp: u64,
    /// Current instruction word, latched at fetch time.
    pub ip: u64,
    /// Program counter, in word units.
    pub pc: u64,
    /// Cycle counter, incremented once per executed cycle.
    pub cycle: u64,
    /// General data bank.
    pub data: [u64; BANK_SLOTS],
    /// Index bank.
    pub index: [u64; BANK_SLOTS],
    /// Address bank.
    pub addr: [u64; BANK_SLOTS],
    /// Pointer bank.
    pub ptr: [u64; BANK_SLOTS],
}

impl RegisterFile {
    /// Creates a register file with every register zeroed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a register by canonical index.
    ///
    /// # Arguments
    ///
    /// * `index` - Flat register index (see [`REGISTER_NAMES`]).
    ///
    /// # Returns
    ///
    /// The register value, or [`VmError::InvalidRegister`] for indices
    /// outside the canonical space.
    pub fn read(&self, index: u64) -> Result<u64, VmError> {
        Ok(match index {
            0 => self.flags,
            1 => self.tmp,
            2 => self.sp,
            3 => self.ip,
            4 => self.pc,
            5 => self.cycle,
            6..=15 => self.data[(index - 6) as usize],
            16..=25 => self.index[(index - 16) as usize],
            26..=35 => self.addr[(index - 26) as usize],
            36..=45 => self.ptr[(index - 36) as usize],
            _ => return Err(VmError::InvalidRegister(index)),
        })
    }

    /// Writes a register by canonical index.
    ///
    /// # Arguments
    ///
    /// * `index` - Flat register index (see [`REGISTER_NAMES`]).
    /// * `value` - Value to store.
    ///
    /// # Returns
    ///
    /// [`VmError::InvalidRegister`] for indices outside the canonical space.
    pub fn write(&mut self, index: u64, value: u64) -> Result<(), VmError> {
        match index {
            0 => self.flags = value,
            1 => self.tmp = value,
            2 => self.sp = value,
            3 => self.ip = value,
            4 => self.pc = value,
            5 => self.cycle = value,
            6..=15 => self.data[(index - 6) as usize] = value,
            16..=25 => self.index[(index - 16) as usize] = value,
            26..=35 => self.addr[(index - 26) as usize] = value,
            36..=45 => self.ptr[(index - 36) as usize] = value,
            _ => return Err(VmError::InvalidRegister(index)),
        }
        Ok(())
    }

    /// Zeroes every register.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
