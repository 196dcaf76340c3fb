//! Interrupt kinds and the delivery/return state machine.
//!
//! The controller has two states, distinguished by bit 0 of `flags`: idle
//! and in-handler. Delivery from idle snapshots the register file, sets the
//! flag, records the kind, and loads `pc` from the vector table. Delivery
//! while already in a handler is reinterpreted as `FAULT` — nested
//! interrupts are disallowed, and the original kind is discarded. `iret`
//! restores the snapshot exactly and clears the flag; `iret` while idle is
//! itself a `FAULT`.

use tracing::trace;

use crate::common::constants::FLAG_INTERRUPT;
use crate::common::error::VmError;
use crate::core::cpu::Cpu;

/// The fixed interrupt enumeration; discriminants index the vector table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum InterruptKind {
    /// Stack exhaustion, in either direction (full on push, empty on pop).
    StackOverflow = 0,
    /// Protocol violation: nested delivery or `iret` while idle.
    Fault = 1,
    /// Access through an unmapped address.
    BadAddr = 2,
    /// Division with a zero divisor.
    DivByZero = 3,
    /// Opcode number outside the instruction table.
    BadInstr = 4,
    /// Timer expiry reported by the RTC.
    Timer = 5,
}

impl InterruptKind {
    /// Number of interrupt kinds (the vector table length).
    pub const COUNT: usize = 6;

    /// Converts a numeric kind from the instruction stream.
    ///
    /// # Returns
    ///
    /// [`VmError::InvalidInterrupt`] for kinds outside the vector table;
    /// the caller must not convert that into a further interrupt.
    pub fn from_number(number: u64) -> Result<Self, VmError> {
        Ok(match number {
            0 => Self::StackOverflow,
            1 => Self::Fault,
            2 => Self::BadAddr,
            3 => Self::DivByZero,
            4 => Self::BadInstr,
            5 => Self::Timer,
            _ => return Err(VmError::InvalidInterrupt(number)),
        })
    }

    /// Returns the vector table index for this kind.
    pub fn number(self) -> u64 {
        self as u64
    }
}

impl Cpu {
    /// Delivers an interrupt.
    ///
    /// From idle: snapshots the live registers, sets the in-handler flag,
    /// records `kind`, and jumps to `vector[kind]`. While already handling
    /// one: records `Fault` and changes nothing else.
    pub fn raise(&mut self, kind: InterruptKind) {
        self.interrupts_taken += 1;
        if self.regs.flags & FLAG_INTERRUPT != 0 {
            trace!(kind = ?kind, "interrupt while in handler, faulting");
            self.interrupts_by_kind[InterruptKind::Fault as usize] += 1;
            self.last_interrupt = Some(InterruptKind::Fault);
            return;
        }
        trace!(kind = ?kind, vector = self.ivt[kind as usize], "interrupt");
        self.interrupts_by_kind[kind as usize] += 1;
        self.saved_regs = self.regs.clone();
        self.regs.flags |= FLAG_INTERRUPT;
        self.last_interrupt = Some(kind);
        self.regs.pc = self.ivt[kind as usize];
    }

    /// Returns from an interrupt handler.
    ///
    /// Restores the snapshot taken at delivery (which has the in-handler
    /// flag clear) and drops back to idle. Called while idle, this is a
    /// protocol violation and raises `Fault` instead.
    pub fn interrupt_return(&mut self) {
        if self.regs.flags & FLAG_INTERRUPT != 0 {
            self.regs = self.saved_regs.clone();
            self.regs.flags &= !FLAG_INTERRUPT;
        } else {
            self.raise(InterruptKind::Fault);
        }
    }
}
