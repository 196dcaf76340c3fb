//! Fetch/decode/execute engine.
//!
//! One [`Machine::step`] is one cycle: fetch the three instruction words,
//! advance the program counter, dispatch exhaustively on the decoded opcode,
//! tick every peripheral, and bump the cycle counter. Exactly one failure is
//! recoverable during dispatch — an unmapped bus access, which becomes a
//! `BADADDR` interrupt; everything else (invalid register index, an
//! out-of-range interrupt kind from the instruction stream, unmapped
//! instruction fetch) propagates fatally to the driver.

use tracing::trace;

use crate::common::constants::{FLAG_INTERRUPT, IVT_ENTRIES, WORDS_PER_INSTRUCTION};
use crate::common::error::{BusError, VmError};
use crate::core::interrupt::InterruptKind;
use crate::isa::instruction::opcode_number;
use crate::isa::opcode::Opcode;
use crate::sim::machine::Machine;

impl Machine {
    /// Executes one fetch/decode/execute cycle.
    ///
    /// # Returns
    ///
    /// A fatal [`VmError`] aborts the run loop; interrupt-mediated
    /// conditions complete the cycle normally.
    pub fn step(&mut self) -> Result<(), VmError> {
        // Boot quirk: a zero program counter restarts fetch at a
        // cycle-scaled offset inside the RAM window.
        if self.cpu.regs.pc == 0 {
            self.cpu.regs.pc =
                self.config.system.ram_base + WORDS_PER_INSTRUCTION * self.cpu.regs.cycle;
        }

        // Fetch. Failures here are fatal: only dispatch-path accesses are
        // converted to BADADDR.
        let pc = self.cpu.regs.pc;
        self.cpu.regs.ip = self.bus.read(pc)?;
        let a = self.bus.read(pc + 1)?;
        let b = self.bus.read(pc + 2)?;

        self.cpu.regs.pc = pc + WORDS_PER_INSTRUCTION;

        match self.dispatch(a, b) {
            Ok(()) => {}
            Err(VmError::Bus(BusError::Unmapped { addr })) => {
                trace!(addr = format_args!("{addr:#x}"), "unmapped access");
                self.cpu.raise(InterruptKind::BadAddr);
            }
            Err(e) => return Err(e),
        }

        // Peripheral ticks, in registration order, inside the same cycle.
        let mut pending = std::mem::take(&mut self.pending);
        self.bus.tick_all(&mut pending);
        for kind in pending.drain(..) {
            self.cpu.raise(kind);
        }
        self.pending = pending;

        self.cpu.regs.cycle += 1;
        self.stats.cycles += 1;
        self.stats.instructions_retired += 1;
        self.stats.interrupts_taken = self.cpu.interrupts_taken;
        self.stats.interrupts_by_kind = self.cpu.interrupts_by_kind;
        Ok(())
    }

    /// Executes the fetched instruction.
    fn dispatch(&mut self, a: u64, b: u64) -> Result<(), VmError> {
        let number = opcode_number(self.cpu.regs.ip);
        let Some(opcode) = Opcode::from_number(number) else {
            self.cpu.raise(InterruptKind::BadInstr);
            return Ok(());
        };
        trace!(pc = self.cpu.regs.pc, opcode = ?opcode, a, b, "execute");

        match opcode {
            Opcode::Nop | Opcode::Hlt => self.cpu.running = false,

            Opcode::AddReg => self.alu_reg(a, b, u64::wrapping_add)?,
            Opcode::AddMem => self.alu_mem(a, b, u64::wrapping_add)?,
            Opcode::SubReg => self.alu_reg(a, b, u64::wrapping_sub)?,
            Opcode::SubMem => self.alu_mem(a, b, u64::wrapping_sub)?,
            Opcode::MulReg => self.alu_reg(a, b, u64::wrapping_mul)?,
            Opcode::MulMem => self.alu_mem(a, b, u64::wrapping_mul)?,

            Opcode::DivReg => {
                let divisor = self.cpu.regs.read(b)?;
                if divisor == 0 {
                    self.cpu.raise(InterruptKind::DivByZero);
                } else {
                    let x = self.cpu.regs.read(a)?;
                    self.cpu.regs.write(a, x / divisor)?;
                }
            }
            Opcode::DivMem => {
                let divisor = self.bus.read(b)?;
                if divisor == 0 {
                    self.cpu.raise(InterruptKind::DivByZero);
                } else {
                    let x = self.bus.read(a)?;
                    self.bus.write(a, x / divisor)?;
                }
            }

            Opcode::AndReg => self.alu_reg(a, b, |x, y| x & y)?,
            Opcode::AndMem => self.alu_mem(a, b, |x, y| x & y)?,
            Opcode::OrReg => self.alu_reg(a, b, |x, y| x | y)?,
            Opcode::OrMem => self.alu_mem(a, b, |x, y| x | y)?,
            Opcode::XorReg => self.alu_reg(a, b, |x, y| x ^ y)?,
            Opcode::XorMem => self.alu_mem(a, b, |x, y| x ^ y)?,
            Opcode::NorReg => self.alu_reg(a, b, |x, y| !(x | y))?,
            Opcode::NorMem => self.alu_mem(a, b, |x, y| !(x | y))?,
            Opcode::NandReg => self.alu_reg(a, b, |x, y| !(x & y))?,
            Opcode::NandMem => self.alu_mem(a, b, |x, y| !(x & y))?,

            // Shift counts are masked to 0..=63.
            Opcode::LshiftReg => self.alu_reg(a, b, |x, y| x.wrapping_shl(y as u32))?,
            Opcode::LshiftMem => self.alu_mem(a, b, |x, y| x.wrapping_shl(y as u32))?,
            Opcode::RshiftReg => self.alu_reg(a, b, |x, y| x.wrapping_shr(y as u32))?,
            Opcode::RshiftMem => self.alu_mem(a, b, |x, y| x.wrapping_shr(y as u32))?,

            Opcode::CmpReg => {
                let x = self.cpu.regs.read(a)?;
                let y = self.cpu.regs.read(b)?;
                self.cpu.regs.tmp = (x == y) as u64;
            }
            Opcode::CmpMem => {
                let x = self.bus.read(a)?;
                let y = self.bus.read(b)?;
                self.cpu.regs.tmp = (x == y) as u64;
            }

            Opcode::JitReg => {
                if self.cpu.regs.tmp != 0 {
                    self.cpu.regs.pc = self.cpu.regs.read(a)?;
                }
            }
            Opcode::JitMem => {
                if self.cpu.regs.tmp != 0 {
                    self.cpu.regs.pc = self.bus.read(a)?;
                }
            }
            Opcode::JitImm => {
                if self.cpu.regs.tmp != 0 {
                    self.cpu.regs.pc = a;
                }
            }
            Opcode::JmpReg => self.cpu.regs.pc = self.cpu.regs.read(a)?,
            Opcode::JmpMem => self.cpu.regs.pc = self.bus.read(a)?,
            Opcode::JmpImm => self.cpu.regs.pc = a,

            Opcode::CallReg => {
                let target = self.cpu.regs.read(a)?;
                self.call_to(target);
            }
            Opcode::CallMem => {
                let target = self.bus.read(a)?;
                self.call_to(target);
            }
            Opcode::CallImm => self.call_to(a),
            Opcode::Ret => {
                if let Some(target) = self.cpu.stack_pop() {
                    self.cpu.regs.pc = target;
                }
            }

            Opcode::PushReg => {
                let value = self.cpu.regs.read(a)?;
                let _ = self.cpu.stack_push(value);
            }
            Opcode::PushMem => {
                let value = self.bus.read(a)?;
                let _ = self.cpu.stack_push(value);
            }
            Opcode::PopReg => {
                if let Some(value) = self.cpu.stack_pop() {
                    self.cpu.regs.write(a, value)?;
                }
            }
            Opcode::PopMem => {
                if let Some(value) = self.cpu.stack_pop() {
                    self.bus.write(a, value)?;
                }
            }

            Opcode::MovRegReg => {
                let value = self.cpu.regs.read(b)?;
                self.cpu.regs.write(a, value)?;
            }
            Opcode::MovMemReg => {
                let value = self.cpu.regs.read(b)?;
                self.bus.write(a, value)?;
            }
            Opcode::MovRegMem => {
                let value = self.bus.read(b)?;
                self.cpu.regs.write(a, value)?;
            }
            Opcode::MovMemMem => {
                let value = self.bus.read(b)?;
                self.bus.write(a, value)?;
            }
            Opcode::StoreReg => self.cpu.regs.write(a, b)?,
            Opcode::StoreMem => self.bus.write(a, b)?,

            // An out-of-range kind from the instruction stream is fatal;
            // it is never reinterpreted as a further interrupt.
            Opcode::IntReg => {
                let number = self.cpu.regs.read(a)?;
                let kind = InterruptKind::from_number(number)?;
                self.cpu.raise(kind);
            }
            Opcode::IntMem => {
                let number = self.bus.read(a)?;
                let kind = InterruptKind::from_number(number)?;
                self.cpu.raise(kind);
            }
            Opcode::IntImm => {
                let kind = InterruptKind::from_number(a)?;
                self.cpu.raise(kind);
            }
            Opcode::Iret => self.cpu.interrupt_return(),

            Opcode::LditblReg => {
                let base = self.cpu.regs.read(a)?;
                self.load_ivt(base)?;
            }
            Opcode::LditblMem => {
                let base = self.bus.read(a)?;
                self.load_ivt(base)?;
            }
        }
        Ok(())
    }

    /// Applies a binary operation over register operands.
    fn alu_reg(&mut self, a: u64, b: u64, op: impl Fn(u64, u64) -> u64) -> Result<(), VmError> {
        let x = self.cpu.regs.read(a)?;
        let y = self.cpu.regs.read(b)?;
        self.cpu.regs.write(a, op(x, y))
    }

    /// Applies a binary operation over memory operands.
    fn alu_mem(&mut self, a: u64, b: u64, op: impl Fn(u64, u64) -> u64) -> Result<(), VmError> {
        let x = self.bus.read(a)?;
        let y = self.bus.read(b)?;
        self.bus.write(a, op(x, y))?;
        Ok(())
    }

    /// Pushes the return address (the already-advanced `pc`) and jumps.
    fn call_to(&mut self, target: u64) {
        let return_pc = self.cpu.regs.pc;
        if self.cpu.stack_push(return_pc) {
            self.cpu.regs.pc = target;
        }
    }

    /// Overwrites all vector slots from consecutive bus words at `base`.
    fn load_ivt(&mut self, base: u64) -> Result<(), VmError> {
        for i in 0..IVT_ENTRIES {
            self.cpu.ivt[i] = self.bus.read(base + i as u64)?;
        }
        Ok(())
    }

    /// Returns whether the CPU is currently inside an interrupt handler.
    pub fn in_interrupt_handler(&self) -> bool {
        self.cpu.regs.flags & FLAG_INTERRUPT != 0
    }
}
