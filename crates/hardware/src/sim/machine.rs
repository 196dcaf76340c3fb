//! The machine: CPU, bus, devices, and run control in one owned value.
//!
//! `Machine` assembles the system from configuration: RAM is mapped over the
//! reserved window, then the RTC, mailbox, and UART register at their
//! configured bases (their per-cycle tick order is their registration
//! order). `reset` tears the memory map down and rebuilds it. There is no
//! hidden global state — drivers construct, own, and pass the machine
//! explicitly.

use tracing::debug;

use crate::common::error::VmError;
use crate::config::Config;
use crate::core::cpu::Cpu;
use crate::core::interrupt::InterruptKind;
use crate::soc::bus::Bus;
use crate::soc::devices::{Mailbox, Rtc, Uart, mailbox, rtc, uart};
use crate::soc::ram::Ram;
use crate::stats::SimStats;

/// Why a [`Machine::run`] loop returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The running flag was cleared (`hlt`/`nop` or host request).
    Halted {
        /// Cycles executed in this run.
        cycles: u64,
    },
    /// The cycle budget ran out with the machine still running.
    CycleLimit {
        /// Cycles executed in this run.
        cycles: u64,
    },
}

/// A complete SAVM machine instance.
pub struct Machine {
    /// CPU state (registers, stack, vector table).
    pub cpu: Cpu,
    /// Memory bus owning RAM and the peripherals.
    pub bus: Bus,
    /// Execution statistics.
    pub stats: SimStats,
    /// The configuration the machine was built from.
    pub config: Config,
    /// Reusable scratch buffer for per-cycle device interrupts.
    pub(crate) pending: Vec<InterruptKind>,
}

impl Machine {
    /// Builds a machine from configuration and resets it.
    ///
    /// # Returns
    ///
    /// A ready machine, or the mapping conflict that made setup impossible.
    pub fn new(config: Config) -> Result<Self, VmError> {
        let stack_capacity = config.system.stack_capacity;
        let mut machine = Self {
            cpu: Cpu::new(stack_capacity),
            bus: Bus::new(),
            stats: SimStats::new(),
            config,
            pending: Vec::new(),
        };
        machine.reset()?;
        Ok(machine)
    }

    /// Returns the machine to its power-on state.
    ///
    /// The memory map is torn down and rebuilt: RAM over the reserved
    /// window, then the RTC, mailbox, and UART. CPU state, stack, vector
    /// table, and statistics are zeroed.
    pub fn reset(&mut self) -> Result<(), VmError> {
        self.bus.clear();

        let sys = &self.config.system;
        self.bus.map(
            sys.ram_base,
            sys.ram_base + sys.ram_words,
            Box::new(Ram::new(sys.ram_words)),
        )?;
        self.bus.map(
            sys.rtc_base,
            sys.rtc_base + rtc::REGION_WORDS,
            Box::new(Rtc::new(sys.rtc_divider)),
        )?;
        self.bus.map(
            sys.mailbox_base,
            sys.mailbox_base + mailbox::REGION_WORDS,
            Box::new(Mailbox::new(sys.mailbox_capacity)),
        )?;
        self.bus.map(
            sys.uart_base,
            sys.uart_base + uart::REGION_WORDS,
            Box::new(Uart::new(sys.uart_echo)),
        )?;

        self.cpu.reset();
        self.stats.reset();
        self.pending.clear();
        debug!(
            ram_base = format_args!("{:#x}", sys.ram_base),
            ram_words = sys.ram_words,
            "machine reset"
        );
        Ok(())
    }

    /// Runs until the machine halts or an optional cycle budget is spent.
    ///
    /// # Arguments
    ///
    /// * `max_cycles` - Upper bound on cycles for this run, or `None` to run
    ///   until halted.
    ///
    /// # Returns
    ///
    /// How the run ended, or the fatal error that aborted it.
    pub fn run(&mut self, max_cycles: Option<u64>) -> Result<RunOutcome, VmError> {
        self.cpu.running = true;
        let mut executed = 0u64;
        while self.cpu.running {
            if let Some(limit) = max_cycles {
                if executed >= limit {
                    return Ok(RunOutcome::CycleLimit { cycles: executed });
                }
            }
            self.step()?;
            executed += 1;
        }
        debug!(cycles = executed, "machine halted");
        Ok(RunOutcome::Halted { cycles: executed })
    }

    /// Writes words to consecutive bus addresses starting at `base`.
    pub fn load_words(&mut self, base: u64, words: &[u64]) -> Result<(), VmError> {
        for (i, word) in words.iter().enumerate() {
            self.bus.write(base + i as u64, *word)?;
        }
        Ok(())
    }

    /// Reads `count` words from consecutive bus addresses starting at
    /// `base`.
    pub fn dump_words(&mut self, base: u64, count: u64) -> Result<Vec<u64>, VmError> {
        let mut words = Vec::with_capacity(count as usize);
        for i in 0..count {
            words.push(self.bus.read(base + i)?);
        }
        Ok(words)
    }

    /// Loads a byte image at `base`, grouping bytes into little-endian
    /// words (a trailing partial word is zero-padded).
    ///
    /// # Returns
    ///
    /// The number of words written.
    pub fn load_image(&mut self, base: u64, bytes: &[u8]) -> Result<u64, VmError> {
        let words = crate::sim::loader::words_from_bytes(bytes);
        self.load_words(base, &words)?;
        Ok(words.len() as u64)
    }

    /// Returns the mapped UART for host-side I/O.
    pub fn uart_mut(&mut self) -> Option<&mut Uart> {
        self.bus.uart_mut()
    }

    /// Returns the mapped mailbox for host-side message exchange.
    pub fn mailbox_mut(&mut self) -> Option<&mut Mailbox> {
        self.bus.mailbox_mut()
    }
}
