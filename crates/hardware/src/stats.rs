//! Execution statistics collection and reporting.
//!
//! Tracks the counters a driver usually wants after a run: cycles,
//! instructions, interrupts, and wall-clock execution rate.

use std::time::Instant;

use crate::common::constants::IVT_ENTRIES;

/// Interrupt names in vector order, for the report.
const INTERRUPT_NAMES: [&str; IVT_ENTRIES] = [
    "stack_overflow",
    "fault",
    "badaddr",
    "divbyzero",
    "badinstr",
    "timer",
];

/// Execution statistics for one machine.
#[derive(Clone, Debug)]
pub struct SimStats {
    start_time: Instant,
    /// Total cycles executed.
    pub cycles: u64,
    /// Instructions retired (one per cycle on this machine).
    pub instructions_retired: u64,
    /// Interrupts delivered, including nesting faults.
    pub interrupts_taken: u64,
    /// Interrupts delivered per kind, indexed by vector number.
    pub interrupts_by_kind: [u64; IVT_ENTRIES],
}

impl SimStats {
    /// Creates zeroed statistics with the clock started now.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            instructions_retired: 0,
            interrupts_taken: 0,
            interrupts_by_kind: [0; IVT_ENTRIES],
        }
    }

    /// Zeroes all counters and restarts the clock.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Returns elapsed wall-clock seconds since construction or reset.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    /// Prints a summary to stdout.
    pub fn print(&self) {
        let elapsed = self.elapsed_secs();
        let rate = if elapsed > 0.0 {
            self.cycles as f64 / elapsed / 1000.0
        } else {
            0.0
        };
        println!("--- statistics ---");
        println!("  cycles:       {}", self.cycles);
        println!("  instructions: {}", self.instructions_retired);
        println!("  interrupts:   {}", self.interrupts_taken);
        for (name, count) in INTERRUPT_NAMES.iter().zip(self.interrupts_by_kind) {
            if count > 0 {
                println!("    {name}: {count}");
            }
        }
        println!("  wall clock:   {elapsed:.3} s ({rate:.1} kcycles/s)");
    }
}

impl Default for SimStats {
    fn default() -> Self {
        Self::new()
    }
}
