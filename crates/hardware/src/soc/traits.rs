//! Device trait for memory-mapped regions.
//!
//! This module defines the capability interface implemented by every
//! bus-attached component. It provides:
//! 1. **Access:** Word read/write at region-relative offsets.
//! 2. **Lifecycle:** `reset` (machine reset), `tick` (once per executed
//!    cycle, may report a pending interrupt), and `teardown` (machine
//!    destruction).
//! 3. **Downcasting:** Optional casts to `Uart` or `Mailbox` so the host can
//!    reach a concrete peripheral through the bus.

use crate::core::interrupt::InterruptKind;
use crate::soc::devices::{Mailbox, Uart};

/// Capability interface for memory-mapped devices and RAM regions.
///
/// Offsets are region-relative 64-bit word indices; the bus translates
/// absolute addresses before dispatching. Ticks run inline on the machine's
/// single thread and must not recurse into the machine.
pub trait Device {
    /// Returns a short name for this device (e.g. `"UART"`, `"RAM"`).
    fn name(&self) -> &str;

    /// Reads the word at the given region-relative offset.
    fn read(&mut self, offset: u64) -> u64;

    /// Writes the word at the given region-relative offset.
    fn write(&mut self, offset: u64, value: u64);

    /// Returns the device to its power-on state (machine reset).
    fn reset(&mut self) {}

    /// Advances device state by one cycle.
    ///
    /// # Returns
    ///
    /// An interrupt kind to deliver this cycle, or `None`.
    fn tick(&mut self) -> Option<InterruptKind> {
        None
    }

    /// Releases host resources on machine destruction.
    fn teardown(&mut self) {}

    /// Returns a mutable reference as `Uart` if this device is the UART.
    fn as_uart_mut(&mut self) -> Option<&mut Uart> {
        None
    }

    /// Returns a mutable reference as `Mailbox` if this device is the
    /// mailbox.
    fn as_mailbox_mut(&mut self) -> Option<&mut Mailbox> {
        None
    }
}
