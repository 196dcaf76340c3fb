//! Memory bus: ordered address-range mappings over devices.
//!
//! This module implements the bus that routes word accesses to devices. It
//! provides:
//! 1. **Registration:** Half-open `[start, end)` ranges; an exact duplicate
//!    pair is rejected, partial overlaps are resolved by registration order
//!    (first match wins — a preserved modeling limitation).
//! 2. **Access routing:** `read`/`write` scan mappings in registration order
//!    and dispatch at a range-relative offset; a miss is the distinguished
//!    `Unmapped` error, returned rather than unwound.
//! 3. **Lifecycle fan-out:** Reset, per-cycle tick (in registration order),
//!    and teardown across every registered device.

use tracing::debug;

use crate::common::error::BusError;
use crate::core::interrupt::InterruptKind;
use crate::soc::devices::{Mailbox, Uart};
use crate::soc::traits::Device;

/// One registered address range and its backing device.
struct Mapping {
    start: u64,
    end: u64,
    device: Box<dyn Device>,
}

/// The machine bus; owns every mapped device.
#[derive(Default)]
pub struct Bus {
    mappings: Vec<Mapping>,
}

impl Bus {
    /// Creates an empty bus with no mappings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a device over the half-open range `[start, end)`.
    ///
    /// # Arguments
    ///
    /// * `start` - First address covered by the region.
    /// * `end` - One past the last covered address.
    /// * `device` - The backing device; the bus takes ownership.
    ///
    /// # Returns
    ///
    /// [`BusError::AlreadyMapped`] when an identical `(start, end)` pair is
    /// already registered. Partial overlaps are not checked.
    pub fn map(&mut self, start: u64, end: u64, device: Box<dyn Device>) -> Result<(), BusError> {
        if self
            .mappings
            .iter()
            .any(|m| m.start == start && m.end == end)
        {
            return Err(BusError::AlreadyMapped { start, end });
        }
        debug!(start = format_args!("{start:#x}"), end = format_args!("{end:#x}"), device = device.name(), "mapped region");
        self.mappings.push(Mapping { start, end, device });
        Ok(())
    }

    /// Reads the word at an absolute address.
    ///
    /// # Returns
    ///
    /// The word from the first mapping containing the address, or
    /// [`BusError::Unmapped`] when no mapping matches.
    pub fn read(&mut self, addr: u64) -> Result<u64, BusError> {
        for mapping in &mut self.mappings {
            if mapping.start <= addr && addr < mapping.end {
                return Ok(mapping.device.read(addr - mapping.start));
            }
        }
        Err(BusError::Unmapped { addr })
    }

    /// Writes the word at an absolute address.
    ///
    /// # Returns
    ///
    /// [`BusError::Unmapped`] when no mapping contains the address.
    pub fn write(&mut self, addr: u64, value: u64) -> Result<(), BusError> {
        for mapping in &mut self.mappings {
            if mapping.start <= addr && addr < mapping.end {
                mapping.device.write(addr - mapping.start, value);
                return Ok(());
            }
        }
        Err(BusError::Unmapped { addr })
    }

    /// Resets every registered device, in registration order.
    pub fn reset_all(&mut self) {
        for mapping in &mut self.mappings {
            mapping.device.reset();
        }
    }

    /// Ticks every registered device once, in registration order.
    ///
    /// # Arguments
    ///
    /// * `raised` - Receives the interrupt kinds reported by devices this
    ///   cycle, in device order.
    pub fn tick_all(&mut self, raised: &mut Vec<InterruptKind>) {
        for mapping in &mut self.mappings {
            if let Some(kind) = mapping.device.tick() {
                raised.push(kind);
            }
        }
    }

    /// Tears down and drops every mapping.
    pub fn clear(&mut self) {
        for mapping in &mut self.mappings {
            mapping.device.teardown();
        }
        self.mappings.clear();
    }

    /// Returns the mapped UART, if one is registered.
    pub fn uart_mut(&mut self) -> Option<&mut Uart> {
        self.mappings
            .iter_mut()
            .find_map(|m| m.device.as_uart_mut())
    }

    /// Returns the mapped mailbox, if one is registered.
    pub fn mailbox_mut(&mut self) -> Option<&mut Mailbox> {
        self.mappings
            .iter_mut()
            .find_map(|m| m.device.as_mailbox_mut())
    }
}

impl Drop for Bus {
    fn drop(&mut self) {
        self.clear();
    }
}
