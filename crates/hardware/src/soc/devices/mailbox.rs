//! Inter-process mailbox peripheral.
//!
//! Two bounded word FIFOs connect the guest to the host process: the guest
//! writes outbound words and reads inbound ones; the host posts inbound
//! words and collects outbound ones. A full queue drops its oldest entry.
//!
//! # Memory Map (word offsets)
//!
//! * `0`: DATA — write enqueues guest→host; read dequeues host→guest
//!   (0 when empty)
//! * `1`: STATUS — host→guest depth in the low 32 bits, guest→host depth
//!   in the high 32 bits

use std::collections::VecDeque;

use crate::soc::traits::Device;

/// Data register offset.
const REG_DATA: u64 = 0;
/// Status register offset.
const REG_STATUS: u64 = 1;

/// Size of the mapped region in words.
pub const REGION_WORDS: u64 = 4;

/// Mailbox device state.
pub struct Mailbox {
    /// Host → guest words.
    inbound: VecDeque<u64>,
    /// Guest → host words.
    outbound: VecDeque<u64>,
    capacity: usize,
}

impl Mailbox {
    /// Creates a mailbox whose queues hold at most `capacity` words each.
    pub fn new(capacity: usize) -> Self {
        Self {
            inbound: VecDeque::new(),
            outbound: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Posts a word from the host to the guest.
    pub fn post(&mut self, value: u64) {
        if self.inbound.len() >= self.capacity {
            let _ = self.inbound.pop_front();
        }
        self.inbound.push_back(value);
    }

    /// Collects the oldest word the guest has sent, if any.
    pub fn collect(&mut self) -> Option<u64> {
        self.outbound.pop_front()
    }
}

impl Device for Mailbox {
    fn name(&self) -> &str {
        "MAILBOX"
    }

    fn read(&mut self, offset: u64) -> u64 {
        match offset {
            REG_DATA => self.inbound.pop_front().unwrap_or(0),
            REG_STATUS => {
                (self.outbound.len() as u64) << 32 | self.inbound.len() as u64
            }
            _ => 0,
        }
    }

    fn write(&mut self, offset: u64, value: u64) {
        if offset == REG_DATA {
            if self.outbound.len() >= self.capacity {
                let _ = self.outbound.pop_front();
            }
            self.outbound.push_back(value);
        }
    }

    fn reset(&mut self) {
        self.inbound.clear();
        self.outbound.clear();
    }

    fn as_mailbox_mut(&mut self) -> Option<&mut Mailbox> {
        Some(self)
    }
}
