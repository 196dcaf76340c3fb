//! Serial port peripheral.
//!
//! A fully synchronous UART: guest writes append to a transmit buffer the
//! host drains with [`Uart::take_output`]; guest reads pop a receive queue
//! the host fills with [`Uart::push_input`]. With echo enabled, transmitted
//! bytes are also written straight to host stdout.
//!
//! # Memory Map (word offsets)
//!
//! * `0`: DATA — write transmits the low byte; read pops one received byte
//!   (0 when the queue is empty)
//! * `1`: STATUS — bit 0: receive data available; bit 1: transmitter ready
//!   (always set)

use std::collections::VecDeque;
use std::io::Write;

use crate::soc::traits::Device;

/// Data register offset.
const REG_DATA: u64 = 0;
/// Status register offset.
const REG_STATUS: u64 = 1;

/// Status bit: a received byte is waiting.
const STATUS_RX_READY: u64 = 1 << 0;
/// Status bit: the transmitter accepts a byte (always true here).
const STATUS_TX_READY: u64 = 1 << 1;

/// Size of the mapped region in words.
pub const REGION_WORDS: u64 = 4;

/// Serial port device state.
pub struct Uart {
    rx_queue: VecDeque<u8>,
    tx_buffer: Vec<u8>,
    echo: bool,
}

impl Uart {
    /// Creates a new UART.
    ///
    /// # Arguments
    ///
    /// * `echo` - When true, transmitted bytes are also written to host
    ///   stdout as they arrive.
    pub fn new(echo: bool) -> Self {
        Self {
            rx_queue: VecDeque::new(),
            tx_buffer: Vec::new(),
            echo,
        }
    }

    /// Queues bytes for the guest to receive.
    pub fn push_input(&mut self, bytes: &[u8]) {
        self.rx_queue.extend(bytes.iter().copied());
    }

    /// Takes everything the guest has transmitted so far.
    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.tx_buffer)
    }
}

impl Device for Uart {
    fn name(&self) -> &str {
        "UART"
    }

    fn read(&mut self, offset: u64) -> u64 {
        match offset {
            REG_DATA => self.rx_queue.pop_front().map_or(0, u64::from),
            REG_STATUS => {
                let rx = if self.rx_queue.is_empty() {
                    0
                } else {
                    STATUS_RX_READY
                };
                rx | STATUS_TX_READY
            }
            _ => 0,
        }
    }

    fn write(&mut self, offset: u64, value: u64) {
        if offset == REG_DATA {
            let byte = value as u8;
            self.tx_buffer.push(byte);
            if self.echo {
                let _ = std::io::stdout().write_all(&[byte]);
            }
        }
    }

    fn reset(&mut self) {
        self.rx_queue.clear();
        self.tx_buffer.clear();
    }

    fn teardown(&mut self) {
        if self.echo {
            let _ = std::io::stdout().flush();
        }
    }

    fn as_uart_mut(&mut self) -> Option<&mut Uart> {
        Some(self)
    }
}
