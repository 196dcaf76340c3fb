//! UART device tests.
//!
//! Verifies the transmit buffer, the receive queue, status bits, and reset.

use pretty_assertions::assert_eq;
use savm_core::soc::devices::Uart;
use savm_core::soc::traits::Device;

const REG_DATA: u64 = 0;
const REG_STATUS: u64 = 1;

const STATUS_RX_READY: u64 = 1 << 0;
const STATUS_TX_READY: u64 = 1 << 1;

// ══════════════════════════════════════════════════════════
// 1. Transmit path
// ══════════════════════════════════════════════════════════

#[test]
fn data_writes_accumulate_in_the_tx_buffer() {
    let mut uart = Uart::new(false);
    for byte in b"ok\n" {
        uart.write(REG_DATA, u64::from(*byte));
    }
    assert_eq!(uart.take_output(), b"ok\n");
    // The buffer was drained.
    assert_eq!(uart.take_output(), Vec::<u8>::new());
}

#[test]
fn only_the_low_byte_is_transmitted() {
    let mut uart = Uart::new(false);
    uart.write(REG_DATA, 0x1234_5641);
    assert_eq!(uart.take_output(), vec![0x41]);
}

#[test]
fn transmitter_is_always_ready() {
    let mut uart = Uart::new(false);
    assert_ne!(uart.read(REG_STATUS) & STATUS_TX_READY, 0);
}

// ══════════════════════════════════════════════════════════
// 2. Receive path
// ══════════════════════════════════════════════════════════

#[test]
fn data_reads_pop_the_rx_queue_in_order() {
    let mut uart = Uart::new(false);
    uart.push_input(b"hi");
    assert_eq!(uart.read(REG_DATA), u64::from(b'h'));
    assert_eq!(uart.read(REG_DATA), u64::from(b'i'));
    // Empty queue reads zero.
    assert_eq!(uart.read(REG_DATA), 0);
}

#[test]
fn rx_ready_tracks_queue_contents() {
    let mut uart = Uart::new(false);
    assert_eq!(uart.read(REG_STATUS) & STATUS_RX_READY, 0);
    uart.push_input(b"x");
    assert_ne!(uart.read(REG_STATUS) & STATUS_RX_READY, 0);
    let _ = uart.read(REG_DATA);
    assert_eq!(uart.read(REG_STATUS) & STATUS_RX_READY, 0);
}

// ══════════════════════════════════════════════════════════
// 3. Reset and undefined offsets
// ══════════════════════════════════════════════════════════

#[test]
fn reset_drops_both_directions() {
    let mut uart = Uart::new(false);
    uart.push_input(b"pending");
    uart.write(REG_DATA, u64::from(b'z'));
    uart.reset();
    assert_eq!(uart.read(REG_DATA), 0);
    assert_eq!(uart.take_output(), Vec::<u8>::new());
}

#[test]
fn undefined_offsets_read_zero_and_ignore_writes() {
    let mut uart = Uart::new(false);
    uart.write(2, 0xFF);
    assert_eq!(uart.read(2), 0);
    assert_eq!(uart.take_output(), Vec::<u8>::new());
}
