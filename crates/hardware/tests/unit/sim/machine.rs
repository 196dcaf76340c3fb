//! Machine construction, reset, and host device access tests.

use pretty_assertions::assert_eq;
use savm_core::Machine;
use savm_core::common::error::{BusError, VmError};
use savm_core::core::interrupt::InterruptKind;

use crate::common::harness::{machine, machine_with_program, test_config};

// ══════════════════════════════════════════════════════════
// 1. Construction
// ══════════════════════════════════════════════════════════

#[test]
fn new_machine_maps_ram_and_all_three_peripherals() {
    let mut m = machine();
    let sys = m.config.system.clone();
    assert_eq!(m.bus.read(sys.ram_base).unwrap(), 0);
    // Peripheral status registers answer at their configured bases.
    assert!(m.bus.read(sys.rtc_base + 1).is_ok());
    assert!(m.bus.read(sys.mailbox_base + 1).is_ok());
    assert!(m.bus.read(sys.uart_base + 1).is_ok());
}

#[test]
fn new_machine_starts_idle_and_zeroed() {
    let m = machine();
    assert!(!m.cpu.running);
    assert_eq!(m.cpu.regs.pc, 0);
    assert_eq!(m.cpu.ivt, [0; 6]);
    assert_eq!(m.cpu.last_interrupt, None);
    assert_eq!(m.cpu.stack_capacity(), m.config.system.stack_capacity);
}

#[test]
fn colliding_device_regions_fail_setup() {
    let mut config = test_config();
    // Identical (start, end) pairs: both regions span four words.
    config.system.mailbox_base = config.system.rtc_base;
    assert!(matches!(
        Machine::new(config),
        Err(VmError::Bus(BusError::AlreadyMapped { .. }))
    ));
}

// ══════════════════════════════════════════════════════════
// 2. Reset
// ══════════════════════════════════════════════════════════

#[test]
fn reset_restores_the_power_on_state() {
    let mut m = machine_with_program("main:\n  mov %data0, 5\n  hlt\n");
    let base = m.config.system.ram_base;
    m.cpu.ivt[2] = 0x9000;
    let _ = m.run(None).unwrap();
    assert_ne!(m.cpu.regs.data[0], 0);

    m.reset().unwrap();

    // Registers, vector table, stats, and RAM contents are all pristine.
    assert_eq!(m.cpu.regs.data[0], 0);
    assert_eq!(m.cpu.regs.pc, 0);
    assert_eq!(m.cpu.ivt, [0; 6]);
    assert_eq!(m.cpu.last_interrupt, None);
    assert_eq!(m.stats.cycles, 0);
    assert_eq!(m.bus.read(base).unwrap(), 0);
}

#[test]
fn reset_rebuilds_the_memory_map() {
    let mut m = machine();
    let base = m.config.system.ram_base;
    m.bus.write(base, 1234).unwrap();
    m.reset().unwrap();
    // The same window answers again, backed by fresh storage.
    assert_eq!(m.bus.read(base).unwrap(), 0);
    m.bus.write(base, 5678).unwrap();
    assert_eq!(m.bus.read(base).unwrap(), 5678);
}

// ══════════════════════════════════════════════════════════
// 3. Bulk load and dump
// ══════════════════════════════════════════════════════════

#[test]
fn load_words_writes_consecutive_addresses() {
    let mut m = machine();
    let base = m.config.system.ram_base;
    m.load_words(base + 4, &[10, 20, 30]).unwrap();
    assert_eq!(m.bus.read(base + 4).unwrap(), 10);
    assert_eq!(m.bus.read(base + 5).unwrap(), 20);
    assert_eq!(m.bus.read(base + 6).unwrap(), 30);
}

#[test]
fn dump_words_reads_back_a_loaded_range() {
    let mut m = machine();
    let base = m.config.system.ram_base;
    let words = vec![7, 8, 9, 10];
    m.load_words(base, &words).unwrap();
    assert_eq!(m.dump_words(base, 4).unwrap(), words);
}

#[test]
fn bulk_access_outside_the_map_fails() {
    let mut m = machine();
    assert!(matches!(
        m.load_words(0x40, &[1]),
        Err(VmError::Bus(BusError::Unmapped { .. }))
    ));
    assert!(matches!(
        m.dump_words(0x40, 1),
        Err(VmError::Bus(BusError::Unmapped { .. }))
    ));
}

#[test]
fn load_image_groups_bytes_into_padded_words() {
    let mut m = machine();
    let base = m.config.system.ram_base;
    let mut bytes = vec![0u8; 8];
    bytes[0] = 0x11;
    bytes.push(0x22); // ninth byte starts a second, partial word
    let written = m.load_image(base, &bytes).unwrap();
    assert_eq!(written, 2);
    assert_eq!(m.bus.read(base).unwrap(), 0x11);
    assert_eq!(m.bus.read(base + 1).unwrap(), 0x22);
}

// ══════════════════════════════════════════════════════════
// 4. Host device access
// ══════════════════════════════════════════════════════════

#[test]
fn guest_uart_writes_reach_the_host() {
    let mut m = machine_with_program("main:\n  mov $0x10000000, 'H'\n  hlt\n");
    let _ = m.run(None).unwrap();
    let uart = m.uart_mut().expect("uart mapped");
    assert_eq!(uart.take_output(), b"H");
}

#[test]
fn host_uart_input_reaches_the_guest() {
    let mut m = machine_with_program("main:\n  mov %data0, $0x10000000\n  hlt\n");
    m.uart_mut().expect("uart mapped").push_input(b"Q");
    let _ = m.run(None).unwrap();
    assert_eq!(m.cpu.regs.data[0], u64::from(b'Q'));
}

#[test]
fn mailbox_words_cross_in_both_directions() {
    let mut m = machine_with_program(
        "main:\n  mov %data0, $0x3000000\n  mov $0x3000000, 55\n  hlt\n",
    );
    m.mailbox_mut().expect("mailbox mapped").post(44);
    let _ = m.run(None).unwrap();
    assert_eq!(m.cpu.regs.data[0], 44);
    assert_eq!(m.mailbox_mut().unwrap().collect(), Some(55));
}

// ══════════════════════════════════════════════════════════
// 5. Statistics
// ══════════════════════════════════════════════════════════

#[test]
fn stats_count_cycles_and_interrupts() {
    let mut m = machine_with_program("main:\n  int 1\n  hlt\n");
    let _ = m.run(None).unwrap();
    assert_eq!(m.stats.cycles, 2);
    assert_eq!(m.stats.instructions_retired, 2);
    assert_eq!(m.stats.interrupts_taken, 1);
    assert_eq!(
        m.stats.interrupts_by_kind[InterruptKind::Fault.number() as usize],
        1
    );
}
