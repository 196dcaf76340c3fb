//! Timer/RTC device tests.
//!
//! Verifies the divider-scaled uptime counter, the compare-and-disarm timer,
//! wall-clock reads, and reset behavior.

use savm_core::core::interrupt::InterruptKind;
use savm_core::soc::devices::Rtc;
use savm_core::soc::traits::Device;

const REG_TIME: u64 = 0;
const REG_UPTIME: u64 = 1;
const REG_COMPARE: u64 = 2;

// ══════════════════════════════════════════════════════════
// 1. Uptime and divider
// ══════════════════════════════════════════════════════════

#[test]
fn uptime_advances_once_per_divider_cycles() {
    let mut rtc = Rtc::new(4);
    for _ in 0..3 {
        assert_eq!(rtc.tick(), None);
    }
    assert_eq!(rtc.read(REG_UPTIME), 0);
    assert_eq!(rtc.tick(), None);
    assert_eq!(rtc.read(REG_UPTIME), 1);
}

#[test]
fn zero_divider_is_treated_as_one() {
    let mut rtc = Rtc::new(0);
    let _ = rtc.tick();
    assert_eq!(rtc.read(REG_UPTIME), 1);
}

// ══════════════════════════════════════════════════════════
// 2. Compare timer
// ══════════════════════════════════════════════════════════

#[test]
fn reaching_compare_reports_timer_and_disarms() {
    let mut rtc = Rtc::new(1);
    rtc.write(REG_COMPARE, 2);
    assert_eq!(rtc.tick(), None);
    assert_eq!(rtc.tick(), Some(InterruptKind::Timer));
    // One shot: the compare register reads back disarmed.
    assert_eq!(rtc.read(REG_COMPARE), u64::MAX);
    assert_eq!(rtc.tick(), None);
}

#[test]
fn rearming_fires_again() {
    let mut rtc = Rtc::new(1);
    rtc.write(REG_COMPARE, 1);
    assert_eq!(rtc.tick(), Some(InterruptKind::Timer));
    rtc.write(REG_COMPARE, 3);
    assert_eq!(rtc.tick(), None);
    assert_eq!(rtc.tick(), Some(InterruptKind::Timer));
}

#[test]
fn unarmed_timer_never_fires() {
    let mut rtc = Rtc::new(1);
    for _ in 0..100 {
        assert_eq!(rtc.tick(), None);
    }
}

// ══════════════════════════════════════════════════════════
// 3. Wall clock and reset
// ══════════════════════════════════════════════════════════

#[test]
fn time_register_reads_the_unix_epoch_clock() {
    let mut rtc = Rtc::new(1);
    // Any plausible present-day value; exact time is host-dependent.
    assert!(rtc.read(REG_TIME) > 1_500_000_000);
}

#[test]
fn writes_to_read_only_registers_are_ignored() {
    let mut rtc = Rtc::new(1);
    rtc.write(REG_TIME, 5);
    rtc.write(REG_UPTIME, 5);
    assert_eq!(rtc.read(REG_UPTIME), 0);
}

#[test]
fn reset_rewinds_uptime_and_disarms() {
    let mut rtc = Rtc::new(1);
    rtc.write(REG_COMPARE, 100);
    for _ in 0..5 {
        let _ = rtc.tick();
    }
    rtc.reset();
    assert_eq!(rtc.read(REG_UPTIME), 0);
    assert_eq!(rtc.read(REG_COMPARE), u64::MAX);
}

#[test]
fn undefined_offsets_read_zero() {
    let mut rtc = Rtc::new(1);
    assert_eq!(rtc.read(3), 0);
}
