//! Bounded stack tests.
//!
//! Full-on-push and empty-on-pop are distinct checks but share the one
//! architectural `STACK_OVERFLOW` interrupt kind.

use savm_core::core::cpu::Cpu;
use savm_core::core::interrupt::InterruptKind;

// ══════════════════════════════════════════════════════════
// 1. Capacity
// ══════════════════════════════════════════════════════════

#[test]
fn pushing_exactly_capacity_succeeds() {
    let mut cpu = Cpu::new(4);
    for value in 0..4 {
        assert!(cpu.stack_push(value));
    }
    assert_eq!(cpu.regs.sp, 4);
    assert_eq!(cpu.last_interrupt, None);
}

#[test]
fn push_beyond_capacity_raises_stack_overflow() {
    let mut cpu = Cpu::new(4);
    for value in 0..4 {
        assert!(cpu.stack_push(value));
    }
    assert!(!cpu.stack_push(99));
    assert_eq!(cpu.last_interrupt, Some(InterruptKind::StackOverflow));
    // The value was not stored and sp did not move.
    assert_eq!(cpu.regs.sp, 4);
}

#[test]
fn pop_from_empty_stack_raises_stack_overflow() {
    let mut cpu = Cpu::new(4);
    assert_eq!(cpu.stack_pop(), None);
    assert_eq!(cpu.last_interrupt, Some(InterruptKind::StackOverflow));
}

#[test]
fn pop_with_corrupted_sp_raises_stack_overflow() {
    let mut cpu = Cpu::new(4);
    // A program can clobber sp through the register file.
    cpu.regs.sp = 1000;
    assert_eq!(cpu.stack_pop(), None);
    assert_eq!(cpu.last_interrupt, Some(InterruptKind::StackOverflow));
}

// ══════════════════════════════════════════════════════════
// 2. Ordering
// ══════════════════════════════════════════════════════════

#[test]
fn stack_is_last_in_first_out() {
    let mut cpu = Cpu::new(8);
    for value in [10, 20, 30] {
        assert!(cpu.stack_push(value));
    }
    assert_eq!(cpu.stack_pop(), Some(30));
    assert_eq!(cpu.stack_pop(), Some(20));
    assert_eq!(cpu.stack_pop(), Some(10));
    assert_eq!(cpu.last_interrupt, None);
}
