//! Memory-mapped peripherals.
//!
//! The three devices the machine registers on its bus: a timer/RTC, an
//! inter-process mailbox, and a serial port. Their per-cycle ticks run in
//! registration order (rtc, mailbox, uart).

/// Inter-process mailbox (bounded two-way word FIFO).
pub mod mailbox;

/// Timer / real-time clock.
pub mod rtc;

/// Serial port.
pub mod uart;

pub use mailbox::Mailbox;
pub use rtc::Rtc;
pub use uart::Uart;

pub use crate::soc::traits::Device;
