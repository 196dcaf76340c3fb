//! Timer / real-time clock peripheral.
//!
//! Provides wall-clock time and a compare-based timer. A divider scales
//! machine cycles to timer ticks; when the uptime counter reaches the
//! compare register the device reports a `TIMER` interrupt and disarms.
//!
//! # Memory Map (word offsets)
//!
//! * `0`: TIME — wall-clock seconds since the Unix epoch (read-only)
//! * `1`: UPTIME — timer ticks since reset (read-only)
//! * `2`: COMPARE — tick count that fires the timer; `u64::MAX` disarms

use std::time::{SystemTime, UNIX_EPOCH};

use crate::core::interrupt::InterruptKind;
use crate::soc::traits::Device;

/// Wall-clock seconds register offset.
const REG_TIME: u64 = 0;
/// Uptime tick counter register offset.
const REG_UPTIME: u64 = 1;
/// Timer compare register offset.
const REG_COMPARE: u64 = 2;

/// Size of the mapped region in words.
pub const REGION_WORDS: u64 = 4;

/// Timer/RTC device state.
pub struct Rtc {
    /// Timer ticks since reset.
    uptime: u64,
    /// Tick count at which the timer fires; `u64::MAX` means disarmed.
    compare: u64,
    /// Machine cycles per timer tick.
    divider: u64,
    /// Cycle counter for the divider.
    counter: u64,
}

impl Rtc {
    /// Creates a new RTC.
    ///
    /// # Arguments
    ///
    /// * `divider` - Machine cycles per timer tick; 0 is treated as 1.
    pub fn new(divider: u64) -> Self {
        Self {
            uptime: 0,
            compare: u64::MAX,
            divider: if divider == 0 { 1 } else { divider },
            counter: 0,
        }
    }

    fn wall_clock_secs() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs())
    }
}

impl Device for Rtc {
    fn name(&self) -> &str {
        "RTC"
    }

    fn read(&mut self, offset: u64) -> u64 {
        match offset {
            REG_TIME => Self::wall_clock_secs(),
            REG_UPTIME => self.uptime,
            REG_COMPARE => self.compare,
            _ => 0,
        }
    }

    fn write(&mut self, offset: u64, value: u64) {
        if offset == REG_COMPARE {
            self.compare = value;
        }
    }

    fn reset(&mut self) {
        self.uptime = 0;
        self.compare = u64::MAX;
        self.counter = 0;
    }

    fn tick(&mut self) -> Option<InterruptKind> {
        self.counter += 1;
        if self.counter >= self.divider {
            self.uptime = self.uptime.wrapping_add(1);
            self.counter = 0;
        }
        if self.uptime >= self.compare {
            // One shot: the handler re-arms by writing COMPARE again.
            self.compare = u64::MAX;
            return Some(InterruptKind::Timer);
        }
        None
    }
}
