//! Machine configuration.
//!
//! This module defines the configuration structures used to parameterize a
//! machine. It provides:
//! 1. **Defaults:** Baseline hardware constants (RAM window backing, stack
//!    capacity, device bases, timer divider).
//! 2. **Structures:** Hierarchical config for general and system settings.
//!
//! Configuration is supplied as JSON (e.g. via the CLI's `--config` flag) or
//! use `Config::default()`.

use serde::Deserialize;

/// Default configuration constants for the machine.
mod defaults {
    /// Base address of the reserved RAM window.
    ///
    /// Function references and the boot quirk resolve against this base;
    /// changing it changes the address every assembled image expects.
    pub const RAM_BASE: u64 = 0xA000_0000;

    /// Backed RAM size in 64-bit words (16 Mi words = 128 MiB).
    ///
    /// The architectural window is far larger; only this prefix is backed
    /// by host memory. Accesses past it miss the bus and fault.
    pub const RAM_WORDS: u64 = 0x0100_0000;

    /// Call/data stack capacity in words.
    pub const STACK_CAPACITY: usize = 20;

    /// Base address of the timer/RTC MMIO region.
    pub const RTC_BASE: u64 = 0x0200_0000;

    /// Base address of the mailbox MMIO region.
    pub const MAILBOX_BASE: u64 = 0x0300_0000;

    /// Base address of the UART MMIO region.
    pub const UART_BASE: u64 = 0x1000_0000;

    /// Machine cycles per RTC timer tick.
    pub const RTC_DIVIDER: u64 = 1024;

    /// Mailbox queue capacity in words, each direction.
    pub const MAILBOX_CAPACITY: usize = 64;
}

/// General simulation settings.
#[derive(Clone, Debug, Deserialize)]
pub struct GeneralConfig {
    /// Emit a trace event for every executed instruction.
    #[serde(default)]
    pub trace_execution: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            trace_execution: false,
        }
    }
}

/// Hardware layout and sizing.
#[derive(Clone, Debug, Deserialize)]
pub struct SystemConfig {
    /// Base address of the reserved RAM window.
    #[serde(default = "SystemConfig::default_ram_base")]
    pub ram_base: u64,

    /// Backed RAM size in words.
    #[serde(default = "SystemConfig::default_ram_words")]
    pub ram_words: u64,

    /// Call/data stack capacity in words.
    #[serde(default = "SystemConfig::default_stack_capacity")]
    pub stack_capacity: usize,

    /// Base address of the timer/RTC region.
    #[serde(default = "SystemConfig::default_rtc_base")]
    pub rtc_base: u64,

    /// Base address of the mailbox region.
    #[serde(default = "SystemConfig::default_mailbox_base")]
    pub mailbox_base: u64,

    /// Base address of the UART region.
    #[serde(default = "SystemConfig::default_uart_base")]
    pub uart_base: u64,

    /// Machine cycles per RTC timer tick.
    #[serde(default = "SystemConfig::default_rtc_divider")]
    pub rtc_divider: u64,

    /// Mailbox queue capacity in words, each direction.
    #[serde(default = "SystemConfig::default_mailbox_capacity")]
    pub mailbox_capacity: usize,

    /// Echo UART output to host stdout as it is transmitted.
    #[serde(default)]
    pub uart_echo: bool,
}

impl SystemConfig {
    fn default_ram_base() -> u64 {
        defaults::RAM_BASE
    }
    fn default_ram_words() -> u64 {
        defaults::RAM_WORDS
    }
    fn default_stack_capacity() -> usize {
        defaults::STACK_CAPACITY
    }
    fn default_rtc_base() -> u64 {
        defaults::RTC_BASE
    }
    fn default_mailbox_base() -> u64 {
        defaults::MAILBOX_BASE
    }
    fn default_uart_base() -> u64 {
        defaults::UART_BASE
    }
    fn default_rtc_divider() -> u64 {
        defaults::RTC_DIVIDER
    }
    fn default_mailbox_capacity() -> usize {
        defaults::MAILBOX_CAPACITY
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            ram_base: defaults::RAM_BASE,
            ram_words: defaults::RAM_WORDS,
            stack_capacity: defaults::STACK_CAPACITY,
            rtc_base: defaults::RTC_BASE,
            mailbox_base: defaults::MAILBOX_BASE,
            uart_base: defaults::UART_BASE,
            rtc_divider: defaults::RTC_DIVIDER,
            mailbox_capacity: defaults::MAILBOX_CAPACITY,
            uart_echo: false,
        }
    }
}

/// Root configuration type.
///
/// # Example
///
/// ```
/// let json = r#"{ "system": { "ram_words": 16384 } }"#;
/// let config: savm_core::Config = serde_json::from_str(json).unwrap();
/// assert_eq!(config.system.ram_words, 16384);
/// ```
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// General simulation settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Hardware layout and sizing.
    #[serde(default)]
    pub system: SystemConfig,
}
