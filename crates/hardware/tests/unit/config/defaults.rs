//! Configuration structure tests.
//!
//! Verifies the documented defaults, JSON deserialization with partial
//! overrides, and that omitted sections fall back field by field.

use pretty_assertions::assert_eq;
use savm_core::config::{Config, GeneralConfig, SystemConfig};

// ══════════════════════════════════════════════════════════
// 1. Defaults
// ══════════════════════════════════════════════════════════

#[test]
fn general_defaults() {
    let general = GeneralConfig::default();
    assert!(!general.trace_execution);
}

#[test]
fn system_defaults() {
    let system = SystemConfig::default();
    assert_eq!(system.ram_base, 0xA000_0000);
    assert_eq!(system.ram_words, 0x0100_0000);
    assert_eq!(system.stack_capacity, 20);
    assert_eq!(system.rtc_base, 0x0200_0000);
    assert_eq!(system.mailbox_base, 0x0300_0000);
    assert_eq!(system.uart_base, 0x1000_0000);
    assert_eq!(system.rtc_divider, 1024);
    assert_eq!(system.mailbox_capacity, 64);
    assert!(!system.uart_echo);
}

#[test]
fn root_default_composes_sections() {
    let config = Config::default();
    assert!(!config.general.trace_execution);
    assert_eq!(config.system.ram_base, 0xA000_0000);
}

// ══════════════════════════════════════════════════════════
// 2. JSON deserialization
// ══════════════════════════════════════════════════════════

#[test]
fn empty_object_parses_to_defaults() {
    let config: Config = serde_json::from_str("{}").unwrap();
    assert_eq!(config.system.ram_words, SystemConfig::default().ram_words);
    assert_eq!(config.system.stack_capacity, 20);
}

#[test]
fn partial_system_section_keeps_other_defaults() {
    let json = r#"{ "system": { "ram_words": 16384, "stack_capacity": 64 } }"#;
    let config: Config = serde_json::from_str(json).unwrap();
    assert_eq!(config.system.ram_words, 16384);
    assert_eq!(config.system.stack_capacity, 64);
    // Untouched fields keep their defaults.
    assert_eq!(config.system.ram_base, 0xA000_0000);
    assert_eq!(config.system.rtc_divider, 1024);
}

#[test]
fn general_section_parses() {
    let json = r#"{ "general": { "trace_execution": true } }"#;
    let config: Config = serde_json::from_str(json).unwrap();
    assert!(config.general.trace_execution);
}

#[test]
fn full_config_parses() {
    let json = r#"{
        "general": { "trace_execution": false },
        "system": {
            "ram_base": 2684354560,
            "ram_words": 65536,
            "stack_capacity": 32,
            "rtc_base": 33554432,
            "mailbox_base": 50331648,
            "uart_base": 268435456,
            "rtc_divider": 16,
            "mailbox_capacity": 8,
            "uart_echo": true
        }
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();
    assert_eq!(config.system.ram_base, 0xA000_0000);
    assert_eq!(config.system.ram_words, 65536);
    assert_eq!(config.system.rtc_divider, 16);
    assert_eq!(config.system.mailbox_capacity, 8);
    assert!(config.system.uart_echo);
}

#[test]
fn malformed_json_is_an_error() {
    assert!(serde_json::from_str::<Config>("{ \"system\": [] }").is_err());
}
