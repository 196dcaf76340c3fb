//! Machine construction helpers for tests.

use savm_core::asm;
use savm_core::{Config, Machine};

/// Installs a test-friendly tracing subscriber (once per process).
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Small-RAM configuration so machine setup stays cheap in tests.
///
/// The RTC divider is 1 so timer behavior is observable cycle by cycle.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.system.ram_words = 0x4000;
    config.system.rtc_divider = 1;
    config
}

/// Builds a fresh machine from [`test_config`].
pub fn machine() -> Machine {
    init_logging();
    Machine::new(test_config()).expect("machine setup")
}

/// Assembles source text, failing the test on any assembler error.
pub fn assemble_ok(source: &str) -> Vec<u8> {
    let assembly = asm::assemble_source(source);
    assert!(
        assembly.errors.is_empty(),
        "assembly errors: {:?}",
        assembly.errors
    );
    assembly.code
}

/// Builds a machine with the assembled program loaded at the RAM base.
pub fn machine_with_program(source: &str) -> Machine {
    let mut machine = machine();
    let base = machine.config.system.ram_base;
    let code = assemble_ok(source);
    let _ = machine.load_image(base, &code).expect("image load");
    machine
}
