//! Image loader tests.
//!
//! Verifies byte/word grouping, file round-trips through a machine, and the
//! I/O error path.

use pretty_assertions::assert_eq;
use savm_core::common::error::VmError;
use savm_core::sim::loader::{self, bytes_from_words, words_from_bytes};

use crate::common::harness::{assemble_ok, machine};

// ══════════════════════════════════════════════════════════
// 1. Byte/word grouping
// ══════════════════════════════════════════════════════════

#[test]
fn bytes_group_into_little_endian_words() {
    let bytes = [1, 0, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0];
    assert_eq!(words_from_bytes(&bytes), vec![1, 2]);
}

#[test]
fn trailing_partial_word_is_zero_padded() {
    let words = words_from_bytes(&[0xAA, 0xBB]);
    assert_eq!(words, vec![0xBBAA]);
}

#[test]
fn empty_input_produces_no_words() {
    assert_eq!(words_from_bytes(&[]), Vec::<u64>::new());
}

#[test]
fn words_flatten_back_to_bytes() {
    let words = [0x0102_0304_0506_0708, 42];
    let bytes = bytes_from_words(&words);
    assert_eq!(bytes.len(), 16);
    assert_eq!(words_from_bytes(&bytes), words);
}

// ══════════════════════════════════════════════════════════
// 2. File round-trips
// ══════════════════════════════════════════════════════════

#[test]
fn assembled_image_survives_a_file_round_trip() {
    let code = assemble_ok("main:\n  mov %data0, 5\n  hlt\n");
    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("boot.bin");
    std::fs::write(&image_path, &code).unwrap();

    let mut m = machine();
    let base = m.config.system.ram_base;
    let words = loader::load_file(&mut m, base, &image_path).unwrap();
    assert_eq!(words, (code.len() / 8) as u64);

    // The loaded words execute as assembled.
    let _ = m.run(None).unwrap();
    assert_eq!(m.cpu.regs.data[0], 5);
}

#[test]
fn dump_file_writes_what_load_file_read() {
    let dir = tempfile::tempdir().unwrap();
    let in_path = dir.path().join("in.bin");
    let out_path = dir.path().join("out.bin");
    let payload: Vec<u8> = (0..32).collect();
    std::fs::write(&in_path, &payload).unwrap();

    let mut m = machine();
    let base = m.config.system.ram_base;
    let words = loader::load_file(&mut m, base, &in_path).unwrap();
    loader::dump_file(&mut m, base, words, &out_path).unwrap();

    assert_eq!(std::fs::read(&out_path).unwrap(), payload);
}

// ══════════════════════════════════════════════════════════
// 3. Failure paths
// ══════════════════════════════════════════════════════════

#[test]
fn missing_file_is_an_io_error() {
    let mut m = machine();
    let base = m.config.system.ram_base;
    let result = loader::load_file(&mut m, base, std::path::Path::new("/no/such/image.bin"));
    assert!(matches!(result, Err(VmError::Io(_))));
}

#[test]
fn load_outside_the_map_is_a_bus_error() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("img.bin");
    std::fs::write(&image_path, [0u8; 8]).unwrap();

    let mut m = machine();
    let result = loader::load_file(&mut m, 0x40, &image_path);
    assert!(matches!(result, Err(VmError::Bus(_))));
}
