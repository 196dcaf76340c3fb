//! Image loading and dumping.
//!
//! Images on disk are flat byte streams; on the bus they are 64-bit words.
//! These helpers group bytes into little-endian words (matching the
//! assembler's record serialization), push them through the bus starting at
//! a base address, and flatten them back out for dumps.

use std::fs;
use std::path::Path;

use crate::common::error::VmError;
use crate::sim::machine::Machine;

/// Groups bytes into little-endian 64-bit words.
///
/// A trailing partial word is zero-padded.
pub fn words_from_bytes(bytes: &[u8]) -> Vec<u64> {
    bytes
        .chunks(8)
        .map(|chunk| {
            let mut word = [0u8; 8];
            word[..chunk.len()].copy_from_slice(chunk);
            u64::from_le_bytes(word)
        })
        .collect()
}

/// Flattens words back into little-endian bytes.
pub fn bytes_from_words(words: &[u64]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(words.len() * 8);
    for word in words {
        bytes.extend_from_slice(&word.to_le_bytes());
    }
    bytes
}

/// Loads a file image into the machine at `base`.
///
/// # Returns
///
/// The number of words written, or the I/O or bus failure.
pub fn load_file(machine: &mut Machine, base: u64, path: &Path) -> Result<u64, VmError> {
    let bytes = fs::read(path)?;
    machine.load_image(base, &bytes)
}

/// Dumps `count` words from the machine starting at `base` into a file.
pub fn dump_file(machine: &mut Machine, base: u64, count: u64, path: &Path) -> Result<(), VmError> {
    let words = machine.dump_words(base, count)?;
    fs::write(path, bytes_from_words(&words))?;
    Ok(())
}
