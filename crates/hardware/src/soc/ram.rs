//! Word-addressed RAM backed by a lazily-allocated buffer.
//!
//! On Unix the buffer is an anonymous `mmap`, so pages are only committed
//! when the guest touches them — a large mapped window costs no host memory
//! up front. Elsewhere it falls back to a zeroed `Vec`. The buffer provides
//! interior storage only; address routing lives in the bus.

use crate::soc::traits::Device;

/// A raw 64-bit-word buffer with lazy allocation on Unix.
pub struct WordBuffer {
    ptr: *mut u64,
    words: usize,
    is_mmap: bool,
}

impl WordBuffer {
    /// Allocates a zeroed buffer of the given word count.
    ///
    /// On Unix, uses `mmap` so untouched pages stay uncommitted; panics if
    /// the mapping fails (an unrecoverable setup error).
    pub fn new(words: usize) -> Self {
        #[cfg(unix)]
        {
            use std::ptr;
            let bytes = words * size_of::<u64>();
            // SAFETY: anonymous private mapping; no file descriptor, no
            // aliasing. MAP_ANONYMOUS memory is zero-initialized.
            let ptr = unsafe {
                libc::mmap(
                    ptr::null_mut(),
                    bytes,
                    libc::PROT_READ | libc::PROT_WRITE,
                    libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                    -1,
                    0,
                )
            };
            if ptr == libc::MAP_FAILED {
                panic!("failed to mmap RAM buffer of {words} words");
            }
            Self {
                ptr: ptr.cast::<u64>(),
                words,
                is_mmap: true,
            }
        }

        #[cfg(not(unix))]
        {
            let mut vec = vec![0u64; words];
            let ptr = vec.as_mut_ptr();
            std::mem::forget(vec);
            Self {
                ptr,
                words,
                is_mmap: false,
            }
        }
    }

    /// Returns the buffer length in words.
    pub fn len(&self) -> usize {
        self.words
    }

    /// Returns whether the buffer holds no words.
    pub fn is_empty(&self) -> bool {
        self.words == 0
    }

    /// Reads the word at `index`; panics on out-of-range access (the bus
    /// only dispatches offsets inside the mapped range).
    pub fn get(&self, index: usize) -> u64 {
        assert!(index < self.words, "word index {index} out of range");
        // SAFETY: index is bounds-checked against the allocation above.
        unsafe { *self.ptr.add(index) }
    }

    /// Writes the word at `index`; panics on out-of-range access.
    pub fn set(&mut self, index: usize, value: u64) {
        assert!(index < self.words, "word index {index} out of range");
        // SAFETY: index is bounds-checked against the allocation above.
        unsafe { *self.ptr.add(index) = value };
    }
}

impl Drop for WordBuffer {
    fn drop(&mut self) {
        if self.is_mmap {
            #[cfg(unix)]
            // SAFETY: ptr/len exactly match the original mapping.
            unsafe {
                let _ = libc::munmap(self.ptr.cast(), self.words * size_of::<u64>());
            }
        } else {
            // SAFETY: reconstructs the Vec forgotten in `new` with its
            // original pointer, length, and capacity.
            unsafe {
                drop(Vec::from_raw_parts(self.ptr, self.words, self.words));
            }
        }
    }
}

/// The main RAM region of the machine.
pub struct Ram {
    buffer: WordBuffer,
}

impl Ram {
    /// Allocates RAM of the given word count.
    pub fn new(words: u64) -> Self {
        Self {
            buffer: WordBuffer::new(words as usize),
        }
    }
}

impl Device for Ram {
    fn name(&self) -> &str {
        "RAM"
    }

    fn read(&mut self, offset: u64) -> u64 {
        self.buffer.get(offset as usize)
    }

    fn write(&mut self, offset: u64, value: u64) {
        self.buffer.set(offset as usize, value);
    }
}
