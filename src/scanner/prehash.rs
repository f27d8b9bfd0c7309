//! Partial-content signature hashing.
//!
//! # Overview
//!
//! A signature is the XxHash64 (seed 0) of a zero-filled [`PREHASH_SIZE`]
//! byte buffer loaded with the first bytes of a file. Hashing the whole
//! buffer rather than just the bytes read means a file shorter than the
//! window gets a stable, padding-inclusive signature. The signature is a
//! cheap prefilter only: equal signatures are always confirmed by full byte
//! comparison before anything is deleted.

use std::fs::File;
use std::hash::Hasher as _;
use std::io::Read;
use std::path::Path;

use twox_hash::XxHash64;

use super::HashError;

/// Number of bytes of file content fed into a signature.
///
/// Larger windows cost noticeably more read time per candidate without
/// meaningfully improving the prefilter.
pub const PREHASH_SIZE: usize = 30_000;

/// Prefix signature hasher with a reusable read buffer.
///
/// Each hashing thread owns one `Prehasher`; the buffer is re-zeroed before
/// every file so no bytes leak between signatures.
#[derive(Debug)]
pub struct Prehasher {
    buf: Vec<u8>,
}

impl Default for Prehasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Prehasher {
    /// Create a hasher with a fresh zeroed window buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; PREHASH_SIZE],
        }
    }

    /// Compute the signature of the first [`PREHASH_SIZE`] bytes of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read. Callers
    /// treat that as the "unmatchable" sentinel: the record keeps
    /// `prehash = None` and is excluded from bucketing.
    pub fn prehash(&mut self, path: &Path) -> Result<u64, HashError> {
        self.buf.fill(0);

        let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;

        // Read up to the window size; short files leave the zero padding.
        let mut filled = 0usize;
        while filled < self.buf.len() {
            match file.read(&mut self.buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path, e)),
            }
        }

        let mut hasher = XxHash64::with_seed(0);
        hasher.write(&self.buf);
        Ok(hasher.finish())
    }
}
