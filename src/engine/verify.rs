//! Full byte-exact duplicate verification.
//!
//! # Overview
//!
//! The verifier is the last word before deletion: two records that share a
//! size and a prefix signature are only treated as duplicates after their
//! full content has been compared byte for byte. Each worker owns one
//! [`Verifier`] outright, so there is no buffer sharing between threads.
//!
//! The comparison buffers are allocated once at the configured maximum
//! compare size and reused for every pair. After every comparison (match,
//! mismatch or read failure) exactly the first `size` bytes of both buffers
//! are zeroed: stale trailing bytes from a previous larger file must never
//! be mistaken for content of a later, smaller file occupying the same slot.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::scanner::MediaRecord;

/// Outcome of a full-content comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOutcome {
    /// Both files are byte-identical over their full length.
    Match,
    /// At least one byte differs.
    NoMatch,
    /// The first file could not be opened or read; the pair is skipped.
    ReadErrorFirst,
    /// The second file could not be opened or read; the pair is skipped.
    ReadErrorSecond,
}

/// Byte-exact comparator with per-worker reusable buffers.
#[derive(Debug)]
pub struct Verifier {
    buf_first: Vec<u8>,
    buf_second: Vec<u8>,
}

impl Verifier {
    /// Create a verifier whose buffers hold up to `max_compare_size` bytes.
    ///
    /// The capacity must equal or exceed the scanner's size ceiling so that
    /// every admitted candidate fits.
    #[must_use]
    pub fn new(max_compare_size: u64) -> Self {
        let capacity = usize::try_from(max_compare_size).unwrap_or(usize::MAX);
        Self {
            buf_first: vec![0u8; capacity],
            buf_second: vec![0u8; capacity],
        }
    }

    /// Buffer capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf_first.len()
    }

    /// Compare two records known to share a size, byte for byte over exactly
    /// `size` bytes.
    ///
    /// A read failure on either side returns the corresponding `ReadError`
    /// outcome; the pair is skipped, nothing is fatal. No side effects
    /// beyond transient reads.
    pub fn compare(&mut self, first: &MediaRecord, second: &MediaRecord) -> CompareOutcome {
        debug_assert_eq!(
            first.size, second.size,
            "verifier called on records of different sizes"
        );

        let len = usize::try_from(first.size).unwrap_or(usize::MAX);
        if len > self.capacity() {
            // Collector contract violated; treat like an unreadable pair.
            log::warn!(
                "{} ({} bytes) exceeds the {} byte compare buffer",
                first.path.display(),
                first.size,
                self.capacity()
            );
            return CompareOutcome::ReadErrorFirst;
        }

        if read_exact_from(&first.path, &mut self.buf_first[..len]).is_err() {
            self.clear_used(len);
            return CompareOutcome::ReadErrorFirst;
        }

        if read_exact_from(&second.path, &mut self.buf_second[..len]).is_err() {
            self.clear_used(len);
            return CompareOutcome::ReadErrorSecond;
        }

        let matched = self.buf_first[..len] == self.buf_second[..len];
        self.clear_used(len);

        if matched {
            CompareOutcome::Match
        } else {
            CompareOutcome::NoMatch
        }
    }

    /// Zero exactly the bytes used by the last comparison.
    fn clear_used(&mut self, len: usize) {
        self.buf_first[..len].fill(0);
        self.buf_second[..len].fill(0);
    }
}

/// Open `path` and fill `buf` completely from the start of the file.
///
/// A file that has shrunk below the expected length since scanning fails
/// with `UnexpectedEof`, which callers treat as a read error.
fn read_exact_from(path: &Path, buf: &mut [u8]) -> io::Result<()> {
    let mut file = File::open(path)?;
    file.read_exact(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn record(path: PathBuf, size: u64) -> MediaRecord {
        MediaRecord::new(path, size)
    }

    #[test]
    fn test_identical_files_match() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.jpg");
        let b = dir.path().join("b.jpg");
        fs::write(&a, b"identical bytes").unwrap();
        fs::write(&b, b"identical bytes").unwrap();

        let mut verifier = Verifier::new(1024);
        let outcome = verifier.compare(&record(a, 15), &record(b, 15));
        assert_eq!(outcome, CompareOutcome::Match);
    }

    #[test]
    fn test_differing_files_no_match() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.jpg");
        let b = dir.path().join("b.jpg");
        fs::write(&a, b"content AAAAAAA").unwrap();
        fs::write(&b, b"content BBBBBBB").unwrap();

        let mut verifier = Verifier::new(1024);
        let outcome = verifier.compare(&record(a, 15), &record(b, 15));
        assert_eq!(outcome, CompareOutcome::NoMatch);
    }

    #[test]
    fn test_read_error_first_and_second() {
        let dir = tempdir().unwrap();
        let real = dir.path().join("real.jpg");
        fs::write(&real, b"xxxx").unwrap();
        let ghost = dir.path().join("ghost.jpg");

        let mut verifier = Verifier::new(1024);
        assert_eq!(
            verifier.compare(&record(ghost.clone(), 4), &record(real.clone(), 4)),
            CompareOutcome::ReadErrorFirst
        );
        assert_eq!(
            verifier.compare(&record(real, 4), &record(ghost, 4)),
            CompareOutcome::ReadErrorSecond
        );
    }

    #[test]
    fn test_shrunk_file_is_read_error() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.jpg");
        let b = dir.path().join("b.jpg");
        fs::write(&a, b"shrunk").unwrap();
        fs::write(&b, b"full length!").unwrap();

        let mut verifier = Verifier::new(1024);
        // Recorded size is larger than what a.jpg actually holds now.
        let outcome = verifier.compare(&record(a, 12), &record(b, 12));
        assert_eq!(outcome, CompareOutcome::ReadErrorFirst);
    }

    #[test]
    fn test_buffer_reuse_no_stale_bytes() {
        // A large identical pair followed by a smaller identical pair that
        // shares its prefix with the large one. Without buffer clearing the
        // small comparison could see the large files' trailing bytes.
        let dir = tempdir().unwrap();
        let big1 = dir.path().join("big1.jpg");
        let big2 = dir.path().join("big2.jpg");
        let small1 = dir.path().join("small1.jpg");
        let small2 = dir.path().join("small2.jpg");
        fs::write(&big1, b"prefix-0123456789").unwrap();
        fs::write(&big2, b"prefix-0123456789").unwrap();
        fs::write(&small1, b"prefix").unwrap();
        fs::write(&small2, b"prefix").unwrap();

        let mut verifier = Verifier::new(1024);
        assert_eq!(
            verifier.compare(&record(big1, 17), &record(big2, 17)),
            CompareOutcome::Match
        );
        assert_eq!(
            verifier.compare(&record(small1, 6), &record(small2, 6)),
            CompareOutcome::Match
        );
    }

    #[test]
    fn test_smaller_file_after_larger_differing_pair() {
        let dir = tempdir().unwrap();
        let big1 = dir.path().join("big1.jpg");
        let big2 = dir.path().join("big2.jpg");
        let small1 = dir.path().join("small1.jpg");
        let small2 = dir.path().join("small2.jpg");
        fs::write(&big1, b"AAAAAAAAAAAAAAAA").unwrap();
        fs::write(&big2, b"BBBBBBBBBBBBBBBB").unwrap();
        fs::write(&small1, b"ccc").unwrap();
        fs::write(&small2, b"ddd").unwrap();

        let mut verifier = Verifier::new(1024);
        assert_eq!(
            verifier.compare(&record(big1, 16), &record(big2, 16)),
            CompareOutcome::NoMatch
        );
        // The differing small pair must not accidentally match or inherit
        // anything from the previous comparison.
        assert_eq!(
            verifier.compare(&record(small1, 3), &record(small2, 3)),
            CompareOutcome::NoMatch
        );
    }

    #[test]
    fn test_oversized_record_is_read_error() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.jpg");
        let b = dir.path().join("b.jpg");
        fs::write(&a, vec![0u8; 64]).unwrap();
        fs::write(&b, vec![0u8; 64]).unwrap();

        let mut verifier = Verifier::new(16);
        let outcome = verifier.compare(&record(a, 64), &record(b, 64));
        assert_eq!(outcome, CompareOutcome::ReadErrorFirst);
    }

    #[test]
    fn test_empty_files_match() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.jpg");
        let b = dir.path().join("b.jpg");
        fs::write(&a, b"").unwrap();
        fs::write(&b, b"").unwrap();

        let mut verifier = Verifier::new(1024);
        assert_eq!(
            verifier.compare(&record(a, 0), &record(b, 0)),
            CompareOutcome::Match
        );
    }
}
