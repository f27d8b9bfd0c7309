//! Scanner module for media file discovery and partial-content signatures.
//!
//! This module provides functionality for:
//! - Recursive directory traversal with media-extension and size filtering
//! - Partial-content signature computation (XxHash64 over a file prefix)
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and candidate discovery
//! - [`prehash`]: Prefix signature hashing
//!
//! # Example
//!
//! ```no_run
//! use mediadupe::scanner::{collect_media_files, ScannerConfig};
//! use std::path::Path;
//!
//! let config = ScannerConfig::default();
//! let records = collect_media_files(Path::new("/media/photos"), &config).unwrap();
//! for record in &records {
//!     println!("{}: {} bytes", record.path.display(), record.size);
//! }
//! ```

pub mod prehash;
pub mod walker;

use std::path::PathBuf;

// Re-export main types
pub use prehash::{Prehasher, PREHASH_SIZE};
pub use walker::collect_media_files;

/// File extensions admitted by the scanner, lowercase.
///
/// Extension matching is case-insensitive: `photo.JPG` is admitted.
pub const MEDIA_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webm"];

/// A candidate media file.
///
/// Created at scan time with path and size; the partial-content signature is
/// attached once by the signature stage and the record is never mutated
/// afterward, except by removal when the file is deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRecord {
    /// Path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Signature over the first [`PREHASH_SIZE`] bytes of content.
    /// `None` means the file could not be read at signature time; such
    /// records never match anything and are excluded from bucketing.
    pub prehash: Option<u64>,
}

impl MediaRecord {
    /// Create a new record with no signature yet.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self {
            path,
            size,
            prehash: None,
        }
    }

    /// Create a record carrying a signature, e.g. a warm-start hint
    /// loaded from the persisted index.
    #[must_use]
    pub fn with_prehash(path: PathBuf, size: u64, prehash: u64) -> Self {
        Self {
            path,
            size,
            prehash: Some(prehash),
        }
    }
}

/// Configuration for candidate collection.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Maximum file size eligible for scanning and comparison, in bytes.
    /// Files above this ceiling never enter the engine.
    pub max_file_size: u64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            max_file_size: crate::config::DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl ScannerConfig {
    /// Create a configuration with a custom size ceiling.
    #[must_use]
    pub fn with_max_file_size(max_file_size: u64) -> Self {
        Self { max_file_size }
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while computing a signature.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    pub(crate) fn from_io(path: &std::path::Path, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_record_new() {
        let record = MediaRecord::new(PathBuf::from("/test/a.jpg"), 1024);

        assert_eq!(record.path, PathBuf::from("/test/a.jpg"));
        assert_eq!(record.size, 1024);
        assert!(record.prehash.is_none());
    }

    #[test]
    fn test_media_record_with_prehash() {
        let record = MediaRecord::with_prehash(PathBuf::from("/test/a.jpg"), 1024, 42);
        assert_eq!(record.prehash, Some(42));
    }

    #[test]
    fn test_scanner_config_default_ceiling() {
        let config = ScannerConfig::default();
        assert_eq!(config.max_file_size, 75_000_000);
    }

    #[test]
    fn test_scan_error_display() {
        let err = ScanError::NotFound(PathBuf::from("/missing"));
        assert_eq!(err.to_string(), "Path not found: /missing");

        let err = ScanError::NotADirectory(PathBuf::from("/file.txt"));
        assert_eq!(err.to_string(), "Not a directory: /file.txt");
    }

    #[test]
    fn test_hash_error_display() {
        let err = HashError::NotFound(PathBuf::from("/test"));
        assert_eq!(err.to_string(), "File not found: /test");

        let err = HashError::PermissionDenied(PathBuf::from("/secret"));
        assert_eq!(err.to_string(), "Permission denied: /secret");
    }

    #[test]
    fn test_hash_error_from_io_kind_mapping() {
        let path = PathBuf::from("/x");
        let err = HashError::from_io(
            &path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, HashError::NotFound(_)));

        let err = HashError::from_io(
            &path,
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "no"),
        );
        assert!(matches!(err, HashError::PermissionDenied(_)));

        let err = HashError::from_io(
            &path,
            std::io::Error::new(std::io::ErrorKind::Other, "weird"),
        );
        assert!(matches!(err, HashError::Io { .. }));
    }
}
