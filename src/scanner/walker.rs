//! Directory walker for media candidate discovery.
//!
//! # Overview
//!
//! Recursively traverses a directory tree and collects a [`MediaRecord`]
//! for every regular file with an admitted media extension whose size does
//! not exceed the configured ceiling. Entries are visited in sorted order so
//! that the resulting record sequence, and everything downstream that
//! depends on insertion order, is stable for a given tree.
//!
//! Unreadable entries are logged and skipped; only a missing or non-directory
//! root fails the walk.

use std::path::Path;

use walkdir::WalkDir;

use super::{MediaRecord, ScanError, ScannerConfig, MEDIA_EXTENSIONS};

/// Check whether a path carries one of the admitted media extensions.
///
/// Matching is case-insensitive, so `IMG_001.JPG` and `img_001.jpg` are
/// treated alike.
#[must_use]
pub fn has_media_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .is_some_and(|ext| MEDIA_EXTENSIONS.contains(&ext.as_str()))
}

/// Recursively collect media candidates under `root`.
///
/// Returns records in sorted traversal order, without signatures. Files
/// larger than the ceiling are excluded here so that later stages can rely
/// on every record fitting inside the comparison buffers.
///
/// # Errors
///
/// Returns [`ScanError::NotFound`] or [`ScanError::NotADirectory`] if the
/// root itself is unusable. Per-entry read failures are logged at warn level
/// and skipped.
pub fn collect_media_files(
    root: &Path,
    config: &ScannerConfig,
) -> Result<Vec<MediaRecord>, ScanError> {
    if !root.exists() {
        return Err(ScanError::NotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let mut records = Vec::new();
    let mut seen = 0usize;
    let mut oversized = 0usize;

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        seen += 1;

        if !has_media_extension(entry.path()) {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                log::warn!("Skipping {}: {}", entry.path().display(), e);
                continue;
            }
        };

        let size = metadata.len();
        if size > config.max_file_size {
            log::debug!(
                "Skipping {} ({} bytes over the {} byte ceiling)",
                entry.path().display(),
                size,
                config.max_file_size
            );
            oversized += 1;
            continue;
        }

        records.push(MediaRecord::new(entry.path().to_path_buf(), size));
    }

    log::info!(
        "Scanned {} file(s) under {}: {} media candidate(s), {} over the size ceiling",
        seen,
        root.display(),
        records.len(),
        oversized
    );

    Ok(records)
}
