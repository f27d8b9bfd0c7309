//! Flat persisted candidate index.
//!
//! # Overview
//!
//! A line-oriented warm-start cache: one header line, then a repeating
//! three-line group per record: size in bytes, partial-content signature
//! (plain decimal, never scientific notation), path. Read at process start
//! as an optional seed and written at normal exit.
//!
//! The format carries no timestamp and no integrity check, so nothing in it
//! is authoritative: loaded records are revalidated against current file
//! metadata, and a loaded signature is only ever a hint. Every deletion is
//! still preceded by a full byte comparison.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::scanner::MediaRecord;

/// First line of every index file.
const HEADER: &str = "filesize, partial hash, filepath";

/// Write `records` to the index file at `path`, replacing any previous
/// content. Records without a signature are skipped; they carry nothing
/// worth warm-starting.
pub fn save<'a>(path: &Path, records: impl IntoIterator<Item = &'a MediaRecord>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create index directory for {}", path.display()))?;
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create index file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{HEADER}")?;

    let mut written = 0usize;
    for record in records {
        let Some(prehash) = record.prehash else {
            continue;
        };
        writeln!(writer, "{}", record.size)?;
        writeln!(writer, "{prehash}")?;
        writeln!(writer, "{}", record.path.display())?;
        written += 1;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to write index to: {}", path.display()))?;

    log::info!("Wrote {} record(s) to index {}", written, path.display());
    Ok(())
}

/// Load records from the index file at `path`.
///
/// # Errors
///
/// Fails if the file cannot be read or any record group is malformed or
/// truncated. Callers typically log the failure and fall back to a fresh
/// scan rather than aborting.
pub fn load(path: &Path) -> Result<Vec<MediaRecord>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read index file: {}", path.display()))?;

    let mut lines = content.lines().enumerate();

    // Header line carries no data.
    if lines.next().is_none() {
        bail!("Index file is empty: {}", path.display());
    }

    let mut records = Vec::new();
    while let Some((line_no, size_line)) = lines.next() {
        if size_line.is_empty() {
            continue;
        }

        let size: u64 = size_line
            .trim()
            .parse()
            .with_context(|| format!("Invalid size on line {}", line_no + 1))?;

        let (line_no, hash_line) = lines
            .next()
            .with_context(|| format!("Truncated record group at line {}", line_no + 1))?;
        let prehash: u64 = hash_line
            .trim()
            .parse()
            .with_context(|| format!("Invalid signature on line {}", line_no + 1))?;

        let (_, path_line) = lines
            .next()
            .with_context(|| format!("Truncated record group at line {}", line_no + 1))?;

        records.push(MediaRecord::with_prehash(
            PathBuf::from(path_line),
            size,
            prehash,
        ));
    }

    log::info!(
        "Loaded {} record(s) from index {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

/// Revalidate warm-start records against current file metadata.
///
/// Missing files are dropped. A file whose size changed keeps its path with
/// the new size but loses its signature hint (it will be re-signed). Files
/// grown past the ceiling are dropped entirely.
#[must_use]
pub fn revalidate(records: Vec<MediaRecord>, max_file_size: u64) -> Vec<MediaRecord> {
    let loaded = records.len();

    let records: Vec<MediaRecord> = records
        .into_iter()
        .filter_map(|record| {
            let metadata = match fs::metadata(&record.path) {
                Ok(m) if m.is_file() => m,
                _ => {
                    log::debug!("Dropping stale index entry: {}", record.path.display());
                    return None;
                }
            };

            let size = metadata.len();
            if size > max_file_size {
                log::debug!(
                    "Dropping {} (grew past the size ceiling)",
                    record.path.display()
                );
                return None;
            }
            if size != record.size {
                log::debug!(
                    "Discarding signature hint for resized {}",
                    record.path.display()
                );
                return Some(MediaRecord::new(record.path, size));
            }

            Some(record)
        })
        .collect();

    if records.len() != loaded {
        log::info!(
            "Index revalidation kept {} of {} record(s)",
            records.len(),
            loaded
        );
    }

    records
}
