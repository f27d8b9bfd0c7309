//! Command-line interface definitions for MediaDupe.
//!
//! This module defines all CLI arguments, subcommands, and options using the
//! clap derive API, with global options (verbosity) and one subcommand per
//! operation.
//!
//! # Example
//!
//! ```bash
//! # Scan a media tree and populate the warm-start index
//! mediadupe scan ~/Pictures
//!
//! # Remove duplicates everywhere, keeping the first-scanned copy
//! mediadupe dedupe ~/Pictures
//!
//! # Consolidate: keep the copies in one subdirectory, delete the rest
//! mediadupe consolidate ~/Pictures ~/Pictures/vacation-2019
//!
//! # Verbose mode with a custom ceiling and worker count
//! mediadupe -v dedupe ~/Pictures --max-size 50MB --workers 8
//! ```

use bytesize::ByteSize;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Duplicate media file remover.
///
/// MediaDupe finds byte-identical media files (jpg/jpeg/png/gif/webm) by
/// size and prefix signature, confirms them with a full byte comparison,
/// and deletes the redundant copies.
#[derive(Debug, Parser)]
#[command(name = "mediadupe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for MediaDupe.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a media tree and populate the warm-start index
    Scan(ScanArgs),
    /// Delete every duplicate in the tree, keeping the first-scanned copy
    Dedupe(DedupeArgs),
    /// Delete duplicates of files living in a chosen subdirectory,
    /// preserving the subdirectory's copies
    Consolidate(ConsolidateArgs),
}

/// Options shared by every engine invocation.
#[derive(Debug, Args)]
pub struct EngineOpts {
    /// Number of parallel workers (default from config, normally 4)
    #[arg(short = 'w', long, value_name = "N")]
    pub workers: Option<usize>,

    /// Maximum file size to consider (e.g. 512KB, 75MB)
    ///
    /// Files above this ceiling are never scanned or compared. The ceiling
    /// also sizes the per-worker comparison buffers.
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub max_size: Option<u64>,

    /// Path to the persisted index file
    ///
    /// If not specified, a default platform-specific path is used.
    #[arg(long, value_name = "PATH")]
    pub index: Option<PathBuf>,

    /// Disable reading and writing the persisted index
    #[arg(long, conflicts_with = "index")]
    pub no_index: bool,
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Root directory to scan for media candidates
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    #[command(flatten)]
    pub engine: EngineOpts,
}

/// Arguments for the dedupe subcommand.
#[derive(Debug, Args)]
pub struct DedupeArgs {
    /// Root directory to deduplicate
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    #[command(flatten)]
    pub engine: EngineOpts,
}

/// Arguments for the consolidate subcommand.
#[derive(Debug, Args)]
pub struct ConsolidateArgs {
    /// Root directory holding the full media tree
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// Subdirectory whose copies are preserved; duplicates of its files
    /// elsewhere in the tree are deleted
    #[arg(value_name = "SUBDIR")]
    pub subdir: PathBuf,

    #[command(flatten)]
    pub engine: EngineOpts,
}

/// Parse a human-readable size argument like `512KB` or `75MB`.
fn parse_size(s: &str) -> Result<u64, String> {
    s.parse::<ByteSize>()
        .map(|b| b.as_u64())
        .map_err(|e| format!("invalid size '{s}': {e}"))
}
