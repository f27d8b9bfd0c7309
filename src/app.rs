//! Application glue: command dispatch, warm start, and run summaries.
//!
//! The engine itself is stateless between invocations; this module wires a
//! CLI command to one pipeline run (scan, dedupe with the full-directory
//! policy, or consolidate with the subdirectory-preserving policy), handles
//! the optional warm-start index on the way in, and persists the retained
//! working set on the way out.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use bytesize::ByteSize;

use crate::cli::{Cli, Commands, ConsolidateArgs, DedupeArgs, EngineOpts, ScanArgs};
use crate::config::Config;
use crate::engine::buckets::compute_signatures;
use crate::engine::{
    build_buckets, consolidate_into, dedupe_tree, partition_buckets, KeeperSet, RunResult,
    SignatureBucket,
};
use crate::error::ExitCode;
use crate::index;
use crate::scanner::{collect_media_files, MediaRecord, ScannerConfig};

/// Execute the parsed command line.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Scan(args) => run_scan(args),
        Commands::Dedupe(args) => run_dedupe(args),
        Commands::Consolidate(args) => run_consolidate(args),
    }
}

/// Per-invocation settings: persisted config overridden by CLI flags.
struct Runtime {
    config: Config,
    index_path: Option<PathBuf>,
}

impl Runtime {
    fn resolve(opts: &EngineOpts) -> Result<Self> {
        let mut config = Config::load();

        if let Some(workers) = opts.workers {
            config.worker_count = workers.max(1);
        }
        if let Some(max_size) = opts.max_size {
            config.max_file_size = max_size;
        }

        let index_path = if opts.no_index {
            None
        } else {
            let path = match &opts.index {
                Some(path) => path.clone(),
                None => config.resolve_index_path()?,
            };
            Some(path)
        };

        Ok(Self { config, index_path })
    }

    fn scanner_config(&self) -> ScannerConfig {
        ScannerConfig::with_max_file_size(self.config.max_file_size)
    }

    /// Load the warm-start index if one is available, otherwise scan fresh.
    ///
    /// Loaded records are revalidated against current metadata; their
    /// signature hints are kept, but nothing loaded here is trusted for
    /// deletion; full byte comparison always runs first.
    fn load_or_scan(&self, root: &Path) -> Result<Vec<MediaRecord>> {
        if let Some(path) = &self.index_path {
            if path.exists() {
                match index::load(path) {
                    Ok(records) => {
                        let records = index::revalidate(records, self.config.max_file_size);
                        if !records.is_empty() {
                            log::info!(
                                "Warm start: {} record(s) from {} (run `scan` to refresh)",
                                records.len(),
                                path.display()
                            );
                            return Ok(records);
                        }
                        log::info!("Index had no usable records, scanning {}", root.display());
                    }
                    Err(e) => {
                        log::warn!("Ignoring unreadable index {}: {:#}", path.display(), e);
                    }
                }
            }
        }

        let records = collect_media_files(root, &self.scanner_config())
            .with_context(|| format!("Failed to scan {}", root.display()))?;
        Ok(records)
    }

    /// Persist the retained working set at normal exit.
    fn persist(&self, retained: &[SignatureBucket]) {
        let Some(path) = &self.index_path else {
            return;
        };
        let records = retained.iter().flat_map(|b| b.records.iter());
        if let Err(e) = index::save(path, records) {
            log::warn!("Failed to write index {}: {:#}", path.display(), e);
        }
    }
}

fn run_scan(args: ScanArgs) -> Result<ExitCode> {
    let runtime = Runtime::resolve(&args.engine)?;
    let started = Instant::now();

    let records = collect_media_files(&args.root, &runtime.scanner_config())
        .with_context(|| format!("Failed to scan {}", args.root.display()))?;
    let scanned = records.len();

    let (buckets, stats) = build_buckets(records, runtime.config.worker_count);
    runtime.persist(&buckets);

    println!(
        "Scanned {} media file(s) in {:.2?}: {} potential duplicate(s) across {} bucket(s)",
        scanned,
        started.elapsed(),
        stats.grouping.potential_duplicates,
        stats.candidate_buckets
    );

    if stats.candidate_buckets == 0 {
        Ok(ExitCode::NoDuplicates)
    } else {
        Ok(ExitCode::Success)
    }
}

fn run_dedupe(args: DedupeArgs) -> Result<ExitCode> {
    let runtime = Runtime::resolve(&args.engine)?;
    let started = Instant::now();

    let records = runtime.load_or_scan(&args.root)?;
    let (buckets, _) = build_buckets(records, runtime.config.worker_count);
    let partitions = partition_buckets(buckets, runtime.config.worker_count);

    let (retained, result) = dedupe_tree(partitions, runtime.config.max_file_size);
    runtime.persist(&retained);

    print_run_summary("Dedupe", &result, started);
    Ok(ExitCode::from_run_result(&result))
}

fn run_consolidate(args: ConsolidateArgs) -> Result<ExitCode> {
    let runtime = Runtime::resolve(&args.engine)?;
    let started = Instant::now();

    // The keeper set is always scanned fresh: it must reflect the
    // subdirectory as it is now, not as the index remembers it.
    let sub_records = collect_media_files(&args.subdir, &runtime.scanner_config())
        .with_context(|| format!("Failed to scan {}", args.subdir.display()))?;
    let (sub_records, _) = compute_signatures(sub_records, runtime.config.worker_count);
    let keepers = KeeperSet::from_records(sub_records);
    log::info!(
        "Protecting {} file(s) under {}",
        keepers.len(),
        args.subdir.display()
    );

    let records = runtime.load_or_scan(&args.root)?;
    let (buckets, _) = build_buckets(records, runtime.config.worker_count);
    let partitions = partition_buckets(buckets, runtime.config.worker_count);

    let (retained, result) = consolidate_into(partitions, &keepers, runtime.config.max_file_size);
    runtime.persist(&retained);

    print_run_summary("Consolidate", &result, started);
    Ok(ExitCode::from_run_result(&result))
}

fn print_run_summary(action: &str, result: &RunResult, started: Instant) {
    if result.errors == 0 {
        println!(
            "{action} complete: {} duplicate file(s) removed ({}) in {:.2?}",
            result.deleted,
            ByteSize::b(result.bytes_freed),
            started.elapsed()
        );
    } else {
        println!(
            "{action} complete: {} duplicate file(s) removed ({}), {} error(s), in {:.2?}",
            result.deleted,
            ByteSize::b(result.bytes_freed),
            result.errors,
            started.elapsed()
        );
    }
}
