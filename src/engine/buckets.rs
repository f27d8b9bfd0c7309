//! Size grouping and signature bucketing.
//!
//! # Overview
//!
//! The first two filtering stages of the engine. Size grouping eliminates
//! every file whose size is unique, since such files cannot have a
//! byte-identical twin. Signature bucketing then refines each surviving size group by the
//! prefix signature, so the expensive full comparison only ever runs inside
//! a (size, signature) bucket.
//!
//! Insertion order is preserved through both stages: the full-directory
//! deletion policy keeps the earliest-inserted member of each duplicate
//! cluster, so record order is significant, not incidental.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use rayon::prelude::*;

use crate::scanner::{MediaRecord, Prehasher};

/// A group of records sharing an exact size, in insertion order.
#[derive(Debug, Clone)]
pub struct SizeGroup {
    /// File size in bytes (shared by all records in this group)
    pub size: u64,
    /// Records with this exact size
    pub records: Vec<MediaRecord>,
}

impl SizeGroup {
    /// Number of records in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A group of records sharing both size and prefix signature, in insertion
/// order.
///
/// Invariant: every member has `prehash == Some(self.prehash)` and
/// `size == self.size`. Records whose signature could not be computed never
/// enter a bucket.
#[derive(Debug, Clone)]
pub struct SignatureBucket {
    /// File size in bytes
    pub size: u64,
    /// Shared prefix signature
    pub prehash: u64,
    /// Member records
    pub records: Vec<MediaRecord>,
}

impl SignatureBucket {
    /// Number of records in this bucket.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if this bucket is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Statistics from the size grouping stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of records processed
    pub total_files: usize,
    /// Number of distinct sizes seen
    pub unique_sizes: usize,
    /// Records eliminated because their size was unique
    pub eliminated_unique: usize,
    /// Records that could still be duplicates (in groups of 2+)
    pub potential_duplicates: usize,
    /// Number of size groups with 2+ records
    pub duplicate_groups: usize,
}

/// Statistics from the signature stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureStats {
    /// Records entering the stage
    pub total: usize,
    /// Signatures computed this run
    pub hashed: usize,
    /// Warm-start hints kept without re-reading the file
    pub reused_hints: usize,
    /// Records that could not be read; excluded from bucketing
    pub unreadable: usize,
}

/// Combined statistics for the bucket-building pipeline.
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    /// Size grouping stage
    pub grouping: GroupingStats,
    /// Signature stage
    pub signatures: SignatureStats,
    /// Buckets produced
    pub buckets: usize,
    /// Buckets holding 2+ records (actual duplicate candidates)
    pub candidate_buckets: usize,
}

/// Group records by exact size, preserving insertion order.
///
/// Only groups with 2 or more members are returned; a unique size cannot
/// contain duplicates. Empty input yields empty output.
#[must_use]
pub fn group_by_size(records: Vec<MediaRecord>) -> (Vec<SizeGroup>, GroupingStats) {
    let mut index: HashMap<u64, usize> = HashMap::new();
    let mut groups: Vec<SizeGroup> = Vec::new();
    let mut stats = GroupingStats::default();

    for record in records {
        stats.total_files += 1;
        match index.entry(record.size) {
            Entry::Occupied(slot) => groups[*slot.get()].records.push(record),
            Entry::Vacant(slot) => {
                slot.insert(groups.len());
                groups.push(SizeGroup {
                    size: record.size,
                    records: vec![record],
                });
            }
        }
    }

    stats.unique_sizes = groups.len();

    let groups: Vec<SizeGroup> = groups
        .into_iter()
        .filter(|group| {
            if group.records.len() < 2 {
                stats.eliminated_unique += 1;
                false
            } else {
                stats.potential_duplicates += group.records.len();
                stats.duplicate_groups += 1;
                true
            }
        })
        .collect();

    log::info!(
        "Size grouping: {} file(s) -> {} candidate(s) in {} group(s), {} unique size(s) eliminated",
        stats.total_files,
        stats.potential_duplicates,
        stats.duplicate_groups,
        stats.eliminated_unique
    );

    (groups, stats)
}

/// Attach a prefix signature to every record that does not already carry one.
///
/// Hashing fans out over a bounded rayon pool (`io_threads` threads, min 1)
/// with one [`Prehasher`] buffer per pool thread. Output order matches input
/// order. Records whose file cannot be read keep `prehash = None` and are
/// counted as unreadable; each record is hashed at most once per run.
#[must_use]
pub fn compute_signatures(
    records: Vec<MediaRecord>,
    io_threads: usize,
) -> (Vec<MediaRecord>, SignatureStats) {
    let mut stats = SignatureStats {
        total: records.len(),
        reused_hints: records.iter().filter(|r| r.prehash.is_some()).count(),
        ..SignatureStats::default()
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(io_threads.max(1))
        .build()
        .unwrap_or_else(|_| rayon::ThreadPoolBuilder::new().build().unwrap());

    let signed: Vec<MediaRecord> = pool.install(|| {
        records
            .into_par_iter()
            .map_init(Prehasher::new, |hasher, mut record| {
                if record.prehash.is_none() {
                    match hasher.prehash(&record.path) {
                        Ok(hash) => record.prehash = Some(hash),
                        Err(e) => {
                            log::warn!("Signature failed for {}: {}", record.path.display(), e);
                        }
                    }
                }
                record
            })
            .collect()
    });

    stats.unreadable = signed.iter().filter(|r| r.prehash.is_none()).count();
    stats.hashed = stats.total - stats.reused_hints - stats.unreadable;

    log::debug!(
        "Signatures: {} hashed, {} reused, {} unreadable of {}",
        stats.hashed,
        stats.reused_hints,
        stats.unreadable,
        stats.total
    );

    (signed, stats)
}

/// Bucket records by (size, signature), preserving first-seen bucket order
/// and insertion order within each bucket.
///
/// Records without a signature are excluded: two unreadable files must never
/// be treated as duplicates of each other.
#[must_use]
pub fn bucket_by_signature(records: Vec<MediaRecord>) -> Vec<SignatureBucket> {
    let mut index: HashMap<(u64, u64), usize> = HashMap::new();
    let mut buckets: Vec<SignatureBucket> = Vec::new();

    for record in records {
        let Some(prehash) = record.prehash else {
            log::debug!(
                "Excluding {} from bucketing (no signature)",
                record.path.display()
            );
            continue;
        };

        match index.entry((record.size, prehash)) {
            Entry::Occupied(slot) => buckets[*slot.get()].records.push(record),
            Entry::Vacant(slot) => {
                slot.insert(buckets.len());
                buckets.push(SignatureBucket {
                    size: record.size,
                    prehash,
                    records: vec![record],
                });
            }
        }
    }

    buckets
}

/// Run the full bucket-building pipeline: size grouping, signatures,
/// signature bucketing.
#[must_use]
pub fn build_buckets(
    records: Vec<MediaRecord>,
    io_threads: usize,
) -> (Vec<SignatureBucket>, BuildStats) {
    let (groups, grouping) = group_by_size(records);

    let survivors: Vec<MediaRecord> = groups.into_iter().flat_map(|g| g.records).collect();
    let (signed, signatures) = compute_signatures(survivors, io_threads);

    let buckets = bucket_by_signature(signed);

    let stats = BuildStats {
        grouping,
        signatures,
        buckets: buckets.len(),
        candidate_buckets: buckets.iter().filter(|b| b.len() >= 2).count(),
    };

    (buckets, stats)
}
