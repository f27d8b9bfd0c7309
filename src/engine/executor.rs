//! Deletion executor: worker pool, survivor policies, run aggregation.
//!
//! # Overview
//!
//! A deletion run launches one thread per non-empty partition (at most the
//! configured worker count, since that is how many partitions exist) and
//! joins them all before returning. Each worker owns its partition and its
//! [`Verifier`] buffers outright; the only shared resource is the
//! [`StorageGate`] serializing the delete syscall. Worker completion order
//! has no effect on the result.
//!
//! Two survivor policies are provided:
//!
//! - [`dedupe_tree`]: within every bucket, the earliest-inserted member of
//!   each byte-identical cluster survives and every later duplicate is
//!   deleted.
//! - [`consolidate_into`]: records duplicating a *keeper* (a file in a
//!   chosen subdirectory) are deleted wherever else they live; keepers are
//!   never deleted.
//!
//! Workers never mutate their buckets while scanning them: deletions are
//! tracked in a mask and the retained set is built by one explicit filtering
//! pass at the end of each bucket.

use std::collections::HashMap;
use std::thread;

use super::buckets::SignatureBucket;
use super::delete::StorageGate;
use super::partition::Partition;
use super::verify::{CompareOutcome, Verifier};
use crate::scanner::MediaRecord;

/// Aggregate result of a deletion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunResult {
    /// Files removed from storage.
    pub deleted: usize,
    /// Non-fatal failures: skipped pairs and refused deletions.
    pub errors: usize,
    /// Total size of the deleted files, in bytes.
    pub bytes_freed: u64,
}

impl RunResult {
    /// Fold another worker's counts into this result.
    pub fn merge(&mut self, other: &RunResult) {
        self.deleted += other.deleted;
        self.errors += other.errors;
        self.bytes_freed += other.bytes_freed;
    }

    /// True when the run finished without a single failure.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors == 0
    }
}

/// The protected record set for the consolidate policy, keyed by
/// (size, signature).
///
/// Built from a separately scanned subdirectory. Records without a
/// signature are excluded: an unreadable keeper can protect nothing.
#[derive(Debug, Default)]
pub struct KeeperSet {
    by_signature: HashMap<(u64, u64), Vec<MediaRecord>>,
    len: usize,
}

impl KeeperSet {
    /// Build a keeper set from signed records.
    #[must_use]
    pub fn from_records(records: Vec<MediaRecord>) -> Self {
        let mut by_signature: HashMap<(u64, u64), Vec<MediaRecord>> = HashMap::new();
        let mut len = 0usize;

        for record in records {
            let Some(prehash) = record.prehash else {
                log::warn!(
                    "Keeper {} has no signature and protects nothing",
                    record.path.display()
                );
                continue;
            };
            by_signature
                .entry((record.size, prehash))
                .or_default()
                .push(record);
            len += 1;
        }

        Self { by_signature, len }
    }

    /// Number of keeper records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn matching(&self, size: u64, prehash: u64) -> Option<&[MediaRecord]> {
        self.by_signature
            .get(&(size, prehash))
            .map(Vec::as_slice)
    }
}

/// Run the full-directory policy over the given partitions.
///
/// Within each bucket every record is compared against every later record in
/// insertion order; confirmed duplicates are deleted so that exactly the
/// earliest-inserted member of each byte-identical cluster survives.
///
/// Returns the retained working set (for index persistence) and the merged
/// per-worker counts.
#[must_use]
pub fn dedupe_tree(
    partitions: Vec<Partition>,
    max_compare_size: u64,
) -> (Vec<SignatureBucket>, RunResult) {
    run_workers(partitions, max_compare_size, dedupe_partition)
}

/// Run the subdirectory-preserving policy over the given partitions.
///
/// Every root record duplicating a keeper is deleted; keepers themselves are
/// never deleted, so the canonical copies end up consolidated in the chosen
/// subdirectory.
#[must_use]
pub fn consolidate_into(
    partitions: Vec<Partition>,
    keepers: &KeeperSet,
    max_compare_size: u64,
) -> (Vec<SignatureBucket>, RunResult) {
    run_workers(partitions, max_compare_size, |partition, verifier, gate| {
        consolidate_partition(partition, keepers, verifier, gate)
    })
}

/// Launch one worker per non-empty partition, join them all, and merge
/// their outputs.
///
/// The pool exists only for the duration of the run. Each worker builds its
/// own [`Verifier`]; the [`StorageGate`] is the single shared resource.
fn run_workers<F>(
    partitions: Vec<Partition>,
    max_compare_size: u64,
    work: F,
) -> (Vec<SignatureBucket>, RunResult)
where
    F: Fn(Partition, &mut Verifier, &StorageGate) -> (Vec<SignatureBucket>, RunResult) + Sync,
{
    let gate = StorageGate::new();
    let mut retained = Vec::new();
    let mut result = RunResult::default();

    thread::scope(|scope| {
        let mut handles = Vec::new();
        for partition in partitions {
            if partition.is_empty() {
                continue;
            }
            let work = &work;
            let gate = &gate;
            handles.push(scope.spawn(move || {
                let mut verifier = Verifier::new(max_compare_size);
                work(partition, &mut verifier, gate)
            }));
        }

        for handle in handles {
            let (buckets, worker_result) = handle.join().expect("worker thread panicked");
            retained.extend(buckets);
            result.merge(&worker_result);
        }
    });

    log::info!(
        "Deletion run complete: {} deleted, {} error(s)",
        result.deleted,
        result.errors
    );

    (retained, result)
}

/// Full-directory policy over one worker's partition.
fn dedupe_partition(
    partition: Partition,
    verifier: &mut Verifier,
    gate: &StorageGate,
) -> (Vec<SignatureBucket>, RunResult) {
    let mut result = RunResult::default();
    let mut retained = Vec::with_capacity(partition.len());

    for mut bucket in partition {
        let mut deleted = vec![false; bucket.records.len()];

        for i in 0..bucket.records.len() {
            if deleted[i] {
                continue;
            }
            for j in (i + 1)..bucket.records.len() {
                if deleted[j] {
                    continue;
                }
                match verifier.compare(&bucket.records[i], &bucket.records[j]) {
                    CompareOutcome::Match => {
                        let loser = &bucket.records[j];
                        match gate.remove(&loser.path) {
                            Ok(()) => {
                                deleted[j] = true;
                                result.deleted += 1;
                                result.bytes_freed += loser.size;
                            }
                            Err(e) => {
                                // Retained in the working set, never counted
                                // as deleted.
                                log::warn!("Delete failed, keeping record: {}", e);
                                result.errors += 1;
                            }
                        }
                    }
                    CompareOutcome::NoMatch => {}
                    CompareOutcome::ReadErrorFirst => {
                        log::warn!(
                            "Skipping unreadable candidate {}",
                            bucket.records[i].path.display()
                        );
                        result.errors += 1;
                        break;
                    }
                    CompareOutcome::ReadErrorSecond => {
                        log::warn!(
                            "Skipping pair with unreadable {}",
                            bucket.records[j].path.display()
                        );
                        result.errors += 1;
                    }
                }
            }
        }

        retain_surviving(&mut bucket, &deleted);
        retained.push(bucket);
    }

    (retained, result)
}

/// Subdirectory-preserving policy over one worker's partition.
fn consolidate_partition(
    partition: Partition,
    keepers: &KeeperSet,
    verifier: &mut Verifier,
    gate: &StorageGate,
) -> (Vec<SignatureBucket>, RunResult) {
    let mut result = RunResult::default();
    let mut retained = Vec::with_capacity(partition.len());

    for mut bucket in partition {
        let Some(matching_keepers) = keepers.matching(bucket.size, bucket.prehash) else {
            retained.push(bucket);
            continue;
        };

        let mut deleted = vec![false; bucket.records.len()];

        for keeper in matching_keepers {
            for j in 0..bucket.records.len() {
                if deleted[j] || bucket.records[j].path == keeper.path {
                    continue;
                }
                match verifier.compare(keeper, &bucket.records[j]) {
                    CompareOutcome::Match => {
                        let loser = &bucket.records[j];
                        match gate.remove(&loser.path) {
                            Ok(()) => {
                                deleted[j] = true;
                                result.deleted += 1;
                                result.bytes_freed += loser.size;
                            }
                            Err(e) => {
                                log::warn!("Delete failed, keeping record: {}", e);
                                result.errors += 1;
                            }
                        }
                    }
                    CompareOutcome::NoMatch => {}
                    CompareOutcome::ReadErrorFirst => {
                        log::warn!("Skipping unreadable keeper {}", keeper.path.display());
                        result.errors += 1;
                        break;
                    }
                    CompareOutcome::ReadErrorSecond => {
                        log::warn!(
                            "Skipping pair with unreadable {}",
                            bucket.records[j].path.display()
                        );
                        result.errors += 1;
                    }
                }
            }
        }

        retain_surviving(&mut bucket, &deleted);
        retained.push(bucket);
    }

    (retained, result)
}

/// Rebuild the bucket's record list from the deletion mask in one pass.
fn retain_surviving(bucket: &mut SignatureBucket, deleted: &[bool]) {
    if deleted.iter().any(|&d| d) {
        let mut index = 0;
        bucket.records.retain(|_| {
            let keep = !deleted[index];
            index += 1;
            keep
        });
    }
}
