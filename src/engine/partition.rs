//! Round-robin bucket partitioning for the worker pool.
//!
//! Whole buckets are dealt out to workers like cards: bucket *i* goes to
//! partition *i mod W*. Because a bucket is never split, no two workers can
//! ever touch the same record, and the deletion executor needs no locking on
//! record or bucket state; only the storage delete call itself is shared.

use super::buckets::SignatureBucket;

/// An ordered collection of whole buckets owned by exactly one worker.
pub type Partition = Vec<SignatureBucket>;

/// Split buckets round-robin into `worker_count` disjoint partitions.
///
/// A `worker_count` of 0 is clamped to 1. The union of the returned
/// partitions is exactly the input bucket set; partitions may be empty when
/// there are fewer buckets than workers.
#[must_use]
pub fn partition_buckets(buckets: Vec<SignatureBucket>, worker_count: usize) -> Vec<Partition> {
    let worker_count = worker_count.max(1);
    let mut partitions: Vec<Partition> = (0..worker_count).map(|_| Vec::new()).collect();

    for (i, bucket) in buckets.into_iter().enumerate() {
        partitions[i % worker_count].push(bucket);
    }

    partitions
}
