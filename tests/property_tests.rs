use proptest::prelude::*;
use std::path::PathBuf;

use mediadupe::engine::buckets::{bucket_by_signature, group_by_size};
use mediadupe::engine::{partition_buckets, SignatureBucket};
use mediadupe::scanner::MediaRecord;

fn bucket(id: u64, members: usize) -> SignatureBucket {
    SignatureBucket {
        size: id,
        prehash: id,
        records: (0..members)
            .map(|i| MediaRecord::with_prehash(PathBuf::from(format!("/b{id}/f{i}.jpg")), id, id))
            .collect(),
    }
}

proptest! {
    #[test]
    fn test_partition_union_and_disjointness(
        bucket_count in 0usize..64,
        workers in 0usize..9,
    ) {
        let buckets: Vec<SignatureBucket> =
            (0..bucket_count as u64).map(|id| bucket(id, 2)).collect();

        let partitions = partition_buckets(buckets, workers);

        // Worker count of 0 is clamped to 1.
        prop_assert_eq!(partitions.len(), workers.max(1));

        // Every input bucket appears in exactly one partition.
        let mut seen: Vec<u64> = partitions
            .iter()
            .flat_map(|p| p.iter().map(|b| b.size))
            .collect();
        seen.sort_unstable();
        let expected: Vec<u64> = (0..bucket_count as u64).collect();
        prop_assert_eq!(seen, expected);
    }

    #[test]
    fn test_partition_round_robin_placement(
        bucket_count in 1usize..64,
        workers in 1usize..9,
    ) {
        let buckets: Vec<SignatureBucket> =
            (0..bucket_count as u64).map(|id| bucket(id, 1)).collect();

        let partitions = partition_buckets(buckets, workers);

        for (w, partition) in partitions.iter().enumerate() {
            for b in partition {
                prop_assert_eq!(b.size as usize % workers, w);
            }
        }
    }

    #[test]
    fn test_group_by_size_invariants(sizes in prop::collection::vec(0u64..50, 0..80)) {
        let records: Vec<MediaRecord> = sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| MediaRecord::new(PathBuf::from(format!("/f{i}.jpg")), size))
            .collect();

        let (groups, stats) = group_by_size(records.clone());

        // Invariant: every group is homogeneous and has at least 2 members.
        for group in &groups {
            prop_assert!(group.records.len() >= 2);
            for record in &group.records {
                prop_assert_eq!(record.size, group.size);
            }
        }

        // Invariant: candidates + eliminated = total.
        let grouped: usize = groups.iter().map(|g| g.records.len()).sum();
        prop_assert_eq!(grouped, stats.potential_duplicates);
        prop_assert_eq!(stats.total_files, records.len());
        prop_assert_eq!(
            stats.potential_duplicates + stats.eliminated_unique,
            records.len()
        );
    }

    #[test]
    fn test_bucketing_is_a_partition_of_signed_records(
        keys in prop::collection::vec((1u64..8, 1u64..8), 0..60),
    ) {
        let records: Vec<MediaRecord> = keys
            .iter()
            .enumerate()
            .map(|(i, &(size, hash))| {
                MediaRecord::with_prehash(PathBuf::from(format!("/f{i}.jpg")), size, hash)
            })
            .collect();

        let buckets = bucket_by_signature(records.clone());

        // Invariant: buckets are homogeneous in (size, hash).
        for b in &buckets {
            for r in &b.records {
                prop_assert_eq!(r.size, b.size);
                prop_assert_eq!(r.prehash, Some(b.prehash));
            }
        }

        // Invariant: every signed record lands in exactly one bucket.
        let bucketed: usize = buckets.iter().map(|b| b.records.len()).sum();
        prop_assert_eq!(bucketed, records.len());

        // Invariant: bucket keys are unique.
        let mut seen = std::collections::HashSet::new();
        for b in &buckets {
            prop_assert!(seen.insert((b.size, b.prehash)));
        }
    }
}
