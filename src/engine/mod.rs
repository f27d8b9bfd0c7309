//! Duplicate detection and deletion engine.
//!
//! This module implements the multi-stage filtering and deletion pipeline:
//! 1. **Size bucketing**: group candidates by exact size, drop singletons
//! 2. **Signature refinement**: split size groups by prefix signature
//! 3. **Partitioning**: assign whole buckets round-robin to workers
//! 4. **Verification + deletion**: full byte comparison, then policy-driven
//!    removal of confirmed duplicates
//!
//! Buckets and partitions are rebuilt fresh for every run; the only state
//! that survives a run is the optional persisted index (see [`crate::index`]).

pub mod buckets;
pub mod delete;
pub mod executor;
pub mod partition;
pub mod verify;

pub use buckets::{build_buckets, BuildStats, SignatureBucket, SizeGroup};
pub use executor::{consolidate_into, dedupe_tree, KeeperSet, RunResult};
pub use partition::{partition_buckets, Partition};
pub use verify::{CompareOutcome, Verifier};
