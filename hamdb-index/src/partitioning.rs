// SPDX-License-Identifier: AGPL-3.0-or-later
// HamDB - Hamming-Distance Search Database
// Copyright (C) 2026 Sushanth Reddy Vanagala (https://github.com/sushanthpy)

//! # Partitioning — Geometry, Fan-Out, Admission, Verification
//!
//! The top-level index. Construction derives the partition geometry from
//! `(bits, tolerance)`; the partition list is immutable afterwards, so the
//! only mutable state anywhere is inside the bucket stores.
//!
//! ## Geometry
//!
//! `P = max(1, min(bits, tolerance))` partitions cover `[0, bits)` with
//! contiguous, non-overlapping windows whose widths differ by at most one
//! (`bits mod P` leading partitions get the wider width). At least
//! `tolerance` partitions is what makes the admission rule sound: spread
//! `tolerance` differing bits over `P ≥ tolerance` windows and enough
//! windows stay within distance one of the query to be seen.
//!
//! ## Candidate admission
//!
//! Per candidate, queries tally exact-window and one-bit-window partition
//! matches, then prune with the HmSearch rule before paying for any
//! full-width distance:
//!
//! - even `k`: at least one exact-matching partition, or at least two
//!   1-matching partitions;
//! - odd `k`: at least two matching partitions of which at least one is
//!   exact, or at least three 1-matching partitions.
//!
//! Admitted candidates are verified by `popcount(q XOR x) ≤ k`, which is
//! authoritative: partial-match evidence decides only who gets verified,
//! never who gets returned.

use std::collections::HashMap;

use hamdb_core::Key;

use crate::lru::LruStore;
use crate::partition::{PartialMatch, Partition};
use crate::store::{BucketStore, MapStore};
use crate::{IndexError, Result};

/// The multi-index over `P` partitions, generic in the bucket-store
/// strategy backing each partition.
#[derive(Debug)]
pub struct Partitioning<S> {
    bits: u32,
    tolerance: u32,
    partitions: Vec<Partition<S>>,
}

/// Per-candidate partial-match evidence gathered across partitions.
#[derive(Default)]
struct Tally {
    exact: u32,
    one_bit: u32,
}

impl Partitioning<MapStore> {
    /// An index over unbounded bucket stores — the full-recall
    /// configuration.
    pub fn unbounded(bits: u32, tolerance: u32) -> Result<Self> {
        Self::with_stores(bits, tolerance, MapStore::new)
    }
}

impl Partitioning<LruStore> {
    /// An index whose bucket stores are each bounded to `capacity`
    /// buckets. Evictions can cost recall but never correctness.
    pub fn bounded(bits: u32, tolerance: u32, capacity: usize) -> Result<Self> {
        Self::with_stores(bits, tolerance, || LruStore::new(capacity))
    }
}

impl<S: BucketStore> Partitioning<S> {
    /// Build the index with a caller-supplied store per table. `factory`
    /// is invoked twice per partition (zero-table, then one-table).
    pub fn with_stores(bits: u32, tolerance: u32, mut factory: impl FnMut() -> S) -> Result<Self> {
        if bits == 0 || bits % 8 != 0 {
            return Err(IndexError::InvalidGeometry(bits));
        }

        let count = bits.min(tolerance).max(1);
        let head_width = bits.div_ceil(count);
        let tail_width = bits / count;
        let head_count = bits % count;

        let mut partitions = Vec::with_capacity(count as usize);
        let mut shift = 0;
        for i in 0..count {
            let width = if i < head_count { head_width } else { tail_width };
            partitions.push(Partition::new(shift, width, factory(), factory()));
            shift += width;
        }
        debug_assert_eq!(shift, bits);

        tracing::debug!(bits, tolerance, partitions = count, "index created");
        Ok(Self { bits, tolerance, partitions })
    }

    /// Key width this index was built for.
    #[inline]
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Maximum Hamming distance a match may have.
    #[inline]
    pub fn tolerance(&self) -> u32 {
        self.tolerance
    }

    /// The `(shift, width)` windows, in partition order.
    pub fn geometry(&self) -> Vec<(u32, u32)> {
        self.partitions.iter().map(|p| (p.shift(), p.width())).collect()
    }

    fn check_width(&self, key: &Key) -> Result<()> {
        if key.bits() != self.bits {
            return Err(IndexError::WidthMismatch {
                expected: self.bits,
                got: key.bits(),
            });
        }
        Ok(())
    }

    /// Index `key` in every partition. Returns `true` iff any partition
    /// newly accepted it — `false` means the key was already fully
    /// indexed.
    pub fn insert(&self, key: &Key) -> Result<bool> {
        self.check_width(key)?;
        let mut inserted = false;
        for partition in &self.partitions {
            inserted |= partition.insert(key);
        }
        Ok(inserted)
    }

    /// Remove `key` from every partition. Returns `true` iff any
    /// partition actually held it.
    pub fn remove(&self, key: &Key) -> Result<bool> {
        self.check_width(key)?;
        let mut removed = false;
        for partition in &self.partitions {
            removed |= partition.remove(key);
        }
        Ok(removed)
    }

    /// Every indexed key within `tolerance` of `query`, with its exact
    /// Hamming distance.
    pub fn find(&self, query: &Key) -> Result<HashMap<Key, u32>> {
        self.check_width(query)?;

        let mut tally: HashMap<Key, Tally> = HashMap::new();
        for partition in &self.partitions {
            for (key, mark) in partition.find(query) {
                let entry = tally.entry(key).or_default();
                match mark {
                    PartialMatch::Exact => entry.exact += 1,
                    PartialMatch::OneBit => entry.one_bit += 1,
                }
            }
        }
        let candidates = tally.len();

        let mut matches = HashMap::new();
        for (candidate, evidence) in tally {
            if !self.admissible(&evidence) {
                continue;
            }
            let distance = query.hamming(&candidate);
            if distance <= self.tolerance {
                matches.insert(candidate, distance);
            }
        }

        tracing::debug!(
            query = %query,
            candidates,
            matches = matches.len(),
            "query complete"
        );
        Ok(matches)
    }

    /// The HmSearch candidate filter.
    fn admissible(&self, tally: &Tally) -> bool {
        // A lone partition's window is the whole key: any evidence it
        // emits is already total, and the two-partition thresholds below
        // would starve it. Let the distance check decide.
        if self.partitions.len() < 2 {
            return true;
        }
        if self.tolerance % 2 == 0 {
            // "If k is an even number, S must have at least one
            // exact-matching partition, or two 1-matching partitions."
            tally.exact >= 1 || tally.one_bit >= 2
        } else {
            // "If k is an odd number, S must have at least two matching
            // partitions where at least one of the matches should be an
            // exact match, or S must have at least three 1-matching
            // partitions."
            (tally.exact >= 1 && tally.exact + tally.one_bit >= 2) || tally.one_bit >= 3
        }
    }

    /// Batch insert. Stops at the first error; the caller must assume
    /// earlier keys in the batch are indexed.
    pub fn insert_many(&self, keys: &[Key]) -> Result<Vec<bool>> {
        keys.iter().map(|key| self.insert(key)).collect()
    }

    /// Batch remove, with [`Partitioning::insert_many`]'s error contract.
    pub fn remove_many(&self, keys: &[Key]) -> Result<Vec<bool>> {
        keys.iter().map(|key| self.remove(key)).collect()
    }

    /// Batch query, with [`Partitioning::insert_many`]'s error contract.
    pub fn find_many(&self, queries: &[Key]) -> Result<Vec<HashMap<Key, u32>>> {
        queries.iter().map(|query| self.find(query)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn key(s: &str) -> Key {
        Key::from_bits_str(s).unwrap()
    }

    #[test]
    fn test_partition_evenly() {
        let index = Partitioning::unbounded(32, 4).unwrap();
        assert_eq!(index.geometry(), vec![(0, 8), (8, 8), (16, 8), (24, 8)]);
    }

    #[test]
    fn test_partition_unevenly() {
        let index = Partitioning::unbounded(32, 5).unwrap();
        assert_eq!(
            index.geometry(),
            vec![(0, 7), (7, 7), (14, 6), (20, 6), (26, 6)]
        );
    }

    #[test]
    fn test_partition_count_clamps_to_bits() {
        let index = Partitioning::unbounded(8, 16).unwrap();
        assert_eq!(index.geometry().len(), 8);
        assert!(index.geometry().iter().all(|&(_, w)| w == 1));
    }

    #[test]
    fn test_partition_zero_tolerance() {
        let index = Partitioning::unbounded(32, 0).unwrap();
        assert_eq!(index.geometry(), vec![(0, 32)]);
    }

    #[test]
    fn test_rejects_bad_widths() {
        assert_eq!(
            Partitioning::unbounded(0, 0).unwrap_err(),
            IndexError::InvalidGeometry(0)
        );
        assert_eq!(
            Partitioning::unbounded(12, 3).unwrap_err(),
            IndexError::InvalidGeometry(12)
        );
    }

    #[test]
    fn test_width_mismatch_is_rejected() {
        let index = Partitioning::unbounded(16, 2).unwrap();
        let narrow = Key::from_u64(1, 8);
        let err = IndexError::WidthMismatch { expected: 16, got: 8 };

        assert_eq!(index.insert(&narrow).unwrap_err(), err);
        assert_eq!(index.remove(&narrow).unwrap_err(), err);
        assert_eq!(index.find(&narrow).unwrap_err(), err);
    }

    #[test]
    fn test_find_missing_key() {
        let index = Partitioning::unbounded(8, 2).unwrap();
        assert!(index.find(&key("11111111")).unwrap().is_empty());
    }

    #[test]
    fn test_insert_then_find_self() {
        let index = Partitioning::unbounded(8, 4).unwrap();
        let a = key("00001111");

        assert!(index.insert(&a).unwrap());
        let found = index.find(&a).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found.get(&a), Some(&0));
    }

    #[test]
    fn test_insert_is_idempotent() {
        let index = Partitioning::unbounded(8, 4).unwrap();
        let a = key("00001111");

        assert!(index.insert(&a).unwrap());
        for _ in 0..4 {
            assert!(!index.insert(&a).unwrap());
        }
        assert_eq!(index.find(&a).unwrap().len(), 1);
    }

    #[test]
    fn test_find_at_distance_one() {
        let index = Partitioning::unbounded(8, 4).unwrap();
        let a = key("00001111");
        let b = key("00000111");

        index.insert(&a).unwrap();
        let found = index.find(&b).unwrap();
        assert_eq!(found.get(&a), Some(&1));
    }

    #[test]
    fn test_find_multiple_similar_keys() {
        let index = Partitioning::unbounded(8, 4).unwrap();
        let b = key("10000000");
        let c = key("10000001");
        let d = key("11000001");
        let e = key("11000011");
        for k in [&b, &c, &d, &e] {
            index.insert(k).unwrap();
        }

        let found = index.find(&key("00000000")).unwrap();
        assert_eq!(found.len(), 4);
        assert_eq!(found.get(&b), Some(&1));
        assert_eq!(found.get(&c), Some(&2));
        assert_eq!(found.get(&d), Some(&3));
        assert_eq!(found.get(&e), Some(&4));
    }

    #[test]
    fn test_does_not_find_beyond_tolerance() {
        let index = Partitioning::unbounded(8, 2).unwrap();
        index.insert(&key("00001111")).unwrap();
        // Distance 4 > tolerance 2.
        assert!(index.find(&key("00110011")).unwrap().is_empty());
    }

    #[test]
    fn test_finds_key_with_one_difference_per_partition() {
        // Four partitions of width two; the key differs from the query in
        // exactly one bit of every window, so no partition matches
        // exactly and admission rests entirely on 1-match counts.
        let index = Partitioning::unbounded(8, 4).unwrap();
        let x = key("10101010");
        index.insert(&x).unwrap();

        let found = index.find(&key("00000000")).unwrap();
        assert_eq!(found.get(&x), Some(&4));
    }

    #[test]
    fn test_single_partition_tolerance_one() {
        // k = 1 collapses to one partition covering the whole key.
        let index = Partitioning::unbounded(8, 1).unwrap();
        let x = key("01100000");
        index.insert(&x).unwrap();

        assert_eq!(index.find(&x).unwrap().get(&x), Some(&0));
        assert_eq!(index.find(&x.flip(4)).unwrap().get(&x), Some(&1));
        assert!(index.find(&x.flip(4).flip(5)).unwrap().is_empty());
    }

    #[test]
    fn test_remove_inserted_key() {
        let index = Partitioning::unbounded(8, 4).unwrap();
        let a = key("00001111");

        index.insert(&a).unwrap();
        assert!(index.remove(&a).unwrap());
        assert!(index.find(&a).unwrap().is_empty());
    }

    #[test]
    fn test_remove_missing_key() {
        let index = Partitioning::unbounded(8, 4).unwrap();
        assert!(!index.remove(&key("00001111")).unwrap());
        assert!(index.find(&key("00001111")).unwrap().is_empty());
    }

    #[test]
    fn test_batch_operations() {
        let index = Partitioning::unbounded(8, 2).unwrap();
        let keys = [key("00000001"), key("00000011"), key("00000001")];

        assert_eq!(index.insert_many(&keys).unwrap(), vec![true, true, false]);
        let found = index.find_many(&keys[..2]).unwrap();
        assert_eq!(found[0].len(), 2);
        assert_eq!(found[1].len(), 2);
        assert_eq!(
            index.remove_many(&keys).unwrap(),
            vec![true, true, false]
        );
    }

    #[test]
    fn test_bounded_index_round_trip() {
        let index = Partitioning::bounded(8, 2, 1024).unwrap();
        let a = key("11110000");

        assert!(index.insert(&a).unwrap());
        assert_eq!(index.find(&a).unwrap().get(&a), Some(&0));
        assert!(index.remove(&a).unwrap());
        assert!(index.find(&a).unwrap().is_empty());
    }

    #[test]
    fn test_wide_keys() {
        let index = Partitioning::unbounded(128, 6).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let bytes: Vec<u8> = (0..16).map(|_| rng.gen()).collect();
        let x = Key::from_bytes(&bytes).unwrap();

        index.insert(&x).unwrap();
        assert_eq!(index.find(&x).unwrap().get(&x), Some(&0));

        let q = x.flip(3).flip(77).flip(127);
        assert_eq!(index.find(&q).unwrap().get(&x), Some(&3));
    }

    #[test]
    fn test_distance_correctness_randomized() {
        // Any key within tolerance of the query must come back with its
        // exact distance, and nothing may come back beyond tolerance.
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for tolerance in [2u32, 3, 4, 7] {
            let index = Partitioning::unbounded(64, tolerance).unwrap();
            let query = Key::from_u64(rng.gen(), 64);

            let mut expected = Vec::new();
            for _ in 0..64 {
                let distance = rng.gen_range(0..=tolerance + 2);
                let mut x = query.clone();
                let mut flipped = std::collections::HashSet::new();
                while (flipped.len() as u32) < distance {
                    let bit = rng.gen_range(0..64);
                    if flipped.insert(bit) {
                        x = x.flip(bit);
                    }
                }
                index.insert(&x).unwrap();
                if distance <= tolerance {
                    expected.push((x, distance));
                }
            }

            let found = index.find(&query).unwrap();
            for (x, distance) in &expected {
                assert_eq!(found.get(x), Some(distance), "tolerance {tolerance}");
            }
            for (x, distance) in &found {
                assert_eq!(*distance, query.hamming(x));
                assert!(*distance <= tolerance);
            }
        }
    }

    #[test]
    fn test_concurrent_inserts_and_queries() {
        use std::sync::Arc;
        use std::thread;

        let index = Arc::new(Partitioning::unbounded(32, 3).unwrap());

        let mut handles = Vec::new();
        for t in 0..4u64 {
            let index = Arc::clone(&index);
            handles.push(thread::spawn(move || {
                for i in 0..500u64 {
                    let key = Key::from_u64(t << 16 | i, 32);
                    assert!(index.insert(&key).unwrap());

                    let found = index.find(&key).unwrap();
                    assert_eq!(found.get(&key), Some(&0));
                    // Whatever else is visible mid-flight must verify.
                    for (other, distance) in &found {
                        assert_eq!(*distance, key.hamming(other));
                    }
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        for t in 0..4u64 {
            for i in 0..500u64 {
                let key = Key::from_u64(t << 16 | i, 32);
                assert!(index.find(&key).unwrap().contains_key(&key));
            }
        }
    }

    #[test]
    fn test_consistency_under_load() {
        // 100k membership toggles over a tiny key universe, verifying
        // presence and absence every thousand operations.
        let index = Partitioning::bounded(16, 4, 100_000).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut present = [false; 16];

        for op in 0..100_000u32 {
            let j = rng.gen_range(0..16u64);
            let k = Key::from_u64(j, 16);
            if present[j as usize] {
                assert!(index.remove(&k).unwrap());
                present[j as usize] = false;
            } else {
                assert!(index.insert(&k).unwrap());
                present[j as usize] = true;
            }

            if op % 1000 == 0 {
                for (value, expect) in present.iter().enumerate() {
                    let k = Key::from_u64(value as u64, 16);
                    let found = index.find(&k).unwrap().contains_key(&k);
                    assert_eq!(found, *expect, "key {value} after {op} ops");
                }
            }
        }
    }
}
