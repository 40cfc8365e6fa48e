// SPDX-License-Identifier: AGPL-3.0-or-later
// HamDB - Hamming-Distance Search Database
// Copyright (C) 2026 Sushanth Reddy Vanagala (https://github.com/sushanthpy)

//! # Bucket Stores
//!
//! A bucket store maps a sub-word (the "bucket key") to the set of full
//! keys whose partition window hashed there. The contract is small and
//! total — no operation can fail:
//!
//! | Operation      | Result                                             |
//! |----------------|----------------------------------------------------|
//! | `get(b)`       | the keys bucketed under `b`, empty if none         |
//! | `add(b, k)`    | `true` iff `k` was newly added                     |
//! | `remove(b, k)` | `true` iff `k` was present; drops emptied buckets  |
//!
//! A store is the unit of mutual exclusion: implementations are internally
//! thread-safe behind a single `parking_lot::RwLock`, so callers never
//! manage locks and never hold two stores' write locks at once.

use std::collections::{HashMap, HashSet};

use hamdb_core::Key;
use parking_lot::RwLock;

/// Mapping from sub-word buckets to sets of full keys.
///
/// Invariants shared by all implementations: stored sets are never empty
/// (removing the last member drops the bucket), and a set never holds the
/// same key twice (`add` of a present key returns `false` and is a no-op).
pub trait BucketStore: Send + Sync {
    /// The keys bucketed under `bucket`, in no particular order.
    fn get(&self, bucket: &Key) -> Vec<Key>;

    /// Add `key` to `bucket`, creating the bucket on first insert.
    /// Returns `true` iff the key was not already present.
    fn add(&self, bucket: Key, key: Key) -> bool;

    /// Remove `key` from `bucket`. Returns `true` iff it was present.
    /// A bucket whose last key is removed is dropped entirely.
    fn remove(&self, bucket: &Key, key: &Key) -> bool;

    /// Number of live buckets.
    fn bucket_count(&self) -> usize;
}

/// The unbounded store: a guarded hash map that grows without limit.
///
/// This is the full-recall configuration — nothing is ever evicted, so
/// every membership claim written by an insert survives until removed.
#[derive(Default, Debug)]
pub struct MapStore {
    buckets: RwLock<HashMap<Key, HashSet<Key>>>,
}

impl MapStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BucketStore for MapStore {
    fn get(&self, bucket: &Key) -> Vec<Key> {
        let buckets = self.buckets.read();
        buckets
            .get(bucket)
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn add(&self, bucket: Key, key: Key) -> bool {
        let mut buckets = self.buckets.write();
        buckets.entry(bucket).or_default().insert(key)
    }

    fn remove(&self, bucket: &Key, key: &Key) -> bool {
        let mut buckets = self.buckets.write();
        let Some(keys) = buckets.get_mut(bucket) else {
            return false;
        };
        if !keys.remove(key) {
            return false;
        }
        if keys.is_empty() {
            buckets.remove(bucket);
        }
        true
    }

    fn bucket_count(&self) -> usize {
        self.buckets.read().len()
    }
}
