// SPDX-License-Identifier: AGPL-3.0-or-later
// HamDB - Hamming-Distance Search Database
// Copyright (C) 2026 Sushanth Reddy Vanagala (https://github.com/sushanthpy)

//! # Partition — One Shard of the Multi-Index
//!
//! A partition owns a `(shift, width)` window into the key space and two
//! bucket stores over that window:
//!
//! - **zero-table** — keyed by the raw sub-word. Holding a key here is the
//!   authoritative statement that the key is indexed in this partition.
//! - **one-table** — keyed by every single-bit flip of the sub-word. The
//!   flip variants are precomputed at insert time so that a query resolves
//!   its one-bit neighborhood with a single lookup: `one_kv[subword(q)]`
//!   contains exactly the keys whose window differs from the query's in
//!   one position. This is the memory-for-time trade at the heart of the
//!   scheme — `width` extra writes per insert buy O(1) neighborhood reads.
//!
//! The one-table is derived state: its entries are written only after the
//! zero-table accepts a key, and removed only after the zero-table gives
//! it up, so the two can never disagree about membership.

use std::collections::HashMap;

use hamdb_core::Key;

use crate::store::BucketStore;

/// How a key matched a query within a single partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialMatch {
    /// The key's sub-word equals the query's.
    Exact,
    /// The key's sub-word is one bit off the query's.
    OneBit,
}

/// One shard: a `(shift, width)` window plus its two bucket stores.
#[derive(Debug)]
pub struct Partition<S> {
    shift: u32,
    width: u32,
    zero: S,
    one: S,
}

impl<S: BucketStore> Partition<S> {
    /// `width == 0` is a legal degenerate shard: every key maps to the
    /// single empty sub-word and the one-table stays empty.
    pub fn new(shift: u32, width: u32, zero: S, one: S) -> Self {
        Self { shift, width, zero, one }
    }

    #[inline]
    pub fn shift(&self) -> u32 {
        self.shift
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Index `key` in this partition. Returns `true` iff the key was not
    /// already present (the zero-table's verdict); the one-table entries
    /// are written only on that first insert, keeping them exactly in step.
    pub fn insert(&self, key: &Key) -> bool {
        let sub = key.subword(self.shift, self.width);
        if !self.zero.add(sub.clone(), key.clone()) {
            return false;
        }
        for bit in 0..self.width {
            self.one.add(sub.flip(bit), key.clone());
        }
        true
    }

    /// Mirror of [`Partition::insert`]: the zero-table removal decides,
    /// and only a successful one tears down the derived one-table entries.
    pub fn remove(&self, key: &Key) -> bool {
        let sub = key.subword(self.shift, self.width);
        if !self.zero.remove(&sub, key) {
            return false;
        }
        for bit in 0..self.width {
            self.one.remove(&sub.flip(bit), key);
        }
        true
    }

    /// Every key matching `query` in this partition, tagged exact or
    /// one-bit. Both tables are consulted at the query's own sub-word;
    /// the zero-table is read last so an exact mark wins if a key ever
    /// carries both.
    pub fn find(&self, query: &Key) -> HashMap<Key, PartialMatch> {
        let sub = query.subword(self.shift, self.width);
        let mut found = HashMap::new();

        for key in self.one.get(&sub) {
            found.insert(key, PartialMatch::OneBit);
        }
        for key in self.zero.get(&sub) {
            found.insert(key, PartialMatch::Exact);
        }

        if !found.is_empty() {
            tracing::trace!(
                shift = self.shift,
                width = self.width,
                matches = found.len(),
                "partition matches"
            );
        }
        found
    }
}
