// SPDX-License-Identifier: AGPL-3.0-or-later
// HamDB - Hamming-Distance Search Database
// Copyright (C) 2026 Sushanth Reddy Vanagala (https://github.com/sushanthpy)

//! # Bounded LRU Bucket Store
//!
//! A [`BucketStore`] holding at most `capacity` buckets. When an `add`
//! creates a bucket beyond the bound, the least-recently-used bucket is
//! evicted whole; `get` and `add` both refresh a bucket's recency.
//!
//! An evicted bucket silently drops its membership claims. The index
//! tolerates this: a key whose evidence was evicted may fall below the
//! admission threshold and disappear from results (lost recall), but every
//! returned result is still verified against the full key, so nothing
//! wrong is ever returned. Use [`MapStore`](crate::MapStore) when full
//! recall is required.
//!
//! ## Layout
//!
//! Buckets live in a slab of slots threaded onto an intrusive doubly-linked
//! recency list — `head` is most recent, `tail` next to evict. A hash map
//! resolves bucket keys to slot indices, so `get`/`add`/`remove` are O(1)
//! and eviction is a single `tail` unlink.

use std::collections::{HashMap, HashSet};

use hamdb_core::Key;
use parking_lot::RwLock;

use crate::store::BucketStore;

const NIL: usize = usize::MAX;

#[derive(Debug)]
struct Slot {
    bucket: Key,
    keys: HashSet<Key>,
    prev: usize,
    next: usize,
}

#[derive(Debug)]
struct Recency {
    index: HashMap<Key, usize>,
    slots: Vec<Slot>,
    free: Vec<usize>,
    head: usize,
    tail: usize,
}

impl Recency {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            slots: Vec::new(),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
        }
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = (self.slots[slot].prev, self.slots[slot].next);
        match prev {
            NIL => self.head = next,
            p => self.slots[p].next = next,
        }
        match next {
            NIL => self.tail = prev,
            n => self.slots[n].prev = prev,
        }
        self.slots[slot].prev = NIL;
        self.slots[slot].next = NIL;
    }

    fn push_front(&mut self, slot: usize) {
        self.slots[slot].prev = NIL;
        self.slots[slot].next = self.head;
        match self.head {
            NIL => self.tail = slot,
            h => self.slots[h].prev = slot,
        }
        self.head = slot;
    }

    fn touch(&mut self, slot: usize) {
        if self.head != slot {
            self.unlink(slot);
            self.push_front(slot);
        }
    }

    /// Allocate a slot for a fresh bucket and link it most-recent.
    fn insert_bucket(&mut self, bucket: Key) -> usize {
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot].bucket = bucket.clone();
                slot
            }
            None => {
                self.slots.push(Slot {
                    bucket: bucket.clone(),
                    keys: HashSet::new(),
                    prev: NIL,
                    next: NIL,
                });
                self.slots.len() - 1
            }
        };
        self.index.insert(bucket, slot);
        self.push_front(slot);
        slot
    }

    /// Unlink `slot`, drop its bucket from the index, recycle the slot.
    fn drop_bucket(&mut self, slot: usize) {
        self.unlink(slot);
        let bucket = self.slots[slot].bucket.clone();
        self.index.remove(&bucket);
        self.slots[slot].keys.clear();
        self.free.push(slot);
    }
}

/// A [`BucketStore`] bounded to `capacity` buckets with strict LRU
/// eviction on the bucket-key access stream.
#[derive(Debug)]
pub struct LruStore {
    capacity: usize,
    recency: RwLock<Recency>,
}

impl LruStore {
    /// `capacity` is the maximum number of live buckets and must be
    /// positive.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "LruStore capacity must be positive");
        Self {
            capacity: capacity.max(1),
            recency: RwLock::new(Recency::new()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl BucketStore for LruStore {
    fn get(&self, bucket: &Key) -> Vec<Key> {
        // Reads refresh recency, so this takes the write lock.
        let mut recency = self.recency.write();
        let Some(&slot) = recency.index.get(bucket) else {
            return Vec::new();
        };
        recency.touch(slot);
        recency.slots[slot].keys.iter().cloned().collect()
    }

    fn add(&self, bucket: Key, key: Key) -> bool {
        let mut recency = self.recency.write();
        let slot = match recency.index.get(&bucket) {
            Some(&slot) => {
                recency.touch(slot);
                slot
            }
            None => recency.insert_bucket(bucket),
        };
        let added = recency.slots[slot].keys.insert(key);
        while recency.index.len() > self.capacity {
            let victim = recency.tail;
            tracing::trace!(bucket = %recency.slots[victim].bucket, "evicting bucket");
            recency.drop_bucket(victim);
        }
        added
    }

    fn remove(&self, bucket: &Key, key: &Key) -> bool {
        let mut recency = self.recency.write();
        let Some(&slot) = recency.index.get(bucket) else {
            return false;
        };
        if !recency.slots[slot].keys.remove(key) {
            return false;
        }
        if recency.slots[slot].keys.is_empty() {
            recency.drop_bucket(slot);
        }
        true
    }

    fn bucket_count(&self) -> usize {
        self.recency.read().index.len()
    }
}
