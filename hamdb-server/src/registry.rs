// SPDX-License-Identifier: AGPL-3.0-or-later
// HamDB - Hamming-Distance Search Database
// Copyright (C) 2026 Sushanth Reddy Vanagala (https://github.com/sushanthpy)

//! # Database Registry
//!
//! Maps `{bits}/{tolerance}/{namespace}` triples to live indexes. The
//! registry is an ordinary field of the server state behind a concurrent
//! map — databases are created lazily on first touch and live for the
//! life of the process.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use hamdb_core::Key;
use hamdb_index::{IndexError, LruStore, MapStore, Partitioning};

/// Identity of one namespaced database.
///
/// The geometry is part of the identity: the same namespace string under
/// a different `(bits, tolerance)` pair is a different database, exactly
/// as if the triple were a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatabaseId {
    pub bits: u32,
    pub tolerance: u32,
    pub namespace: String,
}

impl fmt::Display for DatabaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.bits, self.tolerance, self.namespace)
    }
}

/// A live index behind either storage strategy.
///
/// The strategy is a process-wide server setting, not per-database: every
/// lazily-created database uses the bucket capacity the server was
/// started with.
#[derive(Debug)]
pub enum Database {
    /// Unbounded bucket stores; full recall.
    Unbounded(Partitioning<MapStore>),
    /// LRU-bounded bucket stores; bounded memory, recall may degrade.
    Bounded(Partitioning<LruStore>),
}

impl Database {
    fn open(bits: u32, tolerance: u32, max_buckets: usize) -> Result<Self, IndexError> {
        if max_buckets == 0 {
            Ok(Self::Unbounded(Partitioning::unbounded(bits, tolerance)?))
        } else {
            Ok(Self::Bounded(Partitioning::bounded(bits, tolerance, max_buckets)?))
        }
    }

    pub fn insert(&self, key: &Key) -> Result<bool, IndexError> {
        match self {
            Self::Unbounded(index) => index.insert(key),
            Self::Bounded(index) => index.insert(key),
        }
    }

    pub fn remove(&self, key: &Key) -> Result<bool, IndexError> {
        match self {
            Self::Unbounded(index) => index.remove(key),
            Self::Bounded(index) => index.remove(key),
        }
    }

    pub fn find(&self, query: &Key) -> Result<HashMap<Key, u32>, IndexError> {
        match self {
            Self::Unbounded(index) => index.find(query),
            Self::Bounded(index) => index.find(query),
        }
    }
}

/// The server's database map.
pub struct Registry {
    max_buckets: usize,
    databases: DashMap<DatabaseId, Arc<Database>>,
}

impl Registry {
    /// `max_buckets` is the per-bucket-store LRU capacity applied to
    /// every database this registry creates; `0` selects unbounded
    /// stores.
    pub fn new(max_buckets: usize) -> Self {
        Self {
            max_buckets,
            databases: DashMap::new(),
        }
    }

    /// The database for `id`, creating it on first touch. Fails only on
    /// invalid geometry, in which case nothing is created.
    pub fn open(&self, id: DatabaseId) -> Result<Arc<Database>, IndexError> {
        use dashmap::mapref::entry::Entry;

        match self.databases.entry(id) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let database = Arc::new(Database::open(
                    entry.key().bits,
                    entry.key().tolerance,
                    self.max_buckets,
                )?);
                tracing::info!(database = %entry.key(), "database created");
                entry.insert(database.clone());
                Ok(database)
            }
        }
    }

    /// Number of live databases.
    pub fn database_count(&self) -> usize {
        self.databases.len()
    }
}
