// SPDX-License-Identifier: AGPL-3.0-or-later
// HamDB - Hamming-Distance Search Database
// Copyright (C) 2026 Sushanth Reddy Vanagala (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! # HamDB Index — Multi-Index Substitution Engine
//!
//! An in-memory index answering approximate-match queries under the Hamming
//! metric: given a query key `q` and a tolerance `k`, return every indexed
//! key `x` with `popcount(q XOR x) ≤ k`. The approach is the HmSearch
//! multi-index scheme: trade memory for query time by indexing every key
//! once per partition, twice over.
//!
//! ## How a query runs
//!
//! ```text
//!        q ──split──▶ sub-word per partition
//!                        │
//!          ┌─────────────┼──────────────┐
//!          ▼             ▼              ▼
//!     Partition 0   Partition 1  …  Partition P-1
//!     zero-table      (exact sub-word hits)
//!     one-table       (1-bit-off sub-word hits)
//!          │             │              │
//!          └──────┬──────┴──────────────┘
//!                 ▼
//!         candidate tally (exact / one-bit counts)
//!                 ▼
//!         admission rule (even/odd k)
//!                 ▼
//!         full Hamming verification ≤ k
//! ```
//!
//! The admission rule is what makes the scheme fast: most candidates that
//! cannot be within distance `k` are rejected from partial-match counts
//! alone, before any full-width distance is computed. Its correctness
//! argument needs at least `k` partitions, which is where the partition
//! geometry in [`Partitioning`] comes from.
//!
//! ## Storage
//!
//! Each partition owns two [`BucketStore`]s. The store is the unit of
//! mutual exclusion — every store carries its own reader-writer lock, and
//! no operation ever holds two write locks at once. Two implementations
//! share the contract: [`MapStore`] (unbounded) and [`LruStore`] (bounded,
//! strict LRU eviction of whole buckets; evictions cost recall, never
//! correctness, because verification always runs on full keys).

pub mod lru;
pub mod partition;
pub mod partitioning;
pub mod store;

pub use lru::LruStore;
pub use partition::{Partition, PartialMatch};
pub use partitioning::Partitioning;
pub use store::{BucketStore, MapStore};

/// Errors surfaced by the index.
///
/// There are no transient errors: the engine does no I/O and never retries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    /// Construction-time geometry rejection.
    #[error("key width must be a positive multiple of 8, got {0} bits")]
    InvalidGeometry(u32),
    /// A key presented to insert/remove/find has the wrong width.
    /// The operation had no effect.
    #[error("key width mismatch: index holds {expected}-bit keys, got {got} bits")]
    WidthMismatch { expected: u32, got: u32 },
}

pub type Result<T> = std::result::Result<T, IndexError>;
