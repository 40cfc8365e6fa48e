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

//! # HamDB Core — Fixed-Width Bit-Vector Keys
//!
//! Leaf types shared by every HamDB crate. The central type is [`Key`], an
//! immutable fixed-width bit vector with the four primitives the multi-index
//! engine is built from:
//!
//! - `popcount` / [`Key::hamming`] — distance verification
//! - [`Key::flip`] — single-bit substitution variants for the one-table
//! - [`Key::subword`] — `(shift, width)` windowing for partition routing
//! - big-endian byte / hex codecs — the external boundary representation
//!
//! Keys up to 64 bits live in a native machine word; wider keys share a
//! reference-counted limb vector, so cloning a key into the many buckets
//! that reference it never copies the bits.

pub mod key;

pub use key::{Key, KeyError};
