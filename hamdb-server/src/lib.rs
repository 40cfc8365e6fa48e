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

//! # HamDB Server — HTTP/JSON Batch API
//!
//! The network face of the index: an axum application exposing batch
//! insert / find / remove over namespaced databases. A database is
//! identified by the `{bits}/{tolerance}/{namespace}` path triple and
//! created lazily on first touch; keys travel as fixed-width hex strings.
//!
//! ```bash
//! curl -X POST localhost:3000/db/64/3/photos/insert \
//!      -H 'content-type: application/json' \
//!      -d '{"keys": ["a3d70a3d70a3d70a"]}'
//! ```

pub mod api;
pub mod registry;

pub use api::create_app;
pub use registry::{Database, DatabaseId, Registry};
