// SPDX-License-Identifier: AGPL-3.0-or-later
// HamDB - Hamming-Distance Search Database
// Copyright (C) 2026 Sushanth Reddy Vanagala (https://github.com/sushanthpy)

//! # HTTP/JSON Batch API
//!
//! Route shape: `POST /db/{bits}/{tolerance}/{namespace}/<op>` with a
//! JSON body of hex-encoded keys. Every operation is batch-shaped — one
//! result per submitted key, in submission order. Match lists are sorted
//! by distance (ties by key) so responses are deterministic.
//!
//! Client errors — malformed hex, a key of the wrong width, an impossible
//! geometry in the path — come back as `400` with an `{"error": ...}`
//! body naming the offending input. There are no server-side failure
//! modes: the index does no I/O.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::trace::TraceLayer;

use hamdb_core::{Key, KeyError};
use hamdb_index::IndexError;

use crate::registry::{DatabaseId, Registry};

/// Batch request body shared by all three operations.
#[derive(Debug, Deserialize)]
pub struct KeyBatch {
    pub keys: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct InsertResponse {
    pub results: Vec<InsertOutcome>,
}

#[derive(Debug, Serialize)]
pub struct InsertOutcome {
    pub key: String,
    pub inserted: bool,
}

#[derive(Debug, Serialize)]
pub struct RemoveResponse {
    pub results: Vec<RemoveOutcome>,
}

#[derive(Debug, Serialize)]
pub struct RemoveOutcome {
    pub key: String,
    pub removed: bool,
}

#[derive(Debug, Serialize)]
pub struct FindResponse {
    pub results: Vec<FindOutcome>,
}

#[derive(Debug, Serialize)]
pub struct FindOutcome {
    pub key: String,
    pub matches: Vec<KeyMatch>,
}

#[derive(Debug, Serialize)]
pub struct KeyMatch {
    pub key: String,
    pub distance: u32,
}

/// Everything this API can reject is the client's input.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
}

impl From<KeyError> for ApiError {
    fn from(err: KeyError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<IndexError> for ApiError {
    fn from(err: IndexError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let Self::BadRequest(message) = self;
        (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
    }
}

/// Build the application router over a registry.
pub fn create_app(registry: Arc<Registry>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/db/:bits/:tolerance/:namespace/insert", post(insert_keys))
        .route("/db/:bits/:tolerance/:namespace/find", post(find_keys))
        .route("/db/:bits/:tolerance/:namespace/remove", post(remove_keys))
        .layer(TraceLayer::new_for_http())
        .with_state(registry)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn insert_keys(
    State(registry): State<Arc<Registry>>,
    Path((bits, tolerance, namespace)): Path<(u32, u32, String)>,
    Json(batch): Json<KeyBatch>,
) -> Result<Json<InsertResponse>, ApiError> {
    let database = registry.open(DatabaseId { bits, tolerance, namespace })?;

    let mut results = Vec::with_capacity(batch.keys.len());
    for hex_key in batch.keys {
        let key = Key::from_hex(&hex_key)?;
        let inserted = database.insert(&key)?;
        results.push(InsertOutcome { key: hex_key, inserted });
    }
    Ok(Json(InsertResponse { results }))
}

async fn remove_keys(
    State(registry): State<Arc<Registry>>,
    Path((bits, tolerance, namespace)): Path<(u32, u32, String)>,
    Json(batch): Json<KeyBatch>,
) -> Result<Json<RemoveResponse>, ApiError> {
    let database = registry.open(DatabaseId { bits, tolerance, namespace })?;

    let mut results = Vec::with_capacity(batch.keys.len());
    for hex_key in batch.keys {
        let key = Key::from_hex(&hex_key)?;
        let removed = database.remove(&key)?;
        results.push(RemoveOutcome { key: hex_key, removed });
    }
    Ok(Json(RemoveResponse { results }))
}

async fn find_keys(
    State(registry): State<Arc<Registry>>,
    Path((bits, tolerance, namespace)): Path<(u32, u32, String)>,
    Json(batch): Json<KeyBatch>,
) -> Result<Json<FindResponse>, ApiError> {
    let database = registry.open(DatabaseId { bits, tolerance, namespace })?;

    let mut results = Vec::with_capacity(batch.keys.len());
    for hex_key in batch.keys {
        let query = Key::from_hex(&hex_key)?;
        let found = database.find(&query)?;

        let mut matches: Vec<KeyMatch> = found
            .into_iter()
            .map(|(key, distance)| KeyMatch { key: key.to_hex(), distance })
            .collect();
        matches.sort_by(|a, b| a.distance.cmp(&b.distance).then_with(|| a.key.cmp(&b.key)));

        results.push(FindOutcome { key: hex_key, matches });
    }
    Ok(Json(FindResponse { results }))
}
