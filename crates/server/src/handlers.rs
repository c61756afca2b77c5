//! HTTP request handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::sse::Sse;
use axum::response::IntoResponse;
use axum::Json;
use fluxradar_core::{ClusterSnapshot, RegistrySnapshot};
use serde::{Serialize, Serializer};
use tracing::info;

use crate::error::IngestError;
use crate::live::LiveConnection;
use crate::state::AppState;

/// Epoch of the snapshot a `/resources` response was served from.
pub const EPOCH_HEADER: &str = "x-registry-epoch";

const NO_STORE: &str = "no-cache, no-store, must-revalidate";

/// POST /data
///
/// Accepts `{ clusterName, resources }` and replaces that cluster's records.
pub(crate) async fn handle_ingest(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, IngestError> {
    let snap = ClusterSnapshot::from_slice(&body)?;
    let count = snap.resources.len();
    let epoch = state.registry.replace_cluster(&snap.cluster_name, snap.resources);
    metrics::counter!("ingest_accepted_total", 1u64);
    info!(cluster = %snap.cluster_name, resources = count, epoch, "Successfully added data for cluster");
    Ok(Json(serde_json::json!({ "message": "Data received and added successfully" })))
}

/// Serializes only the items of a shared snapshot, without copying them.
struct Items(Arc<RegistrySnapshot>);

impl Serialize for Items {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.items.serialize(serializer)
    }
}

/// GET /resources
pub(crate) async fn handle_resources(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snap = state.registry.read_all();
    let epoch = HeaderValue::from(snap.epoch);
    (
        [
            (header::CACHE_CONTROL, HeaderValue::from_static(NO_STORE)),
            (HeaderName::from_static(EPOCH_HEADER), epoch),
        ],
        Json(Items(snap)),
    )
}

/// GET /updates
///
/// Server-sent events; a bare `update` frame per registry change.
pub(crate) async fn handle_updates(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let conn = LiveConnection::open(state.registry.notifier(), state.shutdown_rx());
    (
        [
            (header::CACHE_CONTROL, HeaderValue::from_static("no-cache, no-transform")),
            (HeaderName::from_static("x-accel-buffering"), HeaderValue::from_static("no")),
        ],
        Sse::new(conn.into_event_stream()),
    )
}

/// GET /health
pub(crate) async fn handle_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snap = state.registry.read_all();
    Json(serde_json::json!({
        "status": "ok",
        "epoch": snap.epoch,
        "resources": snap.items.len(),
        "clusters": state.registry.clusters().len(),
        "subscribers": state.registry.notifier().subscriber_count(),
    }))
}

pub(crate) async fn handle_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "not found" })))
}
