//! Error taxonomy of the HTTP surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fluxradar_core::PayloadError;
use tracing::warn;

/// Rejection of an ingestion request. Never mutates the registry.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    InvalidPayload(#[from] PayloadError),
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let error = self.to_string();
        warn!(error = %error, "Failed to process incoming data");
        metrics::counter!("ingest_rejected_total", 1u64);
        let body = serde_json::json!({ "message": "Error processing request", "error": error });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

/// Failure to bring the listener up or keep it serving.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("binding {addr}: {source}")]
    Bind { addr: std::net::SocketAddr, source: std::io::Error },
    #[error("serving: {0}")]
    Serve(#[source] std::io::Error),
}
