//! Health check endpoint for liveness probes

use axum::http::StatusCode;

/// Returns 200 with body `OK` whenever the server is accepting requests.
pub async fn health_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
