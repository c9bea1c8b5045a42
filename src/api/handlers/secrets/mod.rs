//! Secret handlers
//!
//! Payloads are returned as raw bytes and are never logged.

pub mod types;

pub use types::{SecretPath, UploadSecretRequest};

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::instrument;
use validator::Validate;

use crate::api::{error::ApiError, routes::ApiState};

#[instrument(skip_all)]
pub async fn upload_secret_handler(
    State(state): State<ApiState>,
    payload: Result<Json<UploadSecretRequest>, JsonRejection>,
) -> Result<(StatusCode, &'static str), ApiError> {
    let Json(payload) = payload?;
    payload.validate()?;

    state
        .resolver
        .upload_secret(&payload.container, &payload.name, payload.payload.as_bytes())
        .await?;
    Ok((StatusCode::OK, "OK"))
}

#[instrument(skip(state), fields(container = %container, secret_name = %name))]
pub async fn get_secret_handler(
    State(state): State<ApiState>,
    Path(SecretPath { container, name }): Path<SecretPath>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = state.resolver.get_secret(&container, &name).await?;
    Ok((StatusCode::OK, [(header::CONTENT_TYPE, "application/octet-stream")], payload))
}

#[instrument(skip(state), fields(container = %container, secret_name = %name))]
pub async fn delete_secret_handler(
    State(state): State<ApiState>,
    Path(SecretPath { container, name }): Path<SecretPath>,
) -> Result<(StatusCode, &'static str), ApiError> {
    state.resolver.delete_secret(&container, &name).await?;
    Ok((StatusCode::OK, "OK"))
}
