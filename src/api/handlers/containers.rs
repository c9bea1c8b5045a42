//! Container creation handler

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use crate::api::{error::ApiError, routes::ApiState};

/// Request to create a container
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateContainerRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Container name cannot be empty"))]
    pub name: String,
}

#[instrument(skip_all)]
pub async fn create_container_handler(
    State(state): State<ApiState>,
    payload: Result<Json<CreateContainerRequest>, JsonRejection>,
) -> Result<(StatusCode, &'static str), ApiError> {
    let Json(payload) = payload?;
    payload.validate()?;

    state.resolver.create_container(&payload.name).await?;
    Ok((StatusCode::OK, "OK"))
}
