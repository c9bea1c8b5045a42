use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::resolver::SecretResolver;

use super::handlers::{
    create_container_handler, delete_secret_handler, get_secret_handler, health_handler,
    upload_secret_handler,
};

#[derive(Debug, Clone)]
pub struct ApiState {
    pub resolver: SecretResolver,
}

pub fn build_router(resolver: SecretResolver) -> Router {
    let api_state = ApiState { resolver };

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/containers", post(create_container_handler))
        .route("/api/v1/secrets", post(upload_secret_handler))
        .route(
            "/api/v1/secrets/{container}/{name}",
            get(get_secret_handler).delete(delete_secret_handler),
        )
        .with_state(api_state)
        .layer(TraceLayer::new_for_http())
}
