//! API route definitions

use std::sync::Arc;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use super::{error::ServerError, handlers, state::AppState};

async fn handle_404() -> impl IntoResponse {
    ServerError::NotFound(
        "Not found. Visit / for the prediction form or /health to check service status."
            .to_string(),
    )
}

async fn handle_405() -> impl IntoResponse {
    ServerError::MethodNotAllowed("Method not allowed for this endpoint.".to_string())
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match origin {
        Some(origin) if !origin.is_empty() && origin != "*" => match origin.parse::<HeaderValue>() {
            Ok(value) => layer.allow_origin(value),
            Err(_) => {
                warn!(origin = %origin, "Invalid CORS_ORIGIN, allowing any origin");
                layer.allow_origin(Any)
            }
        },
        _ => layer.allow_origin(Any),
    }
}

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_size;
    let cors = cors_layer(state.config.cors_origin.as_deref());

    Router::new()
        .route("/", get(handlers::serve_index))
        .route("/predict", post(handlers::predict))
        .route("/batch_predict", post(handlers::batch_predict))
        .route("/health", get(handlers::health_check))
        .fallback(handle_404)
        .method_not_allowed_fallback(handle_405)
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
