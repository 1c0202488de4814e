//! HTTP server module

mod api;
mod messages;
mod sse;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use crate::AppState;

pub use api::HealthResponse;
pub use messages::CallParams;
pub use sse::MESSAGES_PATH;

/// Create the HTTP router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/sse", get(sse::open_stream))
        .route(MESSAGES_PATH, post(messages::post_message))
        .route("/api/health", get(api::health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
