pub mod middleware;
pub mod routes;
pub mod sse;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

// Re-export for convenience
pub use crate::infrastructure::app_state::AppState;

/// Full HTTP application: the API under `/api` plus the cross-cutting layers
pub fn create_app(state: Arc<AppState>) -> Router {
    let timeout = state.config.request_timeout;

    Router::new()
        .nest("/api", routes::create_api_router(state.clone()))
        .layer(TimeoutLayer::new(timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
