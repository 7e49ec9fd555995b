use axum::{
    routing::{get, post},
    Router,
};
use std::path::Path;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::api::{handlers, state::AppState};

pub fn create_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        // Pages
        .route("/", get(handlers::home))
        .route("/predict", post(handlers::predict))
        // System endpoints
        .route("/healthz", get(handlers::health_handler))
        // Static assets
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        // Add state and request tracing
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
