use axum::{extract::State, Json};

use crate::api::{state::AppState, types::HealthResponse};

/// GET /healthz -- liveness probe; the model is loaded before the server binds
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model: state.classifier.kind().to_string(),
        uptime_secs: state.uptime_seconds(),
    })
}
