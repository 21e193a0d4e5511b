use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub api_configured: bool,
    pub client_initialized: bool,
}

/// GET /health
/// Reports whether the model client is usable. Always 200; degraded mode
/// shows up as `"status": "error"`.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let client_initialized = state.analyzer.is_configured();
    Json(HealthResponse {
        status: if client_initialized { "ok" } else { "error" },
        api_configured: state.config.api_configured(),
        client_initialized,
    })
}
