// Plain HTTP surface next to the game socket.

use crate::interface_adapters::state::AppState;
use axum::{extract::State, Json};
use std::sync::Arc;

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub users: usize,
    pub timestamp: String,
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        users: *state.users_rx.borrow(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
