//! Read-only HTTP endpoints: liveness and room lookup.
//!
//! Handy for a join page that wants to validate a room code before opening
//! the WebSocket.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub rooms: usize,
}

/// GET /api/health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        rooms: state.room_count().await,
    })
}

/// GET /api/rooms/{id}
pub async fn room_info(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.room(&id).await {
        Some(room) => Json(room.lock().await.info()).into_response(),
        None => (StatusCode::NOT_FOUND, "room not found").into_response(),
    }
}
