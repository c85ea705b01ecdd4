use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use wren::models::message::Message;
use wren::session::SessionSummary;

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionHistoryResponse {
    pub session_id: String,
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListSessionsResponse {
    pub sessions: Vec<SessionSummary>,
}

async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<ListSessionsResponse>, ApiError> {
    let sessions = state.controller.sessions().await?;
    Ok(Json(ListSessionsResponse { sessions }))
}

async fn session_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionHistoryResponse>, ApiError> {
    let messages = state.controller.history(&session_id).await?;
    if messages.is_empty() {
        return Err(ApiError::SessionNotFound(session_id));
    }

    Ok(Json(SessionHistoryResponse {
        session_id,
        messages,
    }))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/sessions", get(list_sessions))
        .route("/sessions/:session_id", get(session_history))
        .with_state(state)
}
