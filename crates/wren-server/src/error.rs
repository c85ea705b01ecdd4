use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use wren::errors::TurnError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Errors returned by the HTTP handlers
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Turn(#[from] TurnError),
    #[error("Session '{0}' not found")]
    SessionNotFound(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Turn(TurnError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Turn(
                TurnError::ResponderUnavailable(_)
                | TurnError::ToolUnavailable { .. }
                | TurnError::ToolRoundLimitExceeded(_),
            ) => StatusCode::BAD_GATEWAY,
            ApiError::Turn(TurnError::Internal(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, error = %self, "request failed");
        } else {
            tracing::debug!(%status, error = %self, "request rejected");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
