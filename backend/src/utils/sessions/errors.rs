use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("You must be a member to schedule sessions.")]
    NotAMember,
    #[error("Invalid session")]
    InvalidSession(#[from] validator::ValidationErrors),
    #[error("Invalid scheduled time")]
    InvalidScheduledTime,
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> axum::response::Response {
        let status_code = match &self {
            SessionError::NotAMember => StatusCode::FORBIDDEN,
            SessionError::InvalidSession(_) => StatusCode::BAD_REQUEST,
            SessionError::InvalidScheduledTime => StatusCode::BAD_REQUEST,
            SessionError::Unexpected(e) => {
                tracing::error!("Internal server error: {e:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let info = match self {
            SessionError::Unexpected(_) => "Unexpected server error".into(),
            _ => self.to_string(),
        };

        (status_code, Json(json!({ "error": info }))).into_response()
    }
}
