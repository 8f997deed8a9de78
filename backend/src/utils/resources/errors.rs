use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("You must be a member to add resources.")]
    NotAMember,
    #[error("Invalid resource")]
    InvalidResource(#[from] validator::ValidationErrors),
    #[error("Unknown resource type")]
    UnknownType,
    #[error("Malformed upload")]
    MalformedUpload,
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl IntoResponse for ResourceError {
    fn into_response(self) -> axum::response::Response {
        let status_code = match &self {
            ResourceError::NotAMember => StatusCode::FORBIDDEN,
            ResourceError::InvalidResource(_) => StatusCode::BAD_REQUEST,
            ResourceError::UnknownType => StatusCode::BAD_REQUEST,
            ResourceError::MalformedUpload => StatusCode::BAD_REQUEST,
            ResourceError::Unexpected(e) => {
                tracing::error!("Internal server error: {e:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let info = match self {
            ResourceError::Unexpected(_) => "Unexpected server error".into(),
            _ => self.to_string(),
        };

        (status_code, Json(json!({ "error": info }))).into_response()
    }
}
