use crate::modules::flash::Level;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GroupError {
    #[error("Group does not exist")]
    GroupDoesNotExist,
    #[error("This group is full.")]
    GroupFull,
    #[error("You are already a member.")]
    AlreadyMember,
    #[error("You are not a member.")]
    NotAMember,
    #[error("Group creator cannot leave. Delete the group instead.")]
    CreatorCannotLeave,
    #[error("Only the group creator can delete the group.")]
    NotTheCreator,
    #[error("This is a private group.")]
    PrivateGroup,
    #[error("Invalid group")]
    InvalidGroup(#[from] validator::ValidationErrors),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl GroupError {
    pub fn flash_level(&self) -> Level {
        match self {
            GroupError::AlreadyMember => Level::Info,
            _ => Level::Error,
        }
    }
}

impl IntoResponse for GroupError {
    fn into_response(self) -> axum::response::Response {
        let status_code = match &self {
            GroupError::GroupDoesNotExist => StatusCode::NOT_FOUND,
            GroupError::GroupFull => StatusCode::CONFLICT,
            GroupError::AlreadyMember => StatusCode::CONFLICT,
            GroupError::NotAMember => StatusCode::FORBIDDEN,
            GroupError::CreatorCannotLeave => StatusCode::BAD_REQUEST,
            GroupError::NotTheCreator => StatusCode::FORBIDDEN,
            GroupError::PrivateGroup => StatusCode::FORBIDDEN,
            GroupError::InvalidGroup(_) => StatusCode::BAD_REQUEST,
            GroupError::Unexpected(e) => {
                tracing::error!("Internal server error: {e:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let info = match self {
            GroupError::Unexpected(_) => "Unexpected server error".into(),
            _ => self.to_string(),
        };

        (status_code, Json(json!({ "error": info }))).into_response()
    }
}
