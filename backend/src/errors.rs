use anyhow::anyhow;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use sqlx::error::ErrorKind;
use thiserror::Error;
use tracing::error;

use crate::utils::{
    auth::errors::AuthError, chat::errors::ChatError, groups::errors::GroupError,
    resources::errors::ResourceError, sessions::errors::SessionError,
};

const BACKTRACE_DEPTH: usize = 5;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Group(#[from] GroupError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error(transparent)]
    Chat(#[from] ChatError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    error: String,
}

impl ErrorResponse {
    pub fn json(error: impl Into<String>) -> Json<Self> {
        Json(Self {
            error: error.into(),
        })
    }
}

/// Logs an internal failure with a trimmed backtrace and hides it from the client.
pub fn unexpected_response(e: &anyhow::Error) -> Response {
    let backtrace = e.backtrace().to_string();
    let filtered_backtrace = backtrace
        .lines()
        .take(2 * BACKTRACE_DEPTH)
        .collect::<Vec<&str>>()
        .join("\n");
    if filtered_backtrace == "disabled backtrace" {
        error!("{e:#}");
    } else {
        error!("{e:#}\n\n{filtered_backtrace}");
    }

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorResponse::json("Unexpected server error"),
    )
        .into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Auth(e) => e.into_response(),
            AppError::Group(e) => e.into_response(),
            AppError::Resource(e) => e.into_response(),
            AppError::Chat(e) => e.into_response(),
            AppError::Session(e) => e.into_response(),
            AppError::Unexpected(e) => unexpected_response(&e),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(val: sqlx::Error) -> Self {
        Self::Unexpected(anyhow!(val))
    }
}

/// Classifies a database error by constraint kind so callers can turn the
/// ones they expect into domain errors.
pub struct DbErrMessage<E> {
    pub err: E,
    pub kind: ErrorKind,
}

impl<E: From<anyhow::Error>> DbErrMessage<E> {
    pub fn new(err: sqlx::Error) -> Self {
        let kind = err
            .as_database_error()
            .map(|e| e.kind())
            .unwrap_or(ErrorKind::Other);

        Self {
            err: E::from(anyhow!(err)),
            kind,
        }
    }

    pub fn fk(mut self, err: impl FnOnce() -> E) -> Self {
        if matches!(self.kind, ErrorKind::ForeignKeyViolation) {
            self.err = err();
        }
        self
    }

    pub fn unique(mut self, err: impl FnOnce() -> E) -> Self {
        if matches!(self.kind, ErrorKind::UniqueViolation) {
            self.err = err();
        }
        self
    }

    pub fn into_inner(self) -> E {
        self.err
    }
}
