use crate::errors::AppError;
use crate::modules::flash::{self, Level};
use crate::state::AppState;
use crate::utils::auth::models::Claims;
use crate::utils::groups::{check_if_group_exists, check_if_group_member, errors::GroupError};
use crate::utils::sessions::{create_session, errors::SessionError, models::NewSession};
use crate::views::describe_validation;
use axum::extract::rejection::FormRejection;
use axum::extract::{Path, State};
use axum::response::Redirect;
use axum::routing::post;
use axum::{debug_handler, Form, Router};
use axum_extra::extract::CookieJar;
use sqlx::SqlitePool;

use super::groups::group_url;

pub fn router() -> Router<AppState> {
    Router::new().route("/group/:group_id/session/add/", post(post_add_session))
}

#[debug_handler(state = AppState)]
async fn post_add_session(
    claims: Claims,
    State(pool): State<SqlitePool>,
    Path(group_id): Path<i64>,
    jar: CookieJar,
    form: Result<Form<NewSession>, FormRejection>,
) -> Result<(CookieJar, Redirect), AppError> {
    if !check_if_group_exists(&pool, group_id).await? {
        return Err(GroupError::GroupDoesNotExist.into());
    }
    let to = group_url(group_id);

    if !check_if_group_member(&pool, claims.user_id, group_id).await? {
        let e = SessionError::NotAMember;
        return Ok(flash::redirect(jar, Level::Error, e.to_string(), &to));
    }

    let new_session = match form {
        Ok(Form(new_session)) => new_session,
        Err(rejection) => {
            return Ok(flash::redirect(jar, Level::Error, rejection.body_text(), &to));
        }
    };

    match create_session(&pool, group_id, claims.user_id, new_session).await {
        Ok(_) => Ok(flash::redirect(
            jar,
            Level::Success,
            "Study session scheduled!",
            &to,
        )),
        Err(SessionError::Unexpected(e)) => Err(AppError::Unexpected(e)),
        Err(SessionError::InvalidSession(errors)) => Ok(flash::redirect(
            jar,
            Level::Error,
            describe_validation(&errors).join("; "),
            &to,
        )),
        Err(e) => Ok(flash::redirect(jar, Level::Error, e.to_string(), &to)),
    }
}
