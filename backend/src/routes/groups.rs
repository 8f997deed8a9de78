use crate::errors::AppError;
use crate::modules::flash::{self, Level};
use crate::modules::storage::Blobs;
use crate::modules::timestamp::Timestamp;
use crate::state::AppState;
use crate::utils::auth::models::Claims;
use crate::utils::chat::fetch_initial_messages;
use crate::utils::groups::errors::GroupError;
use crate::utils::groups::models::NewGroup;
use crate::utils::groups::*;
use crate::utils::resources::group_resources;
use crate::utils::sessions::upcoming_sessions;
use crate::views::{self, describe_validation, groups::GroupPage};
use axum::extract::rejection::FormRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{debug_handler, Form, Router};
use axum_extra::extract::CookieJar;
use sqlx::SqlitePool;
use tracing::{debug, warn};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create/", get(get_create_group).post(post_create_group))
        .route("/group/:group_id/", get(get_group_detail))
        .route("/group/:group_id/join/", post(post_join_group))
        .route("/group/:group_id/leave/", post(post_leave_group))
        .route("/group/:group_id/delete/", post(post_delete_group))
}

pub fn group_url(group_id: i64) -> String {
    format!("/group/{group_id}/")
}

/// Expected failures become a flash notice on `to`; a missing group stays a 404.
fn flash_group_error(
    jar: CookieJar,
    e: GroupError,
    to: &str,
) -> Result<(CookieJar, Redirect), AppError> {
    match e {
        GroupError::Unexpected(e) => Err(AppError::Unexpected(e)),
        GroupError::GroupDoesNotExist => Err(AppError::Group(e)),
        e => Ok(flash::redirect(jar, e.flash_level(), e.to_string(), to)),
    }
}

#[debug_handler(state = AppState)]
async fn get_create_group(claims: Claims) -> Response {
    views::groups::create_group_page(None, &[], &claims).into_response()
}

#[debug_handler(state = AppState)]
async fn post_create_group(
    claims: Claims,
    State(pool): State<SqlitePool>,
    jar: CookieJar,
    form: Result<Form<NewGroup>, FormRejection>,
) -> Result<Response, AppError> {
    let new_group = match form {
        Ok(Form(new_group)) => new_group,
        Err(rejection) => {
            debug!("Rejected group form: {rejection}");
            let errors = [rejection.body_text()];
            let page = views::groups::create_group_page(None, &errors, &claims);
            return Ok((StatusCode::BAD_REQUEST, page).into_response());
        }
    };

    match create_group(&pool, new_group.clone(), claims.user_id).await {
        Ok(group_id) => Ok(flash::redirect(
            jar,
            Level::Success,
            "Study group created successfully!",
            &group_url(group_id),
        )
        .into_response()),
        Err(GroupError::InvalidGroup(errors)) => {
            let errors = describe_validation(&errors);
            let page = views::groups::create_group_page(Some(&new_group), &errors, &claims);
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

#[debug_handler(state = AppState)]
async fn get_group_detail(
    claims: Claims,
    State(pool): State<SqlitePool>,
    State(blobs): State<Blobs>,
    Path(group_id): Path<i64>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let group = get_group(&pool, group_id).await?;
    let is_member = check_if_group_member(&pool, claims.user_id, group_id).await?;

    if let Err(e) = ensure_can_view(&group, is_member) {
        return Ok(flash_group_error(jar, e, "/browse/")?.into_response());
    }

    let members = list_members(&pool, group_id).await?;
    let resources = group_resources(&pool, group_id).await?;
    let sessions = upcoming_sessions(&pool, group_id, Timestamp::now()).await?;
    let messages = if is_member {
        fetch_initial_messages(&pool, group_id).await?
    } else {
        Vec::new()
    };

    let (jar, flash) = flash::take(jar);
    let page = views::groups::group_detail_page(
        GroupPage {
            group: &group,
            viewer: &claims,
            is_member,
            members: &members,
            resources: &resources,
            messages: &messages,
            sessions: &sessions,
            blobs: blobs.as_ref(),
        },
        flash.as_ref(),
    );

    Ok((jar, page).into_response())
}

#[debug_handler(state = AppState)]
async fn post_join_group(
    claims: Claims,
    State(pool): State<SqlitePool>,
    Path(group_id): Path<i64>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    let to = group_url(group_id);
    let group = get_group(&pool, group_id).await?;

    match try_join_group(&pool, claims.user_id, group_id).await {
        Ok(()) => Ok(flash::redirect(
            jar,
            Level::Success,
            format!("You joined {}!", group.name),
            &to,
        )),
        Err(e) => flash_group_error(jar, e, &to),
    }
}

#[debug_handler(state = AppState)]
async fn post_leave_group(
    claims: Claims,
    State(pool): State<SqlitePool>,
    Path(group_id): Path<i64>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    let group = get_group(&pool, group_id).await?;

    match try_leave_group(&pool, claims.user_id, group_id).await {
        Ok(()) => Ok(flash::redirect(
            jar,
            Level::Success,
            format!("You left {}.", group.name),
            "/dashboard/",
        )),
        Err(e) => flash_group_error(jar, e, &group_url(group_id)),
    }
}

#[debug_handler(state = AppState)]
async fn post_delete_group(
    claims: Claims,
    State(pool): State<SqlitePool>,
    State(blobs): State<Blobs>,
    Path(group_id): Path<i64>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    let group = get_group(&pool, group_id).await?;

    let files = match delete_group(&pool, claims.user_id, group_id).await {
        Ok(files) => files,
        Err(e) => return flash_group_error(jar, e, &group_url(group_id)),
    };

    for key in &files {
        if let Err(e) = blobs.delete(key).await {
            warn!("Failed to remove blob {key} of deleted group {group_id}: {e:#}");
        }
    }

    Ok(flash::redirect(
        jar,
        Level::Success,
        format!("{} was deleted.", group.name),
        "/dashboard/",
    ))
}
