use crate::errors::AppError;
use crate::modules::extractors::jwt::TokenExtractors;
use crate::modules::flash::{self, Level};
use crate::state::AppState;
use crate::utils::auth::errors::AuthError;
use crate::utils::auth::models::*;
use crate::utils::auth::*;
use crate::views;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{debug_handler, Form, Router};
use axum_extra::extract::CookieJar;
use secrecy::SecretString;
use sqlx::SqlitePool;
use tracing::debug;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", get(get_register_page).post(post_register_user))
        .route("/login", get(get_login_page).post(post_login_user))
        .route("/logout", post(post_user_logout))
}

#[debug_handler(state = AppState)]
async fn get_register_page(user: Option<Claims>) -> Response {
    if user.is_some() {
        return Redirect::to("/dashboard/").into_response();
    }
    views::auth::register_page("", None).into_response()
}

#[debug_handler(state = AppState)]
async fn post_register_user(
    State(pool): State<SqlitePool>,
    State(token_ext): State<TokenExtractors>,
    jar: CookieJar,
    Form(register_credentials): Form<RegisterCredentials>,
) -> Result<Response, AppError> {
    let username = register_credentials.username.trim().to_string();
    let res = try_register_user(
        &pool,
        &username,
        SecretString::new(register_credentials.password),
    )
    .await;

    let user_id = match res {
        Ok(user_id) => user_id,
        Err(AuthError::Unexpected(e)) => return Err(AppError::Unexpected(e)),
        Err(e) => {
            debug!("Registration rejected: {e}");
            let page = views::auth::register_page(&username, Some(&e.to_string()));
            return Ok((StatusCode::BAD_REQUEST, page).into_response());
        }
    };

    let jar = login_user(user_id, &username, &token_ext, jar)?;
    let jar = flash::push(jar, Level::Success, format!("Welcome, {username}!"));

    debug!("User {user_id} registered successfully");
    Ok((jar, Redirect::to("/dashboard/")).into_response())
}

#[debug_handler(state = AppState)]
async fn get_login_page(user: Option<Claims>, jar: CookieJar) -> Response {
    if user.is_some() {
        return Redirect::to("/dashboard/").into_response();
    }
    let (jar, flash) = flash::take(jar);
    (jar, views::auth::login_page("", None, flash.as_ref())).into_response()
}

#[debug_handler(state = AppState)]
async fn post_login_user(
    State(pool): State<SqlitePool>,
    State(token_ext): State<TokenExtractors>,
    jar: CookieJar,
    Form(login_credentials): Form<LoginCredentials>,
) -> Result<Response, AppError> {
    let res = verify_user_credentials(
        &pool,
        &login_credentials.username,
        SecretString::new(login_credentials.password),
    )
    .await;

    let user = match res {
        Ok(user) => user,
        Err(AuthError::Unexpected(e)) => return Err(AppError::Unexpected(e)),
        Err(e) => {
            let page = views::auth::login_page(
                login_credentials.username.trim(),
                Some(&e.to_string()),
                None,
            );
            return Ok((StatusCode::UNAUTHORIZED, page).into_response());
        }
    };

    let jar = login_user(user.id, &user.username, &token_ext, jar)?;

    debug!("User {} logged in successfully", user.id);
    Ok((jar, Redirect::to("/dashboard/")).into_response())
}

async fn post_user_logout(jar: CookieJar) -> (CookieJar, Redirect) {
    debug!("User logged out");
    flash::redirect(logout_user(jar), Level::Info, "You have been logged out.", "/")
}
