pub mod additions;
pub mod errors;
pub mod models;

use crate::errors::DbErrMessage;
use crate::modules::{extractors::jwt::TokenExtractors, timestamp::Timestamp};
use anyhow::Context;
use axum_extra::extract::CookieJar;
use errors::*;
use models::*;
use secrecy::{ExposeSecret, SecretString};
use sqlx::{query, query_as, SqlitePool};
use tracing::{debug, trace};
use validator::Validate;

pub async fn try_register_user(
    pool: &SqlitePool,
    username: &str,
    password: SecretString,
) -> Result<i64, AuthError> {
    let username = username.trim();
    if username.is_empty() || password.expose_secret().trim().is_empty() {
        return Err(AuthError::MissingCredential);
    }

    RegisterCredentials::new(username, password.expose_secret()).validate()?;

    let user = query("SELECT id FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await
        .context("Failed to query user by username")?;

    if user.is_some() {
        return Err(AuthError::UserAlreadyExists);
    }

    if !additions::pass_is_strong(password.expose_secret(), &[username]) {
        return Err(AuthError::WeakPassword);
    }

    let hashed_pass = additions::hash_pass(&password)?;

    let (user_id,): (i64,) = query_as(
        r#"
            INSERT INTO users (username, password, created_at)
            VALUES (?, ?, ?)
            RETURNING id
        "#,
    )
    .bind(username)
    .bind(hashed_pass)
    .bind(Timestamp::now())
    .fetch_one(pool)
    .await
    .map_err(|e| {
        DbErrMessage::new(e)
            .unique(|| AuthError::UserAlreadyExists)
            .into_inner()
    })?;

    debug!("Registered user {user_id}");
    Ok(user_id)
}

pub async fn verify_user_credentials(
    pool: &SqlitePool,
    username: &str,
    password: SecretString,
) -> Result<UserCredentials, AuthError> {
    debug!("Verifying credentials");
    if username.trim().is_empty() || password.expose_secret().trim().is_empty() {
        return Err(AuthError::MissingCredential);
    }

    let user = query_as::<_, UserCredentials>(
        r#"
            SELECT id, username, password FROM users
            WHERE username = ?
        "#,
    )
    .bind(username.trim())
    .fetch_optional(pool)
    .await
    .context("Failed to select user by username")?
    .ok_or(AuthError::WrongUserOrPassword)?;

    match additions::verify_pass(&user.password, &password)? {
        true => Ok(user),
        false => Err(AuthError::WrongUserOrPassword),
    }
}

pub fn login_user(
    user_id: i64,
    username: &str,
    token_ext: &TokenExtractors,
    jar: CookieJar,
) -> Result<CookieJar, AuthError> {
    let token = Claims::new(user_id, username, JWT_ACCESS_TOKEN_EXPIRATION).encode(&token_ext.access)?;
    let access_cookie = Claims::generate_cookie(token, token_ext.secure_cookies);
    trace!("Access JWT: {access_cookie:#?}");

    Ok(jar.add(access_cookie))
}

pub fn logout_user(jar: CookieJar) -> CookieJar {
    jar.remove(axum_extra::extract::cookie::Cookie::build(ACCESS_COOKIE).path("/"))
}
