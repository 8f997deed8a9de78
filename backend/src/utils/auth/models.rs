use crate::{modules::extractors::jwt::JwtAccessSecret, state::AppState};
use anyhow::Context;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    CookieJar,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use time::Duration;
use validator::{Validate, ValidationError};

use super::errors::AuthError;

pub const ACCESS_COOKIE: &str = "jwt";
pub const JWT_ACCESS_TOKEN_EXPIRATION: Duration = Duration::days(7);

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Claims {
    pub user_id: i64,
    pub username: String,
    pub exp: u64,
}

impl Claims {
    pub fn new(user_id: i64, username: &str, duration: Duration) -> Self {
        Self {
            user_id,
            username: username.into(),
            exp: jsonwebtoken::get_current_timestamp() + duration.whole_seconds().unsigned_abs(),
        }
    }

    pub fn encode(&self, secret: &JwtAccessSecret) -> Result<String, AuthError> {
        Ok(encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.0.expose_secret().as_bytes()),
        )
        .context("Failed to encode the access JWT")?)
    }

    pub fn generate_cookie(token: String, secure: bool) -> Cookie<'static> {
        Cookie::build((ACCESS_COOKIE, token))
            .http_only(true)
            .secure(secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(JWT_ACCESS_TOKEN_EXPIRATION)
            .build()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Claims {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let cookie = jar.get(ACCESS_COOKIE).ok_or(AuthError::InvalidToken)?;
        validate_access_token(cookie.value(), &state.token_ext.access.0)
    }
}

pub fn validate_access_token(token: &str, secret: &Secret<String>) -> Result<Claims, AuthError> {
    let mut validation = Validation::default();
    validation.leeway = 5;

    let decoding_key = DecodingKey::from_secret(secret.expose_secret().as_bytes());

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|_| AuthError::InvalidToken)
}

#[derive(Serialize, Deserialize, Validate, Debug)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Validate, Debug)]
pub struct RegisterCredentials {
    #[validate(length(min = 3, max = 32), custom = "validate_username")]
    pub username: String,
    pub password: String,
}

impl RegisterCredentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        Ok(())
    } else {
        Err(ValidationError::new("username_characters"))
    }
}

#[derive(sqlx::FromRow, Debug)]
pub struct UserCredentials {
    pub id: i64,
    pub username: String,
    pub password: String,
}
