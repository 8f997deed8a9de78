use axum::response::Redirect;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::trace;

const FLASH_COOKIE: &str = "flash";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Error,
}

impl Level {
    pub fn css_class(&self) -> &'static str {
        match self {
            Level::Success => "flash flash-success",
            Level::Info => "flash flash-info",
            Level::Error => "flash flash-error",
        }
    }
}

/// One-shot notice shown on the next rendered page.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: Level,
    pub message: String,
}

impl Flash {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    fn encode(&self) -> Option<String> {
        serde_urlencoded::to_string(self).ok()
    }

    fn decode(value: &str) -> Option<Self> {
        serde_urlencoded::from_str(value).ok()
    }
}

pub fn push(jar: CookieJar, level: Level, message: impl Into<String>) -> CookieJar {
    let flash = Flash::new(level, message);
    let Some(value) = flash.encode() else {
        return jar;
    };
    trace!("Flash: {flash:?}");

    jar.add(
        Cookie::build((FLASH_COOKIE, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Reads the pending flash message, if any, and clears it.
pub fn take(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let flash = jar
        .get(FLASH_COOKIE)
        .and_then(|cookie| Flash::decode(cookie.value()));

    if jar.get(FLASH_COOKIE).is_none() {
        return (jar, None);
    }
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), flash)
}

pub fn redirect(
    jar: CookieJar,
    level: Level,
    message: impl Into<String>,
    to: &str,
) -> (CookieJar, Redirect) {
    (push(jar, level, message), Redirect::to(to))
}
