use anyhow::Context;
use axum::{
    debug_handler,
    extract::{Query, State},
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use axum_extra::extract::CookieJar;
use maud::Markup;
use serde_json::json;
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    configuration::Settings,
    errors::AppError,
    modules::flash,
    state::{AppState, MEDIA_URL},
    utils::{
        auth::models::Claims,
        groups::{
            browse_groups, featured_groups, list_subjects,
            models::{BrowseFilter, FEATURED_GROUPS},
            query_user_groups,
        },
    },
    views,
};

pub mod auth;
pub mod chat;
pub mod groups;
pub mod resources;
pub mod sessions;

pub async fn app(config: Settings, test_pool: Option<SqlitePool>) -> anyhow::Result<Router> {
    let origin = config
        .app
        .origin
        .parse::<HeaderValue>()
        .context("Invalid origin")?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true);

    let state = AppState::new(&config, test_pool)
        .await
        .context("Failed to build application state")?;

    Ok(Router::new()
        .route("/", get(home))
        .route("/dashboard/", get(dashboard))
        .route("/browse/", get(browse))
        .route("/health", get(health_check))
        .merge(groups::router())
        .merge(resources::router())
        .merge(chat::router())
        .merge(sessions::router())
        .nest("/auth", auth::router())
        .nest_service(MEDIA_URL, ServeDir::new(&config.storage.media_root))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors))
}

#[debug_handler]
async fn health_check(State(pool): State<SqlitePool>) -> impl IntoResponse {
    let is_database_connected = sqlx::query("SELECT 1").fetch_one(&pool).await.is_ok();
    if is_database_connected {
        return (
            StatusCode::OK,
            Json(json!({"status": "all backend services are working properly"})),
        );
    }
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({"status":"database unavailable"})),
    )
}

#[debug_handler(state = AppState)]
async fn home(
    State(pool): State<SqlitePool>,
    user: Option<Claims>,
    jar: CookieJar,
) -> Result<(CookieJar, Markup), AppError> {
    let (jar, flash) = flash::take(jar);
    let featured = featured_groups(&pool, FEATURED_GROUPS).await?;

    Ok((
        jar,
        views::groups::home_page(&featured, user.as_ref(), flash.as_ref()),
    ))
}

#[debug_handler(state = AppState)]
async fn dashboard(
    claims: Claims,
    State(pool): State<SqlitePool>,
    jar: CookieJar,
) -> Result<(CookieJar, Markup), AppError> {
    let (jar, flash) = flash::take(jar);
    let groups = query_user_groups(&pool, claims.user_id).await?;

    Ok((
        jar,
        views::groups::dashboard_page(&groups, &claims, flash.as_ref()),
    ))
}

#[debug_handler(state = AppState)]
async fn browse(
    State(pool): State<SqlitePool>,
    user: Option<Claims>,
    Query(filter): Query<BrowseFilter>,
    jar: CookieJar,
) -> Result<(CookieJar, Markup), AppError> {
    let (jar, flash) = flash::take(jar);
    let groups = browse_groups(&pool, &filter).await?;
    let subjects = list_subjects(&pool).await?;

    Ok((
        jar,
        views::groups::browse_page(&groups, &subjects, &filter, user.as_ref(), flash.as_ref()),
    ))
}
