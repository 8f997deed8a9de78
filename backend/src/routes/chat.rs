use crate::errors::AppError;
use crate::state::AppState;
use crate::utils::auth::models::Claims;
use crate::utils::chat::{create_message, ensure_member, errors::ChatError, models::*, poll_messages};
use crate::utils::groups::{check_if_group_exists, errors::GroupError};
use axum::extract::rejection::FormRejection;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{debug_handler, Form, Json, Router};
use sqlx::SqlitePool;
use tracing::debug;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/group/:group_id/message/send/", post(post_send_message))
        .route("/group/:group_id/messages/", get(get_messages))
}

async fn ensure_group_exists(pool: &SqlitePool, group_id: i64) -> Result<(), AppError> {
    if check_if_group_exists(pool, group_id).await? {
        Ok(())
    } else {
        Err(GroupError::GroupDoesNotExist.into())
    }
}

#[debug_handler(state = AppState)]
async fn post_send_message(
    claims: Claims,
    State(pool): State<SqlitePool>,
    Path(group_id): Path<i64>,
    form: Result<Form<NewMessage>, FormRejection>,
) -> Result<Json<SentMessage>, AppError> {
    ensure_group_exists(&pool, group_id).await?;
    ensure_member(&pool, claims.user_id, group_id).await?;

    let Form(new_message) = form.map_err(|rejection| {
        debug!("Rejected message form: {rejection}");
        ChatError::InvalidForm
    })?;

    let content = new_message.content.unwrap_or_default();
    let message = create_message(&pool, claims.user_id, group_id, &content).await?;

    Ok(Json(SentMessage {
        success: true,
        message: MessagePayload::new(&message, claims.user_id),
    }))
}

#[debug_handler(state = AppState)]
async fn get_messages(
    claims: Claims,
    State(pool): State<SqlitePool>,
    Path(group_id): Path<i64>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<MessageList>, AppError> {
    ensure_group_exists(&pool, group_id).await?;

    let messages = poll_messages(&pool, claims.user_id, group_id, &query).await?;
    Ok(Json(messages))
}
