pub mod errors;
pub mod models;

use crate::errors::DbErrMessage;
use crate::modules::timestamp::Timestamp;
use crate::utils::groups::check_if_group_member;
use anyhow::Context;
use errors::*;
use models::*;
use sqlx::{query_as, SqlitePool};
use tracing::debug;

pub async fn ensure_member(pool: &SqlitePool, user_id: i64, group_id: i64) -> Result<(), ChatError> {
    if check_if_group_member(pool, user_id, group_id)
        .await
        .map_err(anyhow::Error::from)?
    {
        Ok(())
    } else {
        Err(ChatError::NotAMember)
    }
}

pub async fn create_message(
    pool: &SqlitePool,
    user_id: i64,
    group_id: i64,
    content: &str,
) -> Result<ChatMessage, ChatError> {
    ensure_member(pool, user_id, group_id).await?;

    if content.trim().is_empty() {
        return Err(ChatError::EmptyMessage);
    }

    let (message_id,): (i64,) = query_as(
        r#"
            INSERT INTO messages (group_id, sender_id, content, sent_at)
            VALUES (?, ?, ?, ?)
            RETURNING id
        "#,
    )
    .bind(group_id)
    .bind(user_id)
    .bind(content)
    .bind(Timestamp::now())
    .fetch_one(pool)
    .await
    .map_err(|e| DbErrMessage::new(e).fk(|| ChatError::NotAMember).into_inner())?;

    debug!("User {user_id} sent message {message_id} to group {group_id}");

    let message = query_as::<_, ChatMessage>(
        r#"
            SELECT m.id, m.group_id, m.sender_id, u.username AS sender, m.content, m.sent_at
            FROM messages m
            JOIN users u ON u.id = m.sender_id
            WHERE m.id = ?
        "#,
    )
    .bind(message_id)
    .fetch_one(pool)
    .await
    .context("Failed to select the new message")?;

    Ok(message)
}

/// Messages sent strictly after `after` (all of them when `None`), oldest
/// first, at most [`MESSAGE_BATCH`].
pub async fn fetch_messages_after(
    pool: &SqlitePool,
    group_id: i64,
    after: Option<Timestamp>,
) -> Result<Vec<ChatMessage>, ChatError> {
    let messages = query_as::<_, ChatMessage>(
        r#"
            SELECT m.id, m.group_id, m.sender_id, u.username AS sender, m.content, m.sent_at
            FROM messages m
            JOIN users u ON u.id = m.sender_id
            WHERE m.group_id = ?1 AND (?2 IS NULL OR m.sent_at > ?2)
            ORDER BY m.sent_at, m.id
            LIMIT ?3
        "#,
    )
    .bind(group_id)
    .bind(after)
    .bind(MESSAGE_BATCH)
    .fetch_all(pool)
    .await
    .context("Failed to fetch messages")?;

    Ok(messages)
}

/// First page shown on the group page.
pub async fn fetch_initial_messages(
    pool: &SqlitePool,
    group_id: i64,
) -> Result<Vec<ChatMessage>, ChatError> {
    fetch_messages_after(pool, group_id, None).await
}

/// Poll endpoint body: membership check, then the messages after the
/// client's last-seen timestamp.
pub async fn poll_messages(
    pool: &SqlitePool,
    user_id: i64,
    group_id: i64,
    query: &MessagesQuery,
) -> Result<MessageList, ChatError> {
    ensure_member(pool, user_id, group_id).await?;

    let after = query.after().map_err(|_| ChatError::InvalidTimestamp)?;
    let messages = fetch_messages_after(pool, group_id, after).await?;

    Ok(MessageList {
        messages: messages
            .iter()
            .map(|message| MessagePayload::new(message, user_id))
            .collect(),
    })
}
