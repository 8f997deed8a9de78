pub mod errors;
pub mod models;

use crate::modules::timestamp::Timestamp;
use crate::utils::groups::check_if_group_member;
use anyhow::Context;
use errors::*;
use models::*;
use sqlx::{query_as, SqlitePool};
use tracing::info;
use validator::Validate;

pub async fn create_session(
    pool: &SqlitePool,
    group_id: i64,
    user_id: i64,
    new_session: NewSession,
) -> Result<i64, SessionError> {
    if !check_if_group_member(pool, user_id, group_id)
        .await
        .map_err(anyhow::Error::from)?
    {
        return Err(SessionError::NotAMember);
    }

    let new_session = NewSession {
        title: new_session.title.trim().to_string(),
        description: new_session.description.trim().to_string(),
        ..new_session
    };
    new_session.validate()?;

    let scheduled_time = Timestamp::parse_datetime_local(&new_session.scheduled_time)
        .map_err(|_| SessionError::InvalidScheduledTime)?;

    let (session_id,): (i64,) = query_as(
        r#"
            INSERT INTO study_sessions (group_id, title, description, scheduled_time, duration_minutes, created_by, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id
        "#,
    )
    .bind(group_id)
    .bind(&new_session.title)
    .bind(&new_session.description)
    .bind(scheduled_time)
    .bind(new_session.duration_minutes)
    .bind(user_id)
    .bind(Timestamp::now())
    .fetch_one(pool)
    .await
    .context("Failed to create a study session")?;

    info!("User {user_id} scheduled session {session_id} in group {group_id}");
    Ok(session_id)
}

/// Sessions starting at or after `now`, soonest first.
pub async fn upcoming_sessions(
    pool: &SqlitePool,
    group_id: i64,
    now: Timestamp,
) -> Result<Vec<StudySession>, SessionError> {
    let sessions = query_as::<_, StudySession>(
        r#"
            SELECT s.id, s.group_id, s.title, s.description, s.scheduled_time, s.duration_minutes,
                   s.created_by, u.username AS creator, s.created_at
            FROM study_sessions s
            JOIN users u ON u.id = s.created_by
            WHERE s.group_id = ? AND s.scheduled_time >= ?
            ORDER BY s.scheduled_time, s.id
        "#,
    )
    .bind(group_id)
    .bind(now)
    .fetch_all(pool)
    .await
    .context("Failed to select upcoming sessions")?;

    Ok(sessions)
}
