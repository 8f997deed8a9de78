pub mod errors;
pub mod models;

use crate::errors::DbErrMessage;
use crate::modules::timestamp::Timestamp;
use anyhow::Context;
use errors::*;
use models::*;
use sqlx::{query, query_as, SqlitePool};
use tracing::{debug, info};
use validator::Validate;

macro_rules! select_groups {
    ($tail:literal) => {
        concat!(
            r#"
            SELECT g.id, g.name, g.subject, g.description, g.created_by,
                   u.username AS creator, g.max_members, g.is_private, g.created_at,
                   (SELECT COUNT(*) FROM group_members m WHERE m.group_id = g.id) AS member_count
            FROM study_groups g
            JOIN users u ON u.id = g.created_by
            "#,
            $tail
        )
    };
}

/// Creates the group and makes its creator the first member.
pub async fn create_group(
    pool: &SqlitePool,
    new_group: NewGroup,
    user_id: i64,
) -> Result<i64, GroupError> {
    let new_group = new_group.trimmed();
    new_group.validate()?;

    let now = Timestamp::now();
    let mut transaction = pool.begin().await.context("Failed to begin transaction")?;

    let (group_id,): (i64,) = query_as(
        r#"
            INSERT INTO study_groups (name, subject, description, created_by, max_members, is_private, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id
        "#,
    )
    .bind(&new_group.name)
    .bind(&new_group.subject)
    .bind(&new_group.description)
    .bind(user_id)
    .bind(new_group.max_members)
    .bind(new_group.is_private)
    .bind(now)
    .fetch_one(&mut *transaction)
    .await
    .context("Failed to create a group")?;

    query("INSERT INTO group_members (group_id, user_id, joined_at) VALUES (?, ?, ?)")
        .bind(group_id)
        .bind(user_id)
        .bind(now)
        .execute(&mut *transaction)
        .await
        .context("Failed to add creator to group")?;

    transaction
        .commit()
        .await
        .context("Failed to commit transaction")?;

    info!("User {user_id} created group {group_id}");
    Ok(group_id)
}

pub async fn get_group(pool: &SqlitePool, group_id: i64) -> Result<StudyGroup, GroupError> {
    query_as::<_, StudyGroup>(select_groups!("WHERE g.id = ?"))
        .bind(group_id)
        .fetch_optional(pool)
        .await
        .context("Failed to select group by id")?
        .ok_or(GroupError::GroupDoesNotExist)
}

pub async fn check_if_group_exists(pool: &SqlitePool, group_id: i64) -> Result<bool, GroupError> {
    let res = query("SELECT id FROM study_groups WHERE id = ?")
        .bind(group_id)
        .fetch_optional(pool)
        .await
        .context("Failed to select group by id")?;

    Ok(res.is_some())
}

pub async fn check_if_group_member(
    pool: &SqlitePool,
    user_id: i64,
    group_id: i64,
) -> Result<bool, GroupError> {
    let res = query("SELECT user_id FROM group_members WHERE user_id = ? AND group_id = ?")
        .bind(user_id)
        .bind(group_id)
        .fetch_optional(pool)
        .await
        .context("Failed to check if user is in group")?;

    Ok(res.is_some())
}

/// Private groups are visible to their members only.
pub fn ensure_can_view(group: &StudyGroup, is_member: bool) -> Result<(), GroupError> {
    if group.is_private && !is_member {
        return Err(GroupError::PrivateGroup);
    }
    Ok(())
}

/// Capacity is checked before membership, and neither check is guarded
/// against a concurrent join. The membership key still keeps a user from
/// joining twice.
pub async fn try_join_group(
    pool: &SqlitePool,
    user_id: i64,
    group_id: i64,
) -> Result<(), GroupError> {
    let (max_members, member_count): (i64, i64) = query_as(
        r#"
            SELECT g.max_members,
                   (SELECT COUNT(*) FROM group_members m WHERE m.group_id = g.id)
            FROM study_groups g
            WHERE g.id = ?
        "#,
    )
    .bind(group_id)
    .fetch_optional(pool)
    .await
    .context("Failed to select group capacity")?
    .ok_or(GroupError::GroupDoesNotExist)?;

    if member_count >= max_members {
        debug!("Group {group_id} is full ({member_count}/{max_members})");
        return Err(GroupError::GroupFull);
    }

    if check_if_group_member(pool, user_id, group_id).await? {
        return Err(GroupError::AlreadyMember);
    }

    query("INSERT INTO group_members (group_id, user_id, joined_at) VALUES (?, ?, ?)")
        .bind(group_id)
        .bind(user_id)
        .bind(Timestamp::now())
        .execute(pool)
        .await
        .map_err(|e| {
            DbErrMessage::new(e)
                .unique(|| GroupError::AlreadyMember)
                .fk(|| GroupError::GroupDoesNotExist)
                .into_inner()
        })?;

    info!("User {user_id} joined group {group_id}");
    Ok(())
}

pub async fn try_leave_group(
    pool: &SqlitePool,
    user_id: i64,
    group_id: i64,
) -> Result<(), GroupError> {
    let (created_by,): (i64,) = query_as("SELECT created_by FROM study_groups WHERE id = ?")
        .bind(group_id)
        .fetch_optional(pool)
        .await
        .context("Failed to select group creator")?
        .ok_or(GroupError::GroupDoesNotExist)?;

    if created_by == user_id {
        return Err(GroupError::CreatorCannotLeave);
    }

    let res = query("DELETE FROM group_members WHERE group_id = ? AND user_id = ?")
        .bind(group_id)
        .bind(user_id)
        .execute(pool)
        .await
        .context("Failed to remove user from group")?;

    if res.rows_affected() == 0 {
        return Err(GroupError::NotAMember);
    }

    info!("User {user_id} left group {group_id}");
    Ok(())
}

/// Deletes the group with everything attached to it and returns the blob
/// keys of its uploaded files.
pub async fn delete_group(
    pool: &SqlitePool,
    user_id: i64,
    group_id: i64,
) -> Result<Vec<String>, GroupError> {
    let mut transaction = pool.begin().await.context("Failed to begin transaction")?;

    let (created_by,): (i64,) = query_as("SELECT created_by FROM study_groups WHERE id = ?")
        .bind(group_id)
        .fetch_optional(&mut *transaction)
        .await
        .context("Failed to select group creator")?
        .ok_or(GroupError::GroupDoesNotExist)?;

    if created_by != user_id {
        return Err(GroupError::NotTheCreator);
    }

    let files: Vec<(String,)> =
        query_as("SELECT file FROM resources WHERE group_id = ? AND file IS NOT NULL")
            .bind(group_id)
            .fetch_all(&mut *transaction)
            .await
            .context("Failed to select group files")?;

    query("DELETE FROM study_groups WHERE id = ?")
        .bind(group_id)
        .execute(&mut *transaction)
        .await
        .context("Failed to delete group")?;

    transaction
        .commit()
        .await
        .context("Failed to commit transaction")?;

    info!("User {user_id} deleted group {group_id}");
    Ok(files.into_iter().map(|(file,)| file).collect())
}

pub async fn featured_groups(pool: &SqlitePool, limit: i64) -> Result<Vec<StudyGroup>, GroupError> {
    let groups = query_as::<_, StudyGroup>(select_groups!(
        "WHERE g.is_private = FALSE ORDER BY g.created_at DESC, g.id DESC LIMIT ?"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("Failed to select featured groups")?;

    Ok(groups)
}

/// Public groups, newest first. `q` is a substring of name, description or
/// subject and `subject` a substring of subject. SQLite's `LIKE` folds case
/// for ASCII letters only, so `é` and `É` are still told apart.
pub async fn browse_groups(
    pool: &SqlitePool,
    filter: &BrowseFilter,
) -> Result<Vec<StudyGroup>, GroupError> {
    let groups = query_as::<_, StudyGroup>(select_groups!(
        r#"
            WHERE g.is_private = FALSE
              AND (?1 IS NULL
                   OR g.name LIKE ?1 ESCAPE '\'
                   OR g.description LIKE ?1 ESCAPE '\'
                   OR g.subject LIKE ?1 ESCAPE '\')
              AND (?2 IS NULL OR g.subject LIKE ?2 ESCAPE '\')
            ORDER BY g.created_at DESC, g.id DESC
        "#
    ))
    .bind(filter.query().map(like_pattern))
    .bind(filter.subject().map(like_pattern))
    .fetch_all(pool)
    .await
    .context("Failed to browse groups")?;

    Ok(groups)
}

pub async fn list_subjects(pool: &SqlitePool) -> Result<Vec<String>, GroupError> {
    let subjects: Vec<(String,)> =
        query_as("SELECT DISTINCT subject FROM study_groups ORDER BY subject COLLATE NOCASE")
            .fetch_all(pool)
            .await
            .context("Failed to select subjects")?;

    Ok(subjects.into_iter().map(|(subject,)| subject).collect())
}

pub async fn query_user_groups(pool: &SqlitePool, user_id: i64) -> Result<UserGroups, GroupError> {
    let joined = query_as::<_, StudyGroup>(select_groups!(
        r#"
            JOIN group_members gm ON gm.group_id = g.id
            WHERE gm.user_id = ?
            ORDER BY g.created_at DESC, g.id DESC
        "#
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("Failed to select joined groups")?;

    let created = query_as::<_, StudyGroup>(select_groups!(
        "WHERE g.created_by = ? ORDER BY g.created_at DESC, g.id DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("Failed to select created groups")?;

    Ok(UserGroups { joined, created })
}

pub async fn list_members(pool: &SqlitePool, group_id: i64) -> Result<Vec<GroupMember>, GroupError> {
    let members = query_as::<_, GroupMember>(
        r#"
            SELECT u.id AS user_id, u.username FROM group_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.group_id = ?
            ORDER BY m.joined_at, u.id
        "#,
    )
    .bind(group_id)
    .fetch_all(pool)
    .await
    .context("Failed to select group members")?;

    Ok(members)
}

/// Case-insensitive substring pattern with `%`, `_` and `\` matched literally.
fn like_pattern(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
