pub mod errors;
pub mod models;

use crate::modules::{storage::BlobStore, timestamp::Timestamp};
use crate::utils::groups::check_if_group_member;
use anyhow::Context;
use errors::*;
use models::*;
use sqlx::{query_as, SqlitePool};
use tracing::{info, warn};
use validator::Validate;

const RESOURCE_PREFIX: &str = "resources";

pub async fn add_resource(
    pool: &SqlitePool,
    blobs: &dyn BlobStore,
    group_id: i64,
    user_id: i64,
    new_resource: NewResource,
) -> Result<i64, ResourceError> {
    if !check_if_group_member(pool, user_id, group_id)
        .await
        .map_err(anyhow::Error::from)?
    {
        return Err(ResourceError::NotAMember);
    }

    let new_resource = NewResource {
        title: new_resource.title.trim().to_string(),
        description: new_resource.description.trim().to_string(),
        link: new_resource
            .link
            .map(|link| link.trim().to_string())
            .filter(|link| !link.is_empty()),
        ..new_resource
    };
    new_resource.validate()?;

    let file = match &new_resource.file {
        Some(upload) => Some(
            blobs
                .put(RESOURCE_PREFIX, &upload.file_name, &upload.bytes)
                .await?,
        ),
        None => None,
    };

    let res = query_as::<_, (i64,)>(
        r#"
            INSERT INTO resources (group_id, title, resource_type, description, file, link, uploaded_by, uploaded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
        "#,
    )
    .bind(group_id)
    .bind(&new_resource.title)
    .bind(new_resource.resource_type)
    .bind(&new_resource.description)
    .bind(&file)
    .bind(&new_resource.link)
    .bind(user_id)
    .bind(Timestamp::now())
    .fetch_one(pool)
    .await
    .context("Failed to create a resource");

    let (resource_id,) = match res {
        Ok(row) => row,
        Err(e) => {
            if let Some(key) = &file {
                if let Err(cleanup) = blobs.delete(key).await {
                    warn!("Failed to remove orphaned blob {key}: {cleanup:#}");
                }
            }
            return Err(e.into());
        }
    };

    info!("User {user_id} added resource {resource_id} to group {group_id}");
    Ok(resource_id)
}

/// Newest first.
pub async fn group_resources(
    pool: &SqlitePool,
    group_id: i64,
) -> Result<Vec<Resource>, ResourceError> {
    let resources = query_as::<_, Resource>(
        r#"
            SELECT r.id, r.group_id, r.title, r.resource_type, r.description, r.file, r.link,
                   r.uploaded_by, u.username AS uploader, r.uploaded_at
            FROM resources r
            JOIN users u ON u.id = r.uploaded_by
            WHERE r.group_id = ?
            ORDER BY r.uploaded_at DESC, r.id DESC
        "#,
    )
    .bind(group_id)
    .fetch_all(pool)
    .await
    .context("Failed to select group resources")?;

    Ok(resources)
}
