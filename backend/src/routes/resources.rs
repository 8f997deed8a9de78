use crate::errors::AppError;
use crate::modules::flash::{self, Level};
use crate::modules::storage::Blobs;
use crate::state::AppState;
use crate::utils::auth::models::Claims;
use crate::utils::groups::{check_if_group_exists, check_if_group_member, errors::GroupError};
use crate::utils::resources::{add_resource, errors::ResourceError, models::*};
use crate::views::describe_validation;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::response::Redirect;
use axum::routing::post;
use axum::{debug_handler, Router};
use axum_extra::extract::CookieJar;
use sqlx::SqlitePool;
use tracing::debug;

use super::groups::group_url;

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/group/:group_id/resource/add/", post(post_add_resource))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

async fn read_resource_form(mut multipart: Multipart) -> Result<NewResource, ResourceError> {
    let mut title = String::new();
    let mut resource_type = None;
    let mut description = String::new();
    let mut link = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ResourceError::MalformedUpload)?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| ResourceError::MalformedUpload)?;
                // browsers send an empty part when no file was picked
                if !file_name.is_empty() && !bytes.is_empty() {
                    file = Some(UploadedFile {
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            _ => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| ResourceError::MalformedUpload)?;
                match name.as_str() {
                    "title" => title = value,
                    "resource_type" => resource_type = Some(value.parse::<ResourceType>()?),
                    "description" => description = value,
                    "link" => link = Some(value),
                    _ => debug!("Ignoring resource form field {name}"),
                }
            }
        }
    }

    Ok(NewResource {
        title,
        resource_type: resource_type.ok_or(ResourceError::UnknownType)?,
        description,
        link,
        file,
    })
}

#[debug_handler(state = AppState)]
async fn post_add_resource(
    claims: Claims,
    State(pool): State<SqlitePool>,
    State(blobs): State<Blobs>,
    Path(group_id): Path<i64>,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<(CookieJar, Redirect), AppError> {
    if !check_if_group_exists(&pool, group_id).await? {
        return Err(GroupError::GroupDoesNotExist.into());
    }
    let to = group_url(group_id);

    if !check_if_group_member(&pool, claims.user_id, group_id).await? {
        let e = ResourceError::NotAMember;
        return Ok(flash::redirect(jar, Level::Error, e.to_string(), &to));
    }

    let res = match read_resource_form(multipart).await {
        Ok(new_resource) => {
            add_resource(&pool, blobs.as_ref(), group_id, claims.user_id, new_resource).await
        }
        Err(e) => Err(e),
    };

    match res {
        Ok(_) => Ok(flash::redirect(
            jar,
            Level::Success,
            "Resource added successfully!",
            &to,
        )),
        Err(ResourceError::Unexpected(e)) => Err(AppError::Unexpected(e)),
        Err(ResourceError::InvalidResource(errors)) => Ok(flash::redirect(
            jar,
            Level::Error,
            describe_validation(&errors).join("; "),
            &to,
        )),
        Err(e) => Ok(flash::redirect(jar, Level::Error, e.to_string(), &to)),
    }
}
