use crate::modules::timestamp::Timestamp;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use url::Url;
use validator::{Validate, ValidationError};

use super::errors::ResourceError;

#[derive(sqlx::Type, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Document,
    Link,
    Note,
}

impl ResourceType {
    pub const ALL: [ResourceType; 3] = [ResourceType::Document, ResourceType::Link, ResourceType::Note];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Document => "document",
            ResourceType::Link => "link",
            ResourceType::Note => "note",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResourceType::Document => "Document",
            ResourceType::Link => "Link",
            ResourceType::Note => "Note",
        }
    }
}

impl FromStr for ResourceType {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "document" => Ok(ResourceType::Document),
            "link" => Ok(ResourceType::Link),
            "note" => Ok(ResourceType::Note),
            _ => Err(ResourceError::UnknownType),
        }
    }
}

pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Validate)]
pub struct NewResource {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub resource_type: ResourceType,
    pub description: String,
    #[validate(custom = "validate_link")]
    pub link: Option<String>,
    pub file: Option<UploadedFile>,
}

const LINK_SCHEMES: [&str; 4] = ["http", "https", "ftp", "ftps"];

/// Links are rendered as anchors, so only web and ftp schemes get through.
fn validate_link(link: &str) -> Result<(), ValidationError> {
    let url = Url::parse(link).map_err(|_| ValidationError::new("url"))?;
    if !LINK_SCHEMES.contains(&url.scheme()) || url.host_str().is_none() {
        return Err(ValidationError::new("url_scheme"));
    }
    Ok(())
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Resource {
    pub id: i64,
    pub group_id: i64,
    pub title: String,
    pub resource_type: ResourceType,
    pub description: String,
    pub file: Option<String>,
    pub link: Option<String>,
    pub uploaded_by: i64,
    pub uploader: String,
    pub uploaded_at: Timestamp,
}
