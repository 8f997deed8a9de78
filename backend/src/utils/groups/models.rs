use crate::modules::timestamp::Timestamp;
use serde::{Deserialize, Deserializer};
use validator::Validate;

pub const DEFAULT_MAX_MEMBERS: i64 = 50;
pub const FEATURED_GROUPS: i64 = 6;

#[derive(Deserialize, Validate, Debug, Clone)]
pub struct NewGroup {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub subject: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_max_members")]
    #[validate(range(min = 2, max = 100))]
    pub max_members: i64,
    #[serde(default, deserialize_with = "checkbox")]
    pub is_private: bool,
}

impl NewGroup {
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            subject: self.subject.trim().to_string(),
            description: self.description.trim().to_string(),
            ..self
        }
    }
}

fn default_max_members() -> i64 {
    DEFAULT_MAX_MEMBERS
}

/// HTML checkboxes submit `on` when ticked and nothing otherwise.
pub fn checkbox<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = String::deserialize(deserializer)?;
    Ok(matches!(
        value.to_lowercase().as_str(),
        "on" | "true" | "1" | "yes"
    ))
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct StudyGroup {
    pub id: i64,
    pub name: String,
    pub subject: String,
    pub description: String,
    pub created_by: i64,
    pub creator: String,
    pub max_members: i64,
    pub is_private: bool,
    pub created_at: Timestamp,
    pub member_count: i64,
}

impl StudyGroup {
    pub fn is_full(&self) -> bool {
        self.member_count >= self.max_members
    }
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct GroupMember {
    pub user_id: i64,
    pub username: String,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct BrowseFilter {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
}

impl BrowseFilter {
    pub fn query(&self) -> Option<&str> {
        non_blank(self.q.as_deref())
    }

    pub fn subject(&self) -> Option<&str> {
        non_blank(self.subject.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Dashboard lists.
#[derive(Debug, Clone)]
pub struct UserGroups {
    pub joined: Vec<StudyGroup>,
    pub created: Vec<StudyGroup>,
}
