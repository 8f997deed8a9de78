use crate::modules::timestamp::Timestamp;
use serde::Deserialize;
use validator::Validate;

pub const DEFAULT_DURATION_MINUTES: i64 = 60;

#[derive(Deserialize, Validate, Debug, Clone)]
pub struct NewSession {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// `datetime-local` input value.
    pub scheduled_time: String,
    #[serde(default = "default_duration")]
    #[validate(range(min = 15))]
    pub duration_minutes: i64,
}

fn default_duration() -> i64 {
    DEFAULT_DURATION_MINUTES
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct StudySession {
    pub id: i64,
    pub group_id: i64,
    pub title: String,
    pub description: String,
    pub scheduled_time: Timestamp,
    pub duration_minutes: i64,
    pub created_by: i64,
    pub creator: String,
    pub created_at: Timestamp,
}
