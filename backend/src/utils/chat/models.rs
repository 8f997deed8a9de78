use crate::modules::timestamp::Timestamp;
use serde::{Deserialize, Serialize};

/// Upper bound on messages per page and per poll.
pub const MESSAGE_BATCH: i64 = 50;

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct ChatMessage {
    pub id: i64,
    pub group_id: i64,
    pub sender_id: i64,
    pub sender: String,
    pub content: String,
    pub sent_at: Timestamp,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessagePayload {
    pub sender: String,
    pub content: String,
    pub sent_at_display: String,
    pub sent_at_iso: String,
    pub is_own_message: bool,
}

impl MessagePayload {
    pub fn new(message: &ChatMessage, viewer_id: i64) -> Self {
        Self {
            sender: message.sender.clone(),
            content: message.content.clone(),
            sent_at_display: message.sent_at.display_time(),
            sent_at_iso: message.sent_at.iso(),
            is_own_message: message.sender_id == viewer_id,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MessageList {
    pub messages: Vec<MessagePayload>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SentMessage {
    pub success: bool,
    pub message: MessagePayload,
}

#[derive(Deserialize, Debug)]
pub struct NewMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct MessagesQuery {
    #[serde(default)]
    pub last_message_time: Option<String>,
}

impl MessagesQuery {
    /// A blank value means "from the start".
    pub fn after(&self) -> Result<Option<Timestamp>, time::error::Parse> {
        match self.last_message_time.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => Timestamp::parse_iso(value).map(Some),
        }
    }
}
