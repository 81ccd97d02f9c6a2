use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::Photo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Photo,
}

impl FromStr for MessageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "photo" => Ok(Self::Photo),
            _ => Err("Message type must be 'text' or 'photo'".into()),
        }
    }
}

/// The validated content of a message. Exactly one payload per kind.
#[derive(Debug, Clone)]
pub enum Payload {
    Text(String),
    Photo(Photo),
}

impl Payload {
    pub fn kind(&self) -> MessageKind {
        match self {
            Payload::Text(_) => MessageKind::Text,
            Payload::Photo(_) => MessageKind::Photo,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    pub timestamp: String,
    pub sender: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub comments_count: i64,
    /// Up to three distinct commenters, most recent first.
    pub comments_authors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<Photo>,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct MessageRow {
    pub id: i64,
    pub conversation_id: i64,
    pub sender: String,
    pub kind: MessageKind,
    pub text: Option<String>,
    pub photo: Option<Vec<u8>>,
    pub created_at: String,
}

impl MessageRow {
    pub fn into_message(self, comments_count: i64, comments_authors: Vec<String>) -> Message {
        Message {
            id: self.id,
            conversation_id: self.conversation_id,
            timestamp: self.created_at,
            sender: self.sender,
            kind: self.kind,
            comments_count,
            comments_authors,
            text: self.text,
            photo: self.photo.map(Photo::from_stored),
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub message_id: i64,
    #[serde(rename = "username")]
    pub author: String,
    pub text: String,
    #[serde(rename = "timestamp")]
    pub created_at: String,
}

/// Body of `POST /conversations/{id}/messages`. Kind and payload are checked
/// against each other by the message store, not here.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<String>,
    pub photo: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForwardRequest {
    pub recipient_conversation_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct NewComment {
    pub text: String,
}
