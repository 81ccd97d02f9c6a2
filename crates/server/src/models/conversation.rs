use serde::{Deserialize, Serialize};

use super::{Message, Photo};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ConversationKind {
    Direct,
    Group,
}

/// A conversation with its participants and full message history.
#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: ConversationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub participants: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub convo_pic: Option<Photo>,
    pub messages: Vec<Message>,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ConversationRow {
    pub id: i64,
    pub kind: ConversationKind,
    pub name: Option<String>,
    pub convo_pic: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessagePreview {
    pub timestamp: String,
    pub preview: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationSummary {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: ConversationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub participants: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub convo_pic: Option<Photo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<MessagePreview>,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SummaryRow {
    pub id: i64,
    pub kind: ConversationKind,
    pub name: Option<String>,
    pub convo_pic: Option<Vec<u8>>,
    pub last_timestamp: Option<String>,
    pub last_preview: Option<String>,
}

/// The group-shaped view of a conversation served under `/groups`.
#[derive(Debug, Clone, Serialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub members: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_photo: Option<Photo>,
}

impl From<Conversation> for Group {
    fn from(conversation: Conversation) -> Self {
        Self {
            id: conversation.id,
            name: conversation.name.unwrap_or_default(),
            members: conversation.participants,
            group_photo: conversation.convo_pic,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StartConversationRequest {
    pub recipient: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SetGroupNameRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SetGroupPhotoRequest {
    pub photo: String,
}

#[derive(Debug, Deserialize)]
pub struct AddMembersRequest {
    pub members: Vec<String>,
}
