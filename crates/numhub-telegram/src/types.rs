//! Bot API request/response payloads

use serde::{Deserialize, Serialize};

/// Standard Bot API response envelope
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

/// The slice of a Message object we care about
#[derive(Debug, Deserialize)]
pub struct ApiMessage {
    pub message_id: i64,
}

/// The slice of a ChatMember object we care about
#[derive(Debug, Deserialize)]
pub struct ApiChatMember {
    pub status: String,
}

/// chat_id accepts an integer id or a "@channel" handle
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ChatId {
    Int(i64),
    Handle(String),
}

#[derive(Debug, Serialize)]
pub struct SendMessagePayload<'a> {
    pub chat_id: ChatId,
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
pub struct EditMessagePayload<'a> {
    pub chat_id: ChatId,
    pub message_id: i64,
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
pub struct DeleteMessagePayload {
    pub chat_id: ChatId,
    pub message_id: i64,
}

#[derive(Debug, Serialize)]
pub struct GetChatMemberPayload {
    pub chat_id: ChatId,
    pub user_id: i64,
}
