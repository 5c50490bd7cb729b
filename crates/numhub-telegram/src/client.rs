//! Telegram Bot API client

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use numhub_common::config::TelegramConfig;
use numhub_core::traits::{
    ChatTarget, GatewayError, GatewayResult, MembershipStatus, MessageRef, MessagingGateway,
};
use numhub_core::value_objects::UserId;

use crate::types::{
    ApiChatMember, ApiMessage, ApiResponse, ChatId, DeleteMessagePayload, EditMessagePayload,
    GetChatMemberPayload, SendMessagePayload,
};

/// Telegram Bot API gateway
#[derive(Clone)]
pub struct TelegramGateway {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl TelegramGateway {
    /// Create a gateway from configuration
    pub fn new(config: &TelegramConfig) -> GatewayResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.api_base.trim_end_matches('/').to_string(),
            token: config.bot_token.clone(),
        })
    }

    /// Create a gateway against an explicit base URL (used by tests)
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    /// Resolve a chat target to the wire representation.
    ///
    /// Numeric handles (group/supergroup ids) go through as integers;
    /// anything else is treated as a channel handle with a leading `@`.
    fn chat_id(target: &ChatTarget) -> ChatId {
        match target {
            ChatTarget::User(id) => ChatId::Int(id.into_inner()),
            ChatTarget::Channel(handle) => Self::channel_id(handle),
        }
    }

    fn channel_id(handle: &str) -> ChatId {
        if let Ok(id) = handle.parse::<i64>() {
            ChatId::Int(id)
        } else {
            ChatId::Handle(format!("@{}", handle.trim_start_matches('@')))
        }
    }

    async fn call<T, P>(&self, method: &str, payload: &P) -> GatewayResult<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let response = self
            .http
            .post(self.method_url(method))
            .json(payload)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if !envelope.ok {
            return Err(GatewayError::Rejected {
                description: envelope
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            });
        }

        envelope.result.ok_or_else(|| {
            GatewayError::Transport(format!("{method}: ok response without result"))
        })
    }
}

#[async_trait]
impl MessagingGateway for TelegramGateway {
    #[instrument(skip(self, text))]
    async fn send_message(&self, target: &ChatTarget, text: &str) -> GatewayResult<MessageRef> {
        let message: ApiMessage = self
            .call(
                "sendMessage",
                &SendMessagePayload {
                    chat_id: Self::chat_id(target),
                    text,
                },
            )
            .await?;

        debug!(target = %target, message_id = message.message_id, "Message sent");
        Ok(MessageRef::new(message.message_id))
    }

    #[instrument(skip(self, text))]
    async fn edit_message(
        &self,
        target: &ChatTarget,
        message: MessageRef,
        text: &str,
    ) -> GatewayResult<()> {
        // editMessageText returns the edited Message (or `true` for inline
        // messages); we only need success
        let _: serde_json::Value = self
            .call(
                "editMessageText",
                &EditMessagePayload {
                    chat_id: Self::chat_id(target),
                    message_id: message.into_inner(),
                    text,
                },
            )
            .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_message(&self, target: &ChatTarget, message: MessageRef) -> GatewayResult<()> {
        let _: bool = self
            .call(
                "deleteMessage",
                &DeleteMessagePayload {
                    chat_id: Self::chat_id(target),
                    message_id: message.into_inner(),
                },
            )
            .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn membership_status(
        &self,
        channel: &str,
        user: UserId,
    ) -> GatewayResult<MembershipStatus> {
        let member: ApiChatMember = match self
            .call(
                "getChatMember",
                &GetChatMemberPayload {
                    chat_id: Self::channel_id(channel),
                    user_id: user.into_inner(),
                },
            )
            .await
        {
            Ok(member) => member,
            Err(GatewayError::Rejected { description }) => {
                // Unknown chat or user never seen; gating treats this as
                // not joined
                warn!(channel, user_id = %user, %description, "Membership lookup rejected");
                return Ok(MembershipStatus::Unknown);
            }
            Err(e) => return Err(e),
        };

        Ok(match member.status.as_str() {
            "creator" => MembershipStatus::Owner,
            "administrator" => MembershipStatus::Admin,
            "member" => MembershipStatus::Member,
            "left" | "kicked" => MembershipStatus::Left,
            _ => MembershipStatus::Unknown,
        })
    }
}
