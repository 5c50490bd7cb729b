//! Messaging gateway port
//!
//! The core consumes a chat platform through this trait; it never talks to
//! the vendor API directly. Any non-success outcome surfaces as a
//! `GatewayError` which callers count as a delivery failure - there is no
//! inline retry.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

use crate::value_objects::UserId;

/// Where a message goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatTarget {
    /// Direct message to a user
    User(UserId),
    /// A channel, by handle (`@name`) or raw chat id
    Channel(String),
}

impl fmt::Display for ChatTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "{id}"),
            Self::Channel(handle) => f.write_str(handle),
        }
    }
}

/// Opaque reference to a delivered message, usable for edit/delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef(i64);

impl MessageRef {
    #[inline]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn into_inner(self) -> i64 {
        self.0
    }
}

impl fmt::Display for MessageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user's standing in a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipStatus {
    Member,
    Admin,
    Owner,
    /// Not currently joined
    Left,
    /// The gateway could not determine membership; gating treats this as
    /// not joined
    Unknown,
}

impl MembershipStatus {
    /// Member or better
    pub fn is_joined(&self) -> bool {
        matches!(self, Self::Member | Self::Admin | Self::Owner)
    }
}

/// Gateway failures
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The platform rejected the request (blocked bot, unknown chat, ...)
    #[error("Gateway rejected request: {description}")]
    Rejected { description: String },

    /// Transport-level failure (timeout, connection refused, bad payload)
    #[error("Gateway transport error: {0}")]
    Transport(String),
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Messaging operations the core needs from the chat platform
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Send a text message
    async fn send_message(&self, target: &ChatTarget, text: &str) -> GatewayResult<MessageRef>;

    /// Edit a previously sent message
    async fn edit_message(
        &self,
        target: &ChatTarget,
        message: MessageRef,
        text: &str,
    ) -> GatewayResult<()>;

    /// Delete a previously sent message
    async fn delete_message(&self, target: &ChatTarget, message: MessageRef) -> GatewayResult<()>;

    /// Query a user's standing in a channel
    async fn membership_status(&self, channel: &str, user: UserId)
        -> GatewayResult<MembershipStatus>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_joined() {
        assert!(MembershipStatus::Member.is_joined());
        assert!(MembershipStatus::Admin.is_joined());
        assert!(MembershipStatus::Owner.is_joined());
        assert!(!MembershipStatus::Left.is_joined());
        assert!(!MembershipStatus::Unknown.is_joined());
    }

    #[test]
    fn test_target_display() {
        assert_eq!(ChatTarget::User(UserId::new(5)).to_string(), "5");
        assert_eq!(
            ChatTarget::Channel("@updates".to_string()).to_string(),
            "@updates"
        );
    }
}
