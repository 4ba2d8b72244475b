//! Identity and inbound message types

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Transport-supplied user identity - cheaply cloneable, used as the journal key
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct UserId(Arc<str>);

impl UserId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(Arc::from(s.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self::new(id.to_string())
    }
}

/// Chat identifier, as assigned by the transport
pub type ChatId = i64;

/// Kind of conversation a message arrived in
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    #[default]
    Private,
    Group,
    Supergroup,
    Channel,
}

impl ChatKind {
    /// Multi-party chats only reach the core when the bot is addressed.
    pub fn is_multi_party(&self) -> bool {
        matches!(self, ChatKind::Group | ChatKind::Supergroup)
    }
}

/// One inbound text message handed over by the transport
#[derive(Clone, Debug)]
pub struct InboundMessage {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub chat_kind: ChatKind,
    pub text: String,
    /// Sender's display name, used only by greeting commands.
    pub first_name: Option<String>,
}
