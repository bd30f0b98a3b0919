//! Chat message data models.
//!
//! These are the objects the chat panel renders and the assistant script
//! emits. Unlike files and design elements, the message log is flat:
//! ordered by creation time, never nested.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    System,
}

impl Role {
    /// Canonical string stored in `messages.role`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::System => "system",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "system" => Ok(Role::System),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown message role: {0}")]
pub struct UnknownRole(pub String);

/// How the chat panel decorates a system message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Plan,
    Progress,
    Changes,
    #[default]
    Normal,
}

impl MessageKind {
    /// Canonical string stored in `messages.kind`.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Plan => "plan",
            MessageKind::Progress => "progress",
            MessageKind::Changes => "changes",
            MessageKind::Normal => "normal",
        }
    }
}

impl std::str::FromStr for MessageKind {
    type Err = UnknownMessageKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plan" => Ok(MessageKind::Plan),
            "progress" => Ok(MessageKind::Progress),
            "changes" => Ok(MessageKind::Changes),
            "normal" => Ok(MessageKind::Normal),
            other => Err(UnknownMessageKind(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown message kind: {0}")]
pub struct UnknownMessageKind(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub kind: MessageKind,
    /// RFC-3339 creation timestamp.
    pub created_at: String,
}
