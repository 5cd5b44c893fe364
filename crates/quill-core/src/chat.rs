//! Chat session domain models.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Title given to a session before its first user message names it.
pub const DEFAULT_SESSION_TITLE: &str = "New conversation";

/// Who produced a chat turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    /// RFC3339 timestamp.
    pub created_at: String,
}

impl ChatMessage {
    /// Creates a user turn stamped with the current time.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            created_at: Utc::now().to_rfc3339(),
        }
    }

    /// Creates an assistant turn stamped with the current time.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Lightweight session listing entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatSessionIndexItem {
    pub id: String,
    pub title: String,
}

/// A named conversation thread.
///
/// Messages are append-only from the UI's perspective: the orchestrator
/// appends an optimistic user turn and otherwise replaces the whole message
/// list from the persisted log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        let msg = ChatMessage::user("hello");
        let raw = serde_json::to_string(&msg).unwrap();
        assert!(raw.contains("\"role\":\"user\""));
        assert!(raw.contains("createdAt"));

        let msg = ChatMessage::assistant("hi");
        let raw = serde_json::to_string(&msg).unwrap();
        assert!(raw.contains("\"role\":\"assistant\""));
    }
}
