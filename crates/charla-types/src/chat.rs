//! Conversation and message types.
//!
//! `ChatId` and `SessionId` are both opaque strings on the wire but stay
//! separate types so an anonymous session transcript can never be mixed up
//! with a server-persisted conversation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;

/// Identifier of a server-persisted conversation owned by an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub String);

impl ChatId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ChatId {
    fn from(s: &str) -> Self {
        ChatId(s.to_string())
    }
}

/// Identifier of an anonymous, non-persisted conversation scope.
///
/// Generated locally once per process lifetime; never stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key of a transcript partition in the message store.
///
/// `Draft` is the partition for a brand-new authenticated conversation that
/// the server has not assigned an id to yet. Once the first send echoes a
/// `chat_id` back, the draft partition is promoted to `Chat(id)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConversationKey {
    Draft,
    Anonymous(SessionId),
    Chat(ChatId),
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationKey::Draft => write!(f, "draft"),
            ConversationKey::Anonymous(id) => write!(f, "anon:{id}"),
            ConversationKey::Chat(id) => write!(f, "chat:{id}"),
        }
    }
}

/// One entry in the authenticated user's conversation list.
///
/// Belongs to exactly one user; the list order is whatever the server
/// returned (most recent first) and is reproduced as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSummary {
    pub id: ChatId,
    pub title: String,
    pub last_message: String,
    pub last_activity: DateTime<Utc>,
}

/// A single message in a conversation transcript.
///
/// Append-only: never reordered or mutated after creation. `timestamp` is
/// the moment of local append (user messages) or arrival (assistant
/// messages and server-loaded history).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub content: String,
    pub from_user: bool,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// A message the user typed, timestamped now.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            from_user: true,
            timestamp: Utc::now(),
        }
    }

    /// A message from the assistant (or synthesized locally on failure),
    /// timestamped now.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            from_user: false,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_id_serde_transparent() {
        let id: ChatId = serde_json::from_str("\"c42\"").unwrap();
        assert_eq!(id, ChatId::from("c42"));
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"c42\"");
    }

    #[test]
    fn test_conversation_key_display_is_disjoint() {
        let anon = ConversationKey::Anonymous(SessionId("x1".to_string()));
        let chat = ConversationKey::Chat(ChatId::from("x1"));
        assert_ne!(anon.to_string(), chat.to_string());
    }

    #[test]
    fn test_message_constructors() {
        let user = ChatMessage::user("hola");
        assert!(user.from_user);
        let ai = ChatMessage::assistant("hi");
        assert!(!ai.from_user);
        assert_eq!(ai.content, "hi");
    }
}
