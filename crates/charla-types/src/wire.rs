//! Wire payloads exchanged with the remote assistant service.
//!
//! Every response carries a `success` flag and an optional `error` string.
//! A `success: false` body is treated as a failure with the server-supplied
//! error as detail, regardless of HTTP status (see the gateway in
//! charla-infra).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::{ChatId, ChatMessage, ChatSummary, SessionId};
use crate::identity::{TokenPair, User};

/// Title shown for a conversation the server returned without one.
pub const UNTITLED_CHAT: &str = "Untitled chat";

/// Preview shown for a conversation with no last message.
pub const NO_MESSAGES: &str = "No messages yet";

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body of an anonymous send.
#[derive(Debug, Clone, Serialize)]
pub struct AnonymousSendRequest {
    pub message: String,
    pub session_id: SessionId,
}

/// Body of an authenticated send. `chat_id` is omitted when composing a
/// brand-new conversation; the server echoes the assigned id back.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedSendRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<ChatId>,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Response to register and login.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    pub user: Option<User>,
    pub tokens: Option<TokenPair>,
}

/// Payload extracted from a successful [`AuthResponse`].
#[derive(Debug, Clone)]
pub struct AuthPayload {
    pub user: User,
    pub tokens: TokenPair,
}

/// Response to both anonymous and authenticated sends.
#[derive(Debug, Clone, Deserialize)]
pub struct SendResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    pub response: Option<String>,
    #[serde(default)]
    pub session_id: Option<SessionId>,
    #[serde(default)]
    pub chat_id: Option<ChatId>,
}

/// The assistant's reply to a send, after envelope checks.
#[derive(Debug, Clone)]
pub struct SendReply {
    pub response: String,
    /// Present on authenticated sends; a new id means the server created a
    /// conversation for this exchange.
    pub chat_id: Option<ChatId>,
}

/// Response to the conversation-list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatsResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub chats: Vec<ChatEntry>,
}

/// One conversation as the server describes it.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatEntry {
    pub id: ChatId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub last_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ChatEntry {
    /// Convert to the local summary model, filling server-omitted fields
    /// with the standing defaults.
    pub fn into_summary(self) -> ChatSummary {
        ChatSummary {
            id: self.id,
            title: self
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| UNTITLED_CHAT.to_string()),
            last_message: self
                .last_message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| NO_MESSAGES.to_string()),
            last_activity: self.created_at,
        }
    }
}

/// Response to the message-history endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub messages: Vec<MessageEntry>,
}

/// Who authored a stored message, in the server's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSender {
    User,
    Ai,
}

/// One stored message as the server describes it.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageEntry {
    pub sender: MessageSender,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl MessageEntry {
    pub fn into_message(self) -> ChatMessage {
        ChatMessage {
            content: self.content,
            from_user: self.sender == MessageSender::User,
            timestamp: self.timestamp,
        }
    }
}

/// Response to create-conversation.
///
/// `was_created` is the server's idempotency verdict: false means an
/// existing empty conversation was reused instead of a new one created.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateChatResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    pub chat_id: Option<ChatId>,
    #[serde(default)]
    pub was_created: bool,
}

/// The interesting part of a successful [`CreateChatResponse`].
#[derive(Debug, Clone)]
pub struct CreatedChat {
    pub chat_id: ChatId,
    pub was_created: bool,
}

/// Response shape shared by logout and delete-conversation.
#[derive(Debug, Clone, Deserialize)]
pub struct AckResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_request_omits_missing_chat_id() {
        let body = AuthenticatedSendRequest {
            message: "order status".to_string(),
            chat_id: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("chat_id"));

        let body = AuthenticatedSendRequest {
            message: "order status".to_string(),
            chat_id: Some(ChatId::from("c1")),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"chat_id\":\"c1\""));
    }

    #[test]
    fn test_auth_response_parses_server_shape() {
        let json = r#"{
            "success": true,
            "message": "ok",
            "user": {"id": 3, "username": "ana", "email": "ana@example.com"},
            "tokens": {"access": "a.b.c", "refresh": "d.e.f"}
        }"#;
        let resp: AuthResponse = serde_json::from_str(json).unwrap();
        assert!(resp.success);
        assert_eq!(resp.user.unwrap().username, "ana");
        assert_eq!(resp.tokens.unwrap().access, "a.b.c");
    }

    #[test]
    fn test_send_response_failure_shape() {
        let json = r#"{"success": false, "error": "model overloaded"}"#;
        let resp: SendResponse = serde_json::from_str(json).unwrap();
        assert!(!resp.success);
        assert_eq!(resp.error.as_deref(), Some("model overloaded"));
        assert!(resp.response.is_none());
    }

    #[test]
    fn test_chat_entry_defaults() {
        let json = r#"{"id": "c9", "created_at": "2025-06-01T10:00:00Z"}"#;
        let entry: ChatEntry = serde_json::from_str(json).unwrap();
        let summary = entry.into_summary();
        assert_eq!(summary.title, UNTITLED_CHAT);
        assert_eq!(summary.last_message, NO_MESSAGES);
    }

    #[test]
    fn test_message_entry_sender_mapping() {
        let json = r#"[
            {"sender": "user", "content": "hola", "timestamp": "2025-06-01T10:00:00Z"},
            {"sender": "ai", "content": "hi", "timestamp": "2025-06-01T10:00:01Z"}
        ]"#;
        let entries: Vec<MessageEntry> = serde_json::from_str(json).unwrap();
        assert!(entries[0].clone().into_message().from_user);
        assert!(!entries[1].clone().into_message().from_user);
    }

    #[test]
    fn test_create_chat_response() {
        let json = r#"{"success": true, "chat_id": "c1", "was_created": true}"#;
        let resp: CreateChatResponse = serde_json::from_str(json).unwrap();
        assert!(resp.was_created);
        assert_eq!(resp.chat_id.unwrap(), ChatId::from("c1"));
    }
}
