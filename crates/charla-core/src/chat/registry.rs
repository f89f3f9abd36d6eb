//! Registry of the authenticated user's conversations.
//!
//! Holds the summary list in server order plus the active-conversation
//! pointer. Not thread-safe on its own; the orchestrator serializes access.

use charla_types::chat::{ChatId, ChatSummary};

/// Conversation summaries and the active pointer.
///
/// `active_id` of `None` means no conversation is active: either nothing has
/// been selected yet or the user is composing a brand-new conversation.
#[derive(Debug, Default)]
pub struct ChatRegistry {
    chats: Vec<ChatSummary>,
    active: Option<ChatId>,
}

impl ChatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a full refresh from the server, superseding local state.
    /// No merge; the server list wins. The active pointer is untouched.
    pub fn replace_all(&mut self, chats: Vec<ChatSummary>) {
        self.chats = chats;
    }

    /// Register or update a single conversation without a full refresh.
    ///
    /// An unknown id is inserted at the front (it just saw activity); a
    /// known id is updated in place, keeping the server-determined order.
    pub fn upsert(&mut self, summary: ChatSummary) {
        match self.chats.iter_mut().find(|c| c.id == summary.id) {
            Some(existing) => *existing = summary,
            None => self.chats.insert(0, summary),
        }
    }

    /// Remove a conversation. Returns whether it was present.
    ///
    /// Removing the active conversation deliberately leaves the active
    /// pointer dangling; reassignment policy lives in the orchestrator.
    pub fn remove(&mut self, id: &ChatId) -> bool {
        let before = self.chats.len();
        self.chats.retain(|c| &c.id != id);
        self.chats.len() != before
    }

    pub fn list(&self) -> &[ChatSummary] {
        &self.chats
    }

    pub fn contains(&self, id: &ChatId) -> bool {
        self.chats.iter().any(|c| &c.id == id)
    }

    /// Id of the first (most recent) conversation, if any.
    pub fn first_id(&self) -> Option<ChatId> {
        self.chats.first().map(|c| c.id.clone())
    }

    pub fn active_id(&self) -> Option<&ChatId> {
        self.active.as_ref()
    }

    pub fn set_active(&mut self, id: Option<ChatId>) {
        self.active = id;
    }
}
