//! Per-conversation message history.
//!
//! Partitions are keyed by [`ConversationKey`] and fully isolated from one
//! another: appends to conversation A can never land in conversation B.
//! Messages are append-only and never mutated in place. `replace` installs
//! the authoritative server ordering when history is loaded; server order
//! wins over local optimistic order if they diverge.

use std::collections::HashMap;

use charla_types::chat::{ChatMessage, ConversationKey};

/// Ordered message history for every known conversation partition.
///
/// Not thread-safe on its own; the orchestrator serializes access.
#[derive(Debug, Default)]
pub struct MessageStore {
    partitions: HashMap<ConversationKey, Vec<ChatMessage>>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The transcript for one conversation, empty if none exists yet.
    pub fn for_conversation(&self, key: &ConversationKey) -> &[ChatMessage] {
        self.partitions.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Append at the tail. Always at the tail; ordering within a partition
    /// is exactly call order.
    pub fn append(&mut self, key: &ConversationKey, message: ChatMessage) {
        self.partitions.entry(key.clone()).or_default().push(message);
    }

    /// Install the authoritative history for a conversation, discarding any
    /// prior optimistic entries in that partition.
    pub fn replace(&mut self, key: &ConversationKey, messages: Vec<ChatMessage>) {
        self.partitions.insert(key.clone(), messages);
    }

    /// Drop a partition entirely.
    pub fn clear(&mut self, key: &ConversationKey) {
        self.partitions.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charla_types::chat::{ChatId, SessionId};

    fn chat_key(id: &str) -> ConversationKey {
        ConversationKey::Chat(ChatId::from(id))
    }

    #[test]
    fn test_append_preserves_call_order() {
        let mut store = MessageStore::new();
        let key = chat_key("c1");
        store.append(&key, ChatMessage::user("one"));
        store.append(&key, ChatMessage::assistant("two"));
        store.append(&key, ChatMessage::user("three"));

        let contents: Vec<&str> = store
            .for_conversation(&key)
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, ["one", "two", "three"]);
    }

    #[test]
    fn test_partitions_are_isolated() {
        let mut store = MessageStore::new();
        store.append(&chat_key("a"), ChatMessage::user("for a"));
        store.append(&chat_key("b"), ChatMessage::user("for b"));
        store.append(
            &ConversationKey::Anonymous(SessionId("s".to_string())),
            ChatMessage::user("for anon"),
        );

        assert_eq!(store.for_conversation(&chat_key("a")).len(), 1);
        assert_eq!(store.for_conversation(&chat_key("b")).len(), 1);
        assert_eq!(store.for_conversation(&chat_key("a"))[0].content, "for a");
    }

    #[test]
    fn test_replace_discards_optimistic_entries() {
        let mut store = MessageStore::new();
        let key = chat_key("c1");
        store.append(&key, ChatMessage::user("optimistic"));

        let authoritative = vec![
            ChatMessage::user("stored question"),
            ChatMessage::assistant("stored answer"),
        ];
        store.replace(&key, authoritative);

        let contents: Vec<&str> = store
            .for_conversation(&key)
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, ["stored question", "stored answer"]);
    }

    #[test]
    fn test_clear_and_missing_are_empty() {
        let mut store = MessageStore::new();
        let key = chat_key("c1");
        assert!(store.for_conversation(&key).is_empty());
        store.append(&key, ChatMessage::user("x"));
        store.clear(&key);
        assert!(store.for_conversation(&key).is_empty());
    }
}
