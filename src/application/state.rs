//! # Conversation State
//!
//! In-memory map from conversation id to where that conversation is in the menu flow.
//! Nothing is persisted; a restart forgets every conversation.
//!
//! The store is owned by the single dispatch loop and handed to the router as
//! `&mut`, so reads and transitions for one event never interleave with another.

use std::collections::HashMap;

use crate::domain::types::ConversationState;

#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: HashMap<String, ConversationState>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absent conversations are `ConversationState::None`.
    pub fn get(&self, conversation_id: &str) -> ConversationState {
        self.conversations
            .get(conversation_id)
            .copied()
            .unwrap_or_default()
    }

    pub fn set(&mut self, conversation_id: &str, state: ConversationState) {
        self.conversations.insert(conversation_id.to_string(), state);
    }

    /// Returns the previous state, if there was an entry.
    pub fn remove(&mut self, conversation_id: &str) -> Option<ConversationState> {
        self.conversations.remove(conversation_id)
    }

    #[cfg(test)]
    pub fn contains(&self, conversation_id: &str) -> bool {
        self.conversations.contains_key(conversation_id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_is_none() {
        let store = ConversationStore::new();
        assert_eq!(store.get("!a"), ConversationState::None);
        assert!(!store.contains("!a"));
    }

    #[test]
    fn test_set_then_get() {
        let mut store = ConversationStore::new();
        store.set("!a", ConversationState::AwaitingChoice);
        assert_eq!(store.get("!a"), ConversationState::AwaitingChoice);
        assert_eq!(store.get("!b"), ConversationState::None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut store = ConversationStore::new();
        store.set("!a", ConversationState::AwaitingChoice);
        assert_eq!(store.remove("!a"), Some(ConversationState::AwaitingChoice));
        assert_eq!(store.remove("!a"), None);
        assert!(store.is_empty());
    }
}
