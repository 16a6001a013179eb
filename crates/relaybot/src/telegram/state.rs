//! Per-chat conversation state

use dashmap::DashMap;
use teloxide::types::ChatId;

/// Where a chat is in the `/get_video` flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversationState {
    #[default]
    Idle,
    /// `/get_video` was sent; the next text message is treated as the link
    AwaitingLink,
}

/// Conversation state of every chat, keyed by chat id.
///
/// Chats without an entry are `Idle`. Entries are dropped when a chat goes
/// back to `Idle`, so the map only holds chats mid-flow.
#[derive(Debug, Default)]
pub struct ConversationStore {
    states: DashMap<ChatId, ConversationState>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, chat_id: ChatId) -> ConversationState {
        self.states.get(&chat_id).map(|s| *s).unwrap_or_default()
    }

    pub fn set(&self, chat_id: ChatId, state: ConversationState) {
        match state {
            ConversationState::Idle => {
                self.states.remove(&chat_id);
            }
            other => {
                self.states.insert(chat_id, other);
            }
        }
    }

    pub fn reset(&self, chat_id: ChatId) {
        self.set(chat_id, ConversationState::Idle);
    }

    pub fn is_awaiting_link(&self, chat_id: ChatId) -> bool {
        self.get(chat_id) == ConversationState::AwaitingLink
    }
}
