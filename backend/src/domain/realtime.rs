//! Live events pushed to the open connections of conversation participants.

use super::{ConversationId, Message, UserId};

/// Event fanned out to every live connection of its recipients.
#[derive(Debug, Clone, PartialEq)]
pub enum RealtimeEvent {
    /// A message was stored in a conversation.
    NewMessage(Message),
    /// `user_id` started (`active`) or stopped typing in a conversation.
    Typing {
        conversation_id: ConversationId,
        user_id: UserId,
        active: bool,
    },
}

impl RealtimeEvent {
    pub fn conversation_id(&self) -> ConversationId {
        match self {
            Self::NewMessage(message) => message.conversation_id,
            Self::Typing {
                conversation_id, ..
            } => *conversation_id,
        }
    }
}
