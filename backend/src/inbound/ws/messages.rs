//! Wire-level message definitions for the WebSocket adapter.
//!
//! Frames are JSON objects tagged by `event`; field names are camelCase.
//!
//! ```text
//! client -> server: join_conversation, leave_conversation, send_message,
//!                   typing, stop_typing
//! server -> client: joined, left, new_message, user_typing,
//!                   user_stop_typing, error
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::{ConversationId, Error, ErrorCode, Message, RealtimeEvent, UserId};

const REDACTED_MESSAGE: &str = "Internal server error";

/// Event sent by a connected client.
///
/// The sender is always the authenticated connection owner; user ids in a
/// payload are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(
    tag = "event",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    JoinConversation {
        conversation_id: ConversationId,
    },
    LeaveConversation {
        conversation_id: ConversationId,
    },
    SendMessage {
        conversation_id: ConversationId,
        content: String,
    },
    Typing {
        conversation_id: ConversationId,
    },
    StopTyping {
        conversation_id: ConversationId,
    },
}

/// Event pushed to a connected client.
#[derive(Debug, Clone, Serialize)]
#[serde(
    tag = "event",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    Joined {
        conversation_id: ConversationId,
    },
    Left {
        conversation_id: ConversationId,
    },
    NewMessage {
        message: Message,
    },
    UserTyping {
        conversation_id: ConversationId,
        user_id: UserId,
    },
    UserStopTyping {
        conversation_id: ConversationId,
        user_id: UserId,
    },
    /// A client event was refused; the connection stays open.
    Error {
        code: ErrorCode,
        message: String,
    },
}

impl From<RealtimeEvent> for ServerEvent {
    fn from(value: RealtimeEvent) -> Self {
        match value {
            RealtimeEvent::NewMessage(message) => Self::NewMessage { message },
            RealtimeEvent::Typing {
                conversation_id,
                user_id,
                active: true,
            } => Self::UserTyping {
                conversation_id,
                user_id,
            },
            RealtimeEvent::Typing {
                conversation_id,
                user_id,
                active: false,
            } => Self::UserStopTyping {
                conversation_id,
                user_id,
            },
        }
    }
}

impl From<&Error> for ServerEvent {
    fn from(error: &Error) -> Self {
        let code = error.code();
        let message = match code {
            ErrorCode::InternalError => REDACTED_MESSAGE.to_owned(),
            _ => error.message().to_owned(),
        };
        Self::Error { code, message }
    }
}
