//! Job conversations between a client and the accepted helper.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ConversationId, JobId, MessageId, UserId};

/// Maximum number of characters in a message.
pub const MESSAGE_MAX: usize = 2000;
/// Default number of messages returned per page.
pub const MESSAGES_DEFAULT_LIMIT: u32 = 50;
/// Upper bound on messages returned per page.
pub const MESSAGES_MAX_LIMIT: u32 = 100;

/// Validation errors for message content.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessageValidationError {
    #[error("content must not be empty")]
    Empty,
    #[error("content must be at most {max} characters")]
    TooLong { max: usize },
}

/// Message body, `1..=2000` characters after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(raw: &str) -> Result<Self, MessageValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(MessageValidationError::Empty);
        }
        if trimmed.chars().count() > MESSAGE_MAX {
            return Err(MessageValidationError::TooLong { max: MESSAGE_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Conversation opened when an application is accepted.
///
/// ## Invariants
/// - Exactly one conversation per job.
/// - Exactly two participants: the client and the accepted helper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: ConversationId,
    pub job_id: JobId,
    pub participants: [UserId; 2],
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Open a conversation for a freshly assigned job.
    pub fn open(job_id: JobId, client: UserId, helper: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: ConversationId::random(),
            job_id,
            participants: [client, helper],
            last_message_at: None,
            created_at: now,
        }
    }

    pub fn has_participant(&self, user: &UserId) -> bool {
        self.participants.contains(user)
    }

    pub fn other_participant(&self, user: &UserId) -> Option<UserId> {
        match self.participants {
            [a, b] if &a == user => Some(b),
            [a, b] if &b == user => Some(a),
            _ => None,
        }
    }
}

/// A message posted in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub content: MessageContent,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn compose(
        conversation_id: ConversationId,
        sender_id: UserId,
        content: MessageContent,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MessageId::random(),
            conversation_id,
            sender_id,
            content,
            is_read: false,
            read_at: None,
            created_at: now,
        }
    }
}

/// Cursor-based message page request, newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageQuery {
    pub before: Option<MessageId>,
    pub limit: u32,
}

impl MessageQuery {
    pub fn new(before: Option<MessageId>, limit: Option<u32>) -> Self {
        Self {
            before,
            limit: limit
                .unwrap_or(MESSAGES_DEFAULT_LIMIT)
                .clamp(1, MESSAGES_MAX_LIMIT),
        }
    }
}

/// Minimal participant card shown in conversation lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantSummary {
    pub id: UserId,
    pub first_name: String,
    pub avatar_url: Option<String>,
}

/// Conversation list entry for one participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub job_id: JobId,
    pub job_title: String,
    pub other_participant: Option<ParticipantSummary>,
    pub last_message: Option<Message>,
    pub last_message_at: Option<DateTime<Utc>>,
}
