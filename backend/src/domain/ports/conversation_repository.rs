//! Port abstraction for conversations and messages.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Conversation, ConversationId, ConversationSummary, Message, MessageQuery, UserId,
};

use super::define_repository_error;

define_repository_error! {
    /// Persistence errors raised by conversation repository adapters.
    pub enum ConversationPersistenceError("conversation repository") {}
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn find_by_id(
        &self,
        id: &ConversationId,
    ) -> Result<Option<Conversation>, ConversationPersistenceError>;

    /// Conversations `user` takes part in, most recent activity first.
    async fn list_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<ConversationSummary>, ConversationPersistenceError>;

    /// Messages newest first, strictly older than the cursor when given.
    async fn messages(
        &self,
        conversation: &ConversationId,
        query: MessageQuery,
    ) -> Result<Vec<Message>, ConversationPersistenceError>;

    /// Store a message and bump the conversation's `last_message_at`.
    async fn insert_message(&self, message: &Message) -> Result<(), ConversationPersistenceError>;

    /// Stamp `reader`'s last read time and mark the other party's messages
    /// read.
    async fn mark_read(
        &self,
        conversation: &ConversationId,
        reader: &UserId,
        at: DateTime<Utc>,
    ) -> Result<(), ConversationPersistenceError>;
}
