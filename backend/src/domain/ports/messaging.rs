//! Driving port for job conversations.

use async_trait::async_trait;

use crate::domain::{
    Conversation, ConversationId, ConversationSummary, Error, Message, MessageContent,
    MessageQuery, UserId,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Messaging: Send + Sync {
    async fn conversations(&self, user: &UserId) -> Result<Vec<ConversationSummary>, Error>;

    /// A conversation the caller takes part in.
    async fn conversation(
        &self,
        conversation: &ConversationId,
        user: &UserId,
    ) -> Result<Conversation, Error>;

    /// Messages of a conversation the caller takes part in.
    async fn messages(
        &self,
        conversation: &ConversationId,
        user: &UserId,
        query: MessageQuery,
    ) -> Result<Vec<Message>, Error>;

    async fn send(
        &self,
        conversation: &ConversationId,
        sender: &UserId,
        content: MessageContent,
    ) -> Result<Message, Error>;

    async fn mark_read(&self, conversation: &ConversationId, reader: &UserId) -> Result<(), Error>;

    /// Tell the other participant that `user` started or stopped typing.
    async fn typing(
        &self,
        conversation: &ConversationId,
        user: &UserId,
        active: bool,
    ) -> Result<(), Error>;
}
