//! Conversations and messages.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{MemoryState, MemoryStore, newest_first};
use crate::domain::ports::{ConversationPersistenceError, ConversationRepository};
use crate::domain::{
    Conversation, ConversationId, ConversationSummary, Message, MessageQuery, ParticipantSummary,
    UserId,
};

fn participant_card(state: &MemoryState, id: UserId) -> Option<ParticipantSummary> {
    state.users.get(id.as_uuid()).map(|stored| ParticipantSummary {
        id,
        first_name: stored.user.first_name.as_str().to_owned(),
        avatar_url: stored.user.avatar_url.clone(),
    })
}

/// Messages of `conversation`, newest first.
fn thread<'a>(state: &'a MemoryState, conversation: &ConversationId) -> Vec<&'a Message> {
    newest_first(&state.messages, |message| message.created_at)
        .into_iter()
        .map(|index| &state.messages[index])
        .filter(|message| &message.conversation_id == conversation)
        .collect()
}

fn summary(state: &MemoryState, conversation: &Conversation, user: &UserId) -> ConversationSummary {
    let job_title = state
        .jobs
        .iter()
        .find(|job| job.id == conversation.job_id)
        .map(|job| job.title.clone())
        .unwrap_or_default();
    ConversationSummary {
        id: conversation.id,
        job_id: conversation.job_id,
        job_title,
        other_participant: conversation
            .other_participant(user)
            .and_then(|other| participant_card(state, other)),
        last_message: thread(state, &conversation.id).first().map(|m| (*m).clone()),
        last_message_at: conversation.last_message_at,
    }
}

#[async_trait]
impl ConversationRepository for MemoryStore {
    async fn find_by_id(
        &self,
        id: &ConversationId,
    ) -> Result<Option<Conversation>, ConversationPersistenceError> {
        let state = self.lock(ConversationPersistenceError::connection)?;
        Ok(state
            .conversations
            .iter()
            .find(|stored| &stored.conversation.id == id)
            .map(|stored| stored.conversation.clone()))
    }

    async fn list_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<ConversationSummary>, ConversationPersistenceError> {
        let state = self.lock(ConversationPersistenceError::connection)?;
        let mut joined: Vec<&Conversation> = state
            .conversations
            .iter()
            .map(|stored| &stored.conversation)
            .filter(|conversation| conversation.has_participant(user))
            .collect();
        // Most recent activity first; conversations without messages last.
        joined.sort_by(|a, b| {
            b.last_message_at
                .cmp(&a.last_message_at)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(joined
            .into_iter()
            .map(|conversation| summary(&state, conversation, user))
            .collect())
    }

    async fn messages(
        &self,
        conversation: &ConversationId,
        query: MessageQuery,
    ) -> Result<Vec<Message>, ConversationPersistenceError> {
        let state = self.lock(ConversationPersistenceError::connection)?;
        let all = thread(&state, conversation);
        let older: Vec<&Message> = match query.before {
            None => all,
            Some(before) => match all.iter().find(|message| message.id == before) {
                None => Vec::new(),
                Some(cursor) => {
                    let cutoff = cursor.created_at;
                    all.into_iter()
                        .filter(|message| message.created_at < cutoff)
                        .collect()
                }
            },
        };
        Ok(older
            .into_iter()
            .take(query.limit as usize)
            .cloned()
            .collect())
    }

    async fn insert_message(&self, message: &Message) -> Result<(), ConversationPersistenceError> {
        let mut state = self.lock(ConversationPersistenceError::connection)?;
        let stored = state
            .conversations
            .iter_mut()
            .find(|stored| stored.conversation.id == message.conversation_id)
            .ok_or_else(|| ConversationPersistenceError::query("conversation does not exist"))?;
        stored.conversation.last_message_at = Some(message.created_at);
        state.messages.push(message.clone());
        Ok(())
    }

    async fn mark_read(
        &self,
        conversation: &ConversationId,
        reader: &UserId,
        at: DateTime<Utc>,
    ) -> Result<(), ConversationPersistenceError> {
        let mut state = self.lock(ConversationPersistenceError::connection)?;
        if let Some(stored) = state
            .conversations
            .iter_mut()
            .find(|stored| &stored.conversation.id == conversation)
        {
            let participants = stored.conversation.participants;
            for (slot, participant) in stored.last_read_at.iter_mut().zip(participants.iter()) {
                if participant == reader {
                    *slot = Some(at);
                }
            }
        }
        for message in state.messages.iter_mut().filter(|message| {
            &message.conversation_id == conversation && &message.sender_id != reader && !message.is_read
        }) {
            message.is_read = true;
            message.read_at = Some(at);
        }
        Ok(())
    }
}
