//! PostgreSQL-backed `ConversationRepository` implementation using Diesel ORM.
//!
//! Participants live in `conversation_participants`, keyed by position
//! (0 = client, 1 = helper). Summaries are assembled from a handful of
//! batched queries rather than one wide join.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{ConversationPersistenceError, ConversationRepository};
use crate::domain::{
    Conversation, ConversationId, ConversationSummary, Message, MessageQuery, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{ConversationRow, MessageRow, ParticipantLinkRow, ParticipantRow};
use super::pool::{DbPool, PoolError};
use super::row_mapping::{
    conversation_from_row, message_from_row, message_to_row, participant_from_row,
};
use super::schema::{conversation_participants, conversations, jobs, messages, users};

/// Diesel-backed implementation of the conversation repository port.
#[derive(Clone)]
pub struct DieselConversationRepository {
    pool: DbPool,
}

impl DieselConversationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ConversationPersistenceError {
    map_basic_pool_error(error, ConversationPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ConversationPersistenceError {
    map_basic_diesel_error(
        error,
        ConversationPersistenceError::query,
        ConversationPersistenceError::connection,
    )
}

fn to_message(row: MessageRow) -> Result<Message, ConversationPersistenceError> {
    message_from_row(row).map_err(ConversationPersistenceError::query)
}

/// Participant ids per conversation, ordered by position.
async fn participants_of(
    conn: &mut AsyncPgConnection,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<Uuid>>, ConversationPersistenceError> {
    let links = conversation_participants::table
        .filter(conversation_participants::conversation_id.eq_any(ids))
        .order((
            conversation_participants::conversation_id.asc(),
            conversation_participants::position.asc(),
        ))
        .select(ParticipantLinkRow::as_select())
        .load::<ParticipantLinkRow>(conn)
        .await
        .map_err(map_diesel_error)?;

    let mut grouped: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for link in links {
        grouped
            .entry(link.conversation_id)
            .or_default()
            .push(link.user_id);
    }
    Ok(grouped)
}

fn rebuild(
    row: ConversationRow,
    participants: &HashMap<Uuid, Vec<Uuid>>,
) -> Result<Conversation, ConversationPersistenceError> {
    let ids = participants.get(&row.id).map(Vec::as_slice).unwrap_or(&[]);
    conversation_from_row(row, ids).map_err(ConversationPersistenceError::query)
}

#[async_trait]
impl ConversationRepository for DieselConversationRepository {
    async fn find_by_id(
        &self,
        id: &ConversationId,
    ) -> Result<Option<Conversation>, ConversationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let Some(row) = conversations::table
            .find(id.as_uuid())
            .select(ConversationRow::as_select())
            .first::<ConversationRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
        else {
            return Ok(None);
        };
        let participants = participants_of(&mut conn, &[row.id]).await?;
        rebuild(row, &participants).map(Some)
    }

    async fn list_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<ConversationSummary>, ConversationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let conversation_ids: Vec<Uuid> = conversation_participants::table
            .filter(conversation_participants::user_id.eq(user.as_uuid()))
            .select(conversation_participants::conversation_id)
            .load::<Uuid>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if conversation_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = conversations::table
            .filter(conversations::id.eq_any(&conversation_ids))
            .order((
                conversations::last_message_at.desc().nulls_last(),
                conversations::created_at.desc(),
            ))
            .select(ConversationRow::as_select())
            .load::<ConversationRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let participants = participants_of(&mut conn, &conversation_ids).await?;

        let job_ids: Vec<Uuid> = rows.iter().map(|row| row.job_id).collect();
        let titles: HashMap<Uuid, String> = jobs::table
            .filter(jobs::id.eq_any(&job_ids))
            .select((jobs::id, jobs::title))
            .load::<(Uuid, String)>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .collect();

        let user_ids: Vec<Uuid> = participants.values().flatten().copied().collect();
        let cards: HashMap<Uuid, ParticipantRow> = users::table
            .filter(users::id.eq_any(&user_ids))
            .select(ParticipantRow::as_select())
            .load::<ParticipantRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(|row| (row.id, row))
            .collect();

        let mut latest: HashMap<Uuid, MessageRow> = messages::table
            .filter(messages::conversation_id.eq_any(&conversation_ids))
            .distinct_on(messages::conversation_id)
            .order((messages::conversation_id, messages::created_at.desc()))
            .select(MessageRow::as_select())
            .load::<MessageRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(|row| (row.conversation_id, row))
            .collect();

        rows.into_iter()
            .map(|row| {
                let job_title = titles.get(&row.job_id).cloned().unwrap_or_default();
                let last_message = latest.remove(&row.id).map(to_message).transpose()?;
                let conversation = rebuild(row, &participants)?;
                let other_participant = conversation
                    .other_participant(user)
                    .and_then(|other| cards.get(other.as_uuid()).cloned())
                    .map(participant_from_row);
                Ok(ConversationSummary {
                    id: conversation.id,
                    job_id: conversation.job_id,
                    job_title,
                    other_participant,
                    last_message,
                    last_message_at: conversation.last_message_at,
                })
            })
            .collect()
    }

    async fn messages(
        &self,
        conversation: &ConversationId,
        query: MessageQuery,
    ) -> Result<Vec<Message>, ConversationPersistenceError> {
        let conversation_id = *conversation.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut select = messages::table
            .filter(messages::conversation_id.eq(conversation_id))
            .order((messages::created_at.desc(), messages::id.desc()))
            .select(MessageRow::as_select())
            .into_boxed();

        if let Some(before) = query.before {
            let cursor = messages::table
                .filter(
                    messages::id
                        .eq(*before.as_uuid())
                        .and(messages::conversation_id.eq(conversation_id)),
                )
                .select(messages::created_at)
                .first::<DateTime<Utc>>(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?;
            // An unknown cursor yields an empty page.
            let Some(cursor) = cursor else {
                return Ok(Vec::new());
            };
            select = select.filter(messages::created_at.lt(cursor));
        }

        select
            .limit(i64::from(query.limit))
            .load::<MessageRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(to_message)
            .collect()
    }

    async fn insert_message(&self, message: &Message) -> Result<(), ConversationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = message_to_row(message);
        conn.transaction(|conn| {
            async move {
                diesel::insert_into(messages::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                diesel::update(conversations::table.find(row.conversation_id))
                    .set(conversations::last_message_at.eq(Some(row.created_at)))
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn mark_read(
        &self,
        conversation: &ConversationId,
        reader: &UserId,
        at: DateTime<Utc>,
    ) -> Result<(), ConversationPersistenceError> {
        let conversation_id = *conversation.as_uuid();
        let reader_id = *reader.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                diesel::update(conversation_participants::table.find((conversation_id, reader_id)))
                    .set(conversation_participants::last_read_at.eq(Some(at)))
                    .execute(conn)
                    .await?;
                diesel::update(
                    messages::table.filter(
                        messages::conversation_id
                            .eq(conversation_id)
                            .and(messages::sender_id.ne(reader_id))
                            .and(messages::is_read.eq(false)),
                    ),
                )
                .set((messages::is_read.eq(true), messages::read_at.eq(Some(at))))
                .execute(conn)
                .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}
