//! PostgreSQL-backed `JobLifecycleRepository` using a single transaction.
//!
//! Every mutation runs inside one database transaction. Guarded updates that
//! affect no rows abort the transaction with [`LifecycleTxError::Stale`], so
//! a losing concurrent acceptance leaves no partial writes behind.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::{debug, warn};

use crate::domain::ports::{JobLifecyclePersistenceError, JobLifecycleRepository};
use crate::domain::{ApplicationStatus, Conversation, JobStatus, LifecycleMutation};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::ParticipantLinkRow;
use super::pool::{DbPool, PoolError};
use super::row_mapping::conversation_to_row;
use super::schema::{applications, conversation_participants, conversations, jobs};

/// Diesel-backed implementation of the lifecycle port.
#[derive(Clone)]
pub struct DieselJobLifecycleRepository {
    pool: DbPool,
}

impl DieselJobLifecycleRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Transaction-local error so a guard miss can roll back the whole unit.
#[derive(Debug)]
enum LifecycleTxError {
    Diesel(DieselError),
    Stale(&'static str),
}

impl From<DieselError> for LifecycleTxError {
    fn from(error: DieselError) -> Self {
        Self::Diesel(error)
    }
}

fn map_pool_error(error: PoolError) -> JobLifecyclePersistenceError {
    map_basic_pool_error(error, JobLifecyclePersistenceError::connection)
}

fn map_tx_error(error: LifecycleTxError) -> JobLifecyclePersistenceError {
    match error {
        LifecycleTxError::Stale(message) => JobLifecyclePersistenceError::stale_state(message),
        // The accepted-application index and the conversation's job key only
        // collide when another acceptance committed first.
        LifecycleTxError::Diesel(DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            _,
        )) => JobLifecyclePersistenceError::stale_state("job was accepted concurrently"),
        LifecycleTxError::Diesel(error) => map_basic_diesel_error(
            error,
            JobLifecyclePersistenceError::query,
            JobLifecyclePersistenceError::connection,
        ),
    }
}

fn ensure_one(updated: usize, message: &'static str) -> Result<(), LifecycleTxError> {
    if updated == 1 {
        Ok(())
    } else {
        Err(LifecycleTxError::Stale(message))
    }
}

async fn open_conversation(
    conn: &mut AsyncPgConnection,
    conversation: &Conversation,
) -> Result<(), LifecycleTxError> {
    diesel::insert_into(conversations::table)
        .values(&conversation_to_row(conversation))
        .execute(conn)
        .await?;
    let links: Vec<ParticipantLinkRow> = conversation
        .participants
        .iter()
        .zip(0_i16..)
        .map(|(user, position)| ParticipantLinkRow {
            conversation_id: *conversation.id.as_uuid(),
            user_id: *user.as_uuid(),
            position,
            last_read_at: None,
        })
        .collect();
    diesel::insert_into(conversation_participants::table)
        .values(&links)
        .execute(conn)
        .await?;
    Ok(())
}

async fn apply_one(
    conn: &mut AsyncPgConnection,
    mutation: &LifecycleMutation,
) -> Result<(), LifecycleTxError> {
    let pending = ApplicationStatus::Pending.as_str();
    match mutation {
        LifecycleMutation::AcceptApplication { application_id, at } => {
            let updated = diesel::update(
                applications::table.filter(
                    applications::id
                        .eq(application_id.as_uuid())
                        .and(applications::status.eq(pending)),
                ),
            )
            .set((
                applications::status.eq(ApplicationStatus::Accepted.as_str()),
                applications::updated_at.eq(*at),
            ))
            .execute(conn)
            .await?;
            ensure_one(updated, "application is no longer pending")
        }
        LifecycleMutation::DeclineSiblings {
            job_id,
            accepted,
            at,
        } => {
            let declined = diesel::update(
                applications::table.filter(
                    applications::job_id
                        .eq(job_id.as_uuid())
                        .and(applications::id.ne(accepted.as_uuid()))
                        .and(applications::status.eq(pending)),
                ),
            )
            .set((
                applications::status.eq(ApplicationStatus::Declined.as_str()),
                applications::updated_at.eq(*at),
            ))
            .execute(conn)
            .await?;
            debug!(%job_id, declined, "sibling applications declined");
            Ok(())
        }
        LifecycleMutation::AssignJob {
            job_id,
            helper_id,
            at,
        } => {
            let updated = diesel::update(
                jobs::table.filter(
                    jobs::id
                        .eq(job_id.as_uuid())
                        .and(jobs::status.eq(JobStatus::Open.as_str())),
                ),
            )
            .set((
                jobs::status.eq(JobStatus::Assigned.as_str()),
                jobs::assigned_helper_id.eq(Some(*helper_id.as_uuid())),
                jobs::updated_at.eq(*at),
            ))
            .execute(conn)
            .await?;
            ensure_one(updated, "job is no longer open")
        }
        LifecycleMutation::OpenConversation(conversation) => {
            open_conversation(conn, conversation).await
        }
    }
}

#[async_trait]
impl JobLifecycleRepository for DieselJobLifecycleRepository {
    async fn apply(
        &self,
        mutations: &[LifecycleMutation],
    ) -> Result<(), JobLifecyclePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let result = conn
            .transaction::<_, LifecycleTxError, _>(|conn| {
                async move {
                    for mutation in mutations {
                        apply_one(conn, mutation).await?;
                    }
                    Ok(())
                }
                .scope_boxed()
            })
            .await;

        result.map_err(|error| {
            let mapped = map_tx_error(error);
            warn!(error = %mapped, "lifecycle transaction rolled back");
            mapped
        })
    }
}

#[cfg(test)]
mod tests {
    //! Transaction error mapping; the rollback itself is covered by the
    //! in-memory store's failure injection and a live database.

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn guard_miss_maps_to_stale_state() {
        let mapped = map_tx_error(LifecycleTxError::Stale("job is no longer open"));
        assert_eq!(
            mapped,
            JobLifecyclePersistenceError::stale_state("job is no longer open")
        );
    }

    #[rstest]
    fn unique_violation_maps_to_stale_state() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value".to_owned()),
        );
        assert!(matches!(
            map_tx_error(LifecycleTxError::Diesel(error)),
            JobLifecyclePersistenceError::StaleState { .. }
        ));
    }

    #[rstest]
    #[case(1, true)]
    #[case(0, false)]
    fn ensure_one_requires_exactly_one_row(#[case] updated: usize, #[case] ok: bool) {
        assert_eq!(ensure_one(updated, "guard").is_ok(), ok);
    }
}
