//! PostgreSQL-backed `NotificationRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{NotificationPersistenceError, NotificationRepository};
use crate::domain::{Notification, NotificationId, PageRequest, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::NotificationRow;
use super::pool::{DbPool, PoolError};
use super::row_mapping::{notification_from_row, notification_to_row};
use super::schema::notifications;

/// Diesel-backed implementation of the notification repository port.
#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> NotificationPersistenceError {
    map_basic_pool_error(error, NotificationPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> NotificationPersistenceError {
    map_basic_diesel_error(
        error,
        NotificationPersistenceError::query,
        NotificationPersistenceError::connection,
    )
}

fn rows_changed(count: usize) -> u64 {
    u64::try_from(count).unwrap_or(u64::MAX)
}

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(notifications::table)
            .values(&notification_to_row(notification))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list(
        &self,
        user: &UserId,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<Vec<Notification>, NotificationPersistenceError> {
        let offset = i64::try_from(page.offset())
            .map_err(|_| NotificationPersistenceError::query("requested page exceeds i64 range"))?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = notifications::table
            .filter(notifications::user_id.eq(*user.as_uuid()))
            .order((notifications::created_at.desc(), notifications::id.desc()))
            .select(NotificationRow::as_select())
            .into_boxed();
        if unread_only {
            query = query.filter(notifications::is_read.eq(false));
        }

        query
            .limit(i64::from(page.limit()))
            .offset(offset)
            .load::<NotificationRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(|row| notification_from_row(row).map_err(NotificationPersistenceError::query))
            .collect()
    }

    async fn unread_count(&self, user: &UserId) -> Result<u64, NotificationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count = notifications::table
            .filter(
                notifications::user_id
                    .eq(user.as_uuid())
                    .and(notifications::is_read.eq(false)),
            )
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn mark_read(
        &self,
        user: &UserId,
        ids: &[NotificationId],
        at: DateTime<Utc>,
    ) -> Result<u64, NotificationPersistenceError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(
            notifications::table.filter(
                notifications::user_id
                    .eq(user.as_uuid())
                    .and(notifications::id.eq_any(&ids))
                    .and(notifications::is_read.eq(false)),
            ),
        )
        .set((
            notifications::is_read.eq(true),
            notifications::read_at.eq(Some(at)),
        ))
        .execute(&mut conn)
        .await
        .map(rows_changed)
        .map_err(map_diesel_error)
    }

    async fn mark_all_read(
        &self,
        user: &UserId,
        at: DateTime<Utc>,
    ) -> Result<u64, NotificationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(
            notifications::table.filter(
                notifications::user_id
                    .eq(user.as_uuid())
                    .and(notifications::is_read.eq(false)),
            ),
        )
        .set((
            notifications::is_read.eq(true),
            notifications::read_at.eq(Some(at)),
        ))
        .execute(&mut conn)
        .await
        .map(rows_changed)
        .map_err(map_diesel_error)
    }
}
