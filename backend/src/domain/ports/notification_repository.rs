//! Port abstraction for notification persistence.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Notification, NotificationId, PageRequest, UserId};

use super::define_repository_error;

define_repository_error! {
    /// Persistence errors raised by notification repository adapters.
    pub enum NotificationPersistenceError("notification repository") {}
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationPersistenceError>;

    /// Notifications for `user`, newest first.
    async fn list(
        &self,
        user: &UserId,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<Vec<Notification>, NotificationPersistenceError>;

    async fn unread_count(&self, user: &UserId) -> Result<u64, NotificationPersistenceError>;

    /// Mark the given notifications of `user` read; returns rows changed.
    async fn mark_read(
        &self,
        user: &UserId,
        ids: &[NotificationId],
        at: DateTime<Utc>,
    ) -> Result<u64, NotificationPersistenceError>;

    async fn mark_all_read(
        &self,
        user: &UserId,
        at: DateTime<Utc>,
    ) -> Result<u64, NotificationPersistenceError>;
}
